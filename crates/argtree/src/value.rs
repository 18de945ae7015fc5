use std::fmt;
use std::num::IntErrorKind;

use crate::error::{ParseError, ParseResult};

/// The type an option's values are coerced to.
///
/// We use "flag" as a synonym for boolean options, i.e. options that are
/// either present or absent. Every other kind consumes a value token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Flag,
    String,
    Integer,
    Float,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flag => "a flag",
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Float => "a float",
        })
    }
}

/// One coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Flag(bool),
    Str(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Flag(_) => OptionKind::Flag,
            Self::Str(_) => OptionKind::String,
            Self::Int(_) => OptionKind::Integer,
            Self::Float(_) => OptionKind::Float,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Parse an integer literal the way C's `strtol` does with base 0.
///
/// Accepts leading whitespace, an optional sign, and the `0x`, `0o`, `0b`
/// prefixes. A bare leading `0` selects octal.
pub fn parse_int(raw: &str) -> ParseResult<i64> {
    let text = raw.trim_start();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = split_radix(unsigned);
    // Range is judged on the leading digit run, before trailing characters.
    let run = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if run == 0 {
        return Err(ParseError::malformed(raw, OptionKind::Integer));
    }

    let signed = if negative {
        format!("-{}", &digits[..run])
    } else {
        digits[..run].to_string()
    };
    let value = i64::from_str_radix(&signed, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ParseError::out_of_range(raw),
        _ => ParseError::malformed(raw, OptionKind::Integer),
    })?;
    if run != digits.len() {
        return Err(ParseError::malformed(raw, OptionKind::Integer));
    }
    Ok(value)
}

fn split_radix(text: &str) -> (u32, &str) {
    const PREFIXES: [(&str, u32); 6] = [
        ("0x", 16),
        ("0X", 16),
        ("0o", 8),
        ("0O", 8),
        ("0b", 2),
        ("0B", 2),
    ];
    for (prefix, radix) in PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            return (radix, rest);
        }
    }
    if text.len() > 1 && text.starts_with('0') {
        return (8, &text[1..]);
    }
    (10, text)
}

/// Parse a decimal or exponential floating-point literal.
///
/// Literals that overflow to infinity, or that are non-zero but underflow to
/// zero, are out of range. `inf` and `nan` spellings pass through.
pub fn parse_float(raw: &str) -> ParseResult<f64> {
    let text = raw.trim_start();
    let value: f64 = text
        .parse()
        .map_err(|_| ParseError::malformed(raw, OptionKind::Float))?;

    if value.is_infinite() && !spells_infinity(text) {
        return Err(ParseError::out_of_range(raw));
    }
    if value == 0.0 && mantissa(text).chars().any(|c| matches!(c, '1'..='9')) {
        return Err(ParseError::out_of_range(raw));
    }
    Ok(value)
}

fn spells_infinity(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn mantissa(text: &str) -> &str {
    text.split(['e', 'E']).next().unwrap_or(text)
}

/// The value store for one registered option.
///
/// Values are append-only while parsing. Scalar options are seeded with their
/// default, so the scalar readers always have an entry to return; list
/// options start empty.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionValue {
    kind: OptionKind,
    found: bool,
    greedy: bool,
    values: Vec<Value>,
}

impl OptionValue {
    /// A scalar option whose kind is taken from its default value.
    pub fn scalar(default: impl Into<Value>) -> Self {
        let default = default.into();
        Self {
            kind: default.kind(),
            found: false,
            greedy: false,
            values: vec![default],
        }
    }

    /// A list option. Greedy lists consume every following value-looking
    /// token; flags are never greedy.
    pub fn list(kind: OptionKind, greedy: bool) -> Self {
        Self {
            kind,
            found: false,
            greedy: greedy && kind != OptionKind::Flag,
            values: Vec::new(),
        }
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Whether the option was encountered while parsing.
    pub fn is_found(&self) -> bool {
        self.found
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }

    pub(crate) fn mark_found(&mut self) {
        self.found = true;
    }

    /// Coerce a raw token to this option's kind without storing it.
    pub fn coerce(&self, raw: &str) -> ParseResult<Value> {
        match self.kind {
            OptionKind::Flag => Ok(Value::Flag(true)),
            OptionKind::String => Ok(Value::Str(raw.to_string())),
            OptionKind::Integer => parse_int(raw).map(Value::Int),
            OptionKind::Float => parse_float(raw).map(Value::Float),
        }
    }

    /// Coerce a raw token and append it.
    pub fn append(&mut self, raw: &str) -> ParseResult<&Value> {
        let value = self.coerce(raw)?;
        let index = self.values.len();
        self.values.push(value);
        Ok(&self.values[index])
    }

    /// Append an already-typed value.
    ///
    /// # Panics
    ///
    /// Panics if the value's kind differs from the option's kind.
    pub fn push(&mut self, value: impl Into<Value>) {
        let value = value.into();
        assert!(
            value.kind() == self.kind,
            "cannot store {} in {} option",
            value.kind(),
            self.kind
        );
        self.values.push(value);
    }

    pub(crate) fn extend(&mut self, staged: Vec<Value>) {
        self.values.extend(staged);
    }

    /// Truncate to zero entries.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get_flag(&self) -> bool {
        match self.last() {
            Some(Value::Flag(v)) => *v,
            _ => self.misread(OptionKind::Flag),
        }
    }

    pub fn get_str(&self) -> &str {
        match self.last() {
            Some(Value::Str(v)) => v.as_str(),
            _ => self.misread(OptionKind::String),
        }
    }

    pub fn get_int(&self) -> i64 {
        match self.last() {
            Some(Value::Int(v)) => *v,
            _ => self.misread(OptionKind::Integer),
        }
    }

    pub fn get_float(&self) -> f64 {
        match self.last() {
            Some(Value::Float(v)) => *v,
            _ => self.misread(OptionKind::Float),
        }
    }

    pub fn flag_list(&self) -> Vec<bool> {
        self.expect_kind(OptionKind::Flag);
        self.values.iter().filter_map(Value::as_flag).collect()
    }

    pub fn str_list(&self) -> Vec<String> {
        self.expect_kind(OptionKind::String);
        self.values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn int_list(&self) -> Vec<i64> {
        self.expect_kind(OptionKind::Integer);
        self.values.iter().filter_map(Value::as_int).collect()
    }

    pub fn float_list(&self) -> Vec<f64> {
        self.expect_kind(OptionKind::Float);
        self.values.iter().filter_map(Value::as_float).collect()
    }

    fn expect_kind(&self, requested: OptionKind) {
        if self.kind != requested {
            self.misread(requested);
        }
    }

    fn misread(&self, requested: OptionKind) -> ! {
        if self.kind == requested {
            panic!("{} option has no values to read", self.kind);
        }
        panic!("cannot read {} option as {}", self.kind, requested);
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}
