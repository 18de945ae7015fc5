use crate::error::ParseResult;
use crate::value::{parse_float, parse_int};

/// Positional arguments in the order they were encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Positionals {
    args: Vec<String>,
}

impl Positionals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.args.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(String::as_str)
    }

    /// Coerce every argument to an integer, failing on the first that does
    /// not parse.
    pub fn as_integers(&self) -> ParseResult<Vec<i64>> {
        self.args.iter().map(|a| parse_int(a)).collect()
    }

    /// Coerce every argument to a float, failing on the first that does not
    /// parse.
    pub fn as_floats(&self) -> ParseResult<Vec<f64>> {
        self.args.iter().map(|a| parse_float(a)).collect()
    }
}

impl<'a> IntoIterator for &'a Positionals {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}
