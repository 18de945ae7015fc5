/// A forward-only view over the argument tokens.
///
/// One cursor is shared by a parser and every command parser it hands control
/// to, so a command picks up exactly where its parent stopped. Tokens are
/// never pushed back.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [String],
    index: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.index).map(String::as_str)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.index += 1;
        Some(token)
    }

    /// Whether the next token has the form of an option value rather than a
    /// new option switch.
    ///
    /// Anything not starting with `-` qualifies, as do a bare `-` and a dash
    /// followed by a digit, so negative numbers can be passed as values.
    pub fn looks_like_value(&self) -> bool {
        self.peek().is_some_and(is_value_like)
    }

    /// Consume the next token only if it looks like a value.
    pub fn next_value(&mut self) -> Option<&'a str> {
        if self.looks_like_value() {
            self.next()
        } else {
            None
        }
    }

    /// Number of tokens consumed so far.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> &'a [String] {
        &self.tokens[self.index..]
    }
}

/// The classification behind [`TokenCursor::looks_like_value`].
pub fn is_value_like(token: &str) -> bool {
    match token.strip_prefix('-') {
        None => true,
        Some(rest) => rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn walks_forward_once() {
        let argv = tokens(&["a", "b"]);
        let mut cursor = TokenCursor::new(&argv);
        assert_eq!(cursor.peek(), Some("a"));
        assert_eq!(cursor.next(), Some("a"));
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.remaining(), &argv[1..]);
        assert_eq!(cursor.next(), Some("b"));
        assert!(!cursor.has_next());
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn classifies_value_tokens() {
        assert!(is_value_like("file.txt"));
        assert!(is_value_like("-"));
        assert!(is_value_like("-5"));
        assert!(is_value_like("-0.5"));
        assert!(is_value_like(""));
        assert!(!is_value_like("-x"));
        assert!(!is_value_like("--"));
        assert!(!is_value_like("--long"));
        assert!(!is_value_like("-.5"));
    }

    #[test]
    fn next_value_stops_at_switches() {
        let argv = tokens(&["1", "-2", "--three", "4"]);
        let mut cursor = TokenCursor::new(&argv);
        assert_eq!(cursor.next_value(), Some("1"));
        assert_eq!(cursor.next_value(), Some("-2"));
        assert_eq!(cursor.next_value(), None);
        assert_eq!(cursor.peek(), Some("--three"));
    }

    #[test]
    fn empty_cursor_has_no_value() {
        let argv: Vec<String> = Vec::new();
        let cursor = TokenCursor::new(&argv);
        assert!(!cursor.looks_like_value());
        assert!(!cursor.has_next());
    }
}
