//! Byte-level scanning for inline text.
//!
//! Math delimiters are ASCII, so the cursor works on bytes and
//! only steps over whole characters when copying text through.

/// Byte cursor over a line of question text.
#[derive(Clone)]
pub struct Cursor<'a> {
    pub s: &'a str,
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Starts at the first byte of `s`.
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// True when every byte has been consumed.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// The current byte, without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// True when the unconsumed bytes begin with `pat`.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i..].starts_with(pat)
    }

    /// Advances over one whole character.
    pub fn bump_char(&mut self) -> Option<char> {
        let c = self.s[self.i..].chars().next()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Advances by `n` bytes. Callers only skip ASCII delimiters.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Text between `start` and the current position.
    pub fn since(&self, start: usize) -> &'a str {
        &self.s[start..self.i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("$x$");
        assert!(!cur.eof());
        assert_eq!(cur.peek(), Some(b'$'));
        cur.bump_n(1);
        assert_eq!(cur.bump_char(), Some('x'));
        assert!(cur.starts_with(b"$"));
        assert_eq!(cur.since(1), "x");
    }

    #[test]
    fn bump_char_is_utf8_aware() {
        let mut cur = Cursor::new("é$");
        assert_eq!(cur.bump_char(), Some('é'));
        assert_eq!(cur.i, 2);
        assert_eq!(cur.peek(), Some(b'$'));
    }

    #[test]
    fn empty_input() {
        let mut cur = Cursor::new("");
        assert!(cur.eof());
        assert_eq!(cur.peek(), None);
        assert_eq!(cur.bump_char(), None);
        assert!(cur.starts_with(b""));
    }
}
