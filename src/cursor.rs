//! Position-tracking view over an immutable text buffer.
//!
//! Every scanner in the crate walks its input through a [`Cursor`]. Reads
//! past the end of the buffer yield `None` instead of a sentinel byte, and
//! the line number of the cursor is recovered incrementally.

/// A read-only cursor over `text` with a mutable byte offset.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    // Incremental line tracking: `line` is the line number at byte `line_pos`.
    line: usize,
    line_pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            line_pos: 0,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to `pos`, clamped to the end of the buffer.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// The byte at absolute offset `i`, or `None` past the end.
    pub fn byte_at(&self, i: usize) -> Option<u8> {
        self.text.as_bytes().get(i).copied()
    }

    /// The byte under the cursor.
    pub fn peek(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    /// Steps past one character.
    pub fn step(&mut self) {
        if let Some(c) = self.text.get(self.pos..).and_then(|s| s.chars().next()) {
            self.pos += c.len_utf8();
        } else {
            self.pos = self.text.len();
        }
    }

    /// Text between two absolute offsets. Out-of-range or non-boundary
    /// offsets give an empty string.
    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        let to = to.min(self.text.len());
        if from >= to {
            return "";
        }
        self.text.get(from..to).unwrap_or("")
    }

    /// Unconsumed text.
    pub fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or("")
    }

    /// True if `pattern` starts at absolute offset `i`.
    pub fn looking_at_at(&self, i: usize, pattern: &str) -> bool {
        self.text
            .as_bytes()
            .get(i..)
            .is_some_and(|rest| rest.starts_with(pattern.as_bytes()))
    }

    /// Non-consuming prefix test at the cursor.
    pub fn looking_at(&self, pattern: &str) -> bool {
        self.looking_at_at(self.pos, pattern)
    }

    /// Advances past the next occurrence of `delimiter`. If there is none,
    /// the cursor ends up at the end of the buffer. Returns whether the
    /// delimiter was found.
    pub fn scan_to(&mut self, delimiter: &str) -> bool {
        match self.rest().find(delimiter) {
            Some(offset) => {
                self.pos += offset + delimiter.len();
                true
            }
            None => {
                self.pos = self.text.len();
                false
            }
        }
    }

    /// Like [`scan_to`](Self::scan_to), but returns the text skipped over,
    /// without the delimiter.
    pub fn text_until(&mut self, delimiter: &str) -> &'a str {
        let start = self.pos;
        if self.scan_to(delimiter) {
            self.slice(start, self.pos - delimiter.len())
        } else {
            self.slice(start, self.pos)
        }
    }

    /// First offset at or after `j` that is neither whitespace nor inside a
    /// `//` line comment.
    pub fn whitespace_at(&self, mut j: usize) -> usize {
        loop {
            let k = j;
            while self.byte_at(j).is_some_and(is_space) {
                j += 1;
            }
            if self.looking_at_at(j, "//") {
                while self.byte_at(j).is_some_and(|b| b != b'\n') {
                    j += 1;
                }
            }
            if j <= k {
                return j;
            }
        }
    }

    /// Skips whitespace and line comments at the cursor.
    pub fn skip_whitespace(&mut self) {
        self.pos = self.whitespace_at(self.pos);
    }

    /// 1-based line number of the first unconsumed non-whitespace
    /// character. When the cursor has only moved forward since the last
    /// call, counting resumes where it stopped.
    pub fn line(&mut self) -> usize {
        if self.line_pos > self.pos {
            self.line = 1;
            self.line_pos = 0;
        }
        while let Some(b) = self.byte_at(self.line_pos) {
            if self.line_pos >= self.pos && !is_space(b) {
                break;
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.line_pos += 1;
        }
        self.line
    }
}

/// Space, tab, carriage return or newline.
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Collapses runs of whitespace into single spaces and trims both ends.
pub fn simplified(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes every whitespace character.
pub fn spaceless(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_to_leaves_cursor_after_delimiter() {
        let mut c = Cursor::new("abc */ def");
        assert!(c.scan_to("*/"));
        assert_eq!(c.rest(), " def");
    }

    #[test]
    fn scan_to_missing_delimiter_goes_to_end() {
        let mut c = Cursor::new("abc");
        assert!(!c.scan_to("*/"));
        assert!(c.at_end());
    }

    #[test]
    fn text_until_excludes_delimiter() {
        let mut c = Cursor::new("hello world */tail");
        assert_eq!(c.text_until("*/"), "hello world ");
        assert_eq!(c.rest(), "tail");
    }

    #[test]
    fn text_until_delimiter_at_very_end() {
        let mut c = Cursor::new("body*/");
        assert_eq!(c.text_until("*/"), "body");
        assert!(c.at_end());
    }

    #[test]
    fn text_until_without_delimiter_returns_rest() {
        let mut c = Cursor::new("unterminated");
        assert_eq!(c.text_until("*/"), "unterminated");
    }

    #[test]
    fn whitespace_skips_line_comments() {
        let mut c = Cursor::new("  // note\n   int x;");
        c.skip_whitespace();
        assert!(c.looking_at("int"));
    }

    #[test]
    fn reads_past_end_are_none() {
        let c = Cursor::new("ab");
        assert_eq!(c.byte_at(5), None);
        assert!(!c.looking_at_at(1, "bc"));
    }

    #[test]
    fn line_counts_to_next_nonblank() {
        let mut c = Cursor::new("one\n\n  three\nfour");
        assert_eq!(c.line(), 1);
        c.scan_to("one");
        assert_eq!(c.line(), 3);
        c.scan_to("three");
        assert_eq!(c.line(), 4);
    }

    #[test]
    fn line_recovers_after_moving_backwards() {
        let mut c = Cursor::new("a\nb\nc");
        c.set_pos(4);
        assert_eq!(c.line(), 3);
        c.set_pos(0);
        assert_eq!(c.line(), 1);
    }

    #[test]
    fn step_handles_multibyte() {
        let mut c = Cursor::new("é!");
        c.step();
        assert_eq!(c.peek(), Some(b'!'));
    }

    #[test]
    fn simplified_collapses_whitespace() {
        assert_eq!(simplified("  const \n  char  * "), "const char *");
        assert_eq!(spaceless("operator const char *"), "operatorconstchar*");
    }
}
