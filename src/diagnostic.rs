//! Non-fatal documentation diagnostics.

use std::fmt;

/// One reported problem, printed as `file:line: message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.message)
    }
}

/// Diagnostics in the order they were reported.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, file: impl Into<String>, line: usize, message: impl Into<String>) {
        let d = Diagnostic {
            file: file.into(),
            line,
            message: message.into(),
        };
        log::debug!("diagnostic: {}", d);
        self.items.push(d);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics whose message starts with `prefix`.
    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.items
            .iter()
            .filter(|d| d.message.starts_with(prefix))
            .count()
    }
}
