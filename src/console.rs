//! Console output for notebook-style feedback.
//!
//! Every user-facing line the connection manager, the executors and the
//! student-ID check produce goes through a `Console`, so the same code can
//! print to stdout in a session and into a buffer under test.

use std::fmt::Display;
use std::io::{self, Stdout, Write};
use tracing::warn;

/// Line-oriented output sink. Write failures are logged, never returned.
#[derive(Debug)]
pub struct Console<W: Write = Stdout> {
    out: W,
}

impl Console<Stdout> {
    pub fn stdout() -> Self {
        Console { out: io::stdout() }
    }
}

impl Console<Vec<u8>> {
    /// A console that captures everything in memory.
    pub fn buffer() -> Self {
        Console { out: Vec::new() }
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Console { out }
    }

    /// Writes one line of output.
    pub fn line(&mut self, text: impl Display) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            warn!(error = %e, "console write failed");
        }
    }

    /// Writes a `Label : value` line with the label padded to `width`.
    pub fn field(&mut self, label: &str, width: usize, value: impl Display) {
        self.line(format_args!("{:<width$} : {}", label, value, width = width));
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_captures_lines() {
        let mut console = Console::buffer();
        console.line("first");
        console.line(format_args!("{} {}", "second", 2));
        assert_eq!(console.contents(), "first\nsecond 2\n");
    }

    #[test]
    fn test_field_alignment() {
        let mut console = Console::buffer();
        console.field("Host", 8, "nz.local");
        console.field("Database", 8, "LABDB");
        assert_eq!(
            console.contents(),
            "Host     : nz.local\nDatabase : LABDB\n"
        );
    }
}
