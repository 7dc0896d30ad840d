//! Workflow commands understood by the runner's log layer.

use std::fmt;
use std::io::{self, Write};

/// One line of the diagnostic stream protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowCommand<'a> {
    /// `::debug::` informational line.
    Debug(&'a str),
    /// `::error::` fatal line; newlines are escaped so it stays one line.
    Error(&'a str),
    /// `::add-mask::` redact this value from all later output.
    AddMask(&'a str),
}

impl WorkflowCommand<'_> {
    /// Write the command as a single line and flush.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{self}")?;
        w.flush()
    }
}

impl fmt::Display for WorkflowCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug(msg) => write!(f, "::debug::{}", escape_data(msg)),
            Self::Error(msg) => write!(f, "::error::{}", escape_data(msg)),
            Self::AddMask(value) => write!(f, "::add-mask::{value}"),
        }
    }
}

/// Escape a message so it fits on one command line.
pub fn escape_data(msg: &str) -> String {
    msg.replace('\r', "").replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_single_line() {
        let line = WorkflowCommand::Error("first\nsecond\r\nthird").to_string();
        assert_eq!(line, "::error::first%0Asecond%0Athird");
    }

    #[test]
    fn test_write_to_appends_newline() {
        let mut buf = Vec::new();
        WorkflowCommand::AddMask("secret-abc")
            .write_to(&mut buf)
            .unwrap();
        WorkflowCommand::Debug("hello").write_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "::add-mask::secret-abc\n::debug::hello\n"
        );
    }
}
