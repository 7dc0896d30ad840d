//! Credential output.

use std::io::{self, Write};

use crate::types::Credential;
use crate::workflow::WorkflowCommand;

/// Mask `credential` on the diagnostic stream, then print it as the only
/// stdout line. The mask line is flushed before stdout is touched.
pub fn emit_credential<O, D>(credential: &Credential, stdout: &mut O, diagnostics: &mut D) -> io::Result<()>
where
    O: Write + ?Sized,
    D: Write + ?Sized,
{
    WorkflowCommand::AddMask(credential.as_str()).write_to(diagnostics)?;
    writeln!(stdout, "{}", credential.as_str())?;
    stdout.flush()
}
