//! Failure reporting: step summary block plus a one-line `::error::` signal.
//!
//! Reporting is terminal. The caller exits with the returned code and runs
//! no further stages.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ExchangeError;
use crate::workflow::WorkflowCommand;

const RETRY_LATER: &str = "This strongly suggests a server configuration or downtime issue; wait a few minutes and try again.";

/// User-facing explanation of a failure, as written to the summary.
pub fn summary_message(err: &ExchangeError) -> String {
    match err {
        ExchangeError::Identity(identity_error) => format!(
            r#"
OpenID Connect token retrieval failed: {identity_error}

This generally indicates a workflow configuration error, such as insufficient
permissions. Make sure that your workflow has `id-token: write` configured
at the job level, e.g.:

```yaml
permissions:
  id-token: write
```

Learn more at https://docs.github.com/en/actions/deployment/security-hardening-your-deployments/about-security-hardening-with-openid-connect#adding-permissions-settings.
"#
        ),

        ExchangeError::Refused { reasons } => {
            let reasons = reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "\nToken request failed: the server refused the request for the following reasons:\n\n{reasons}\n"
            )
        }

        ExchangeError::MalformedJson { status } => format!(
            "\nToken request failed: the index produced an unexpected\n{status} response.\n\n{RETRY_LATER}\n"
        ),

        ExchangeError::MalformedRefusal { status } => format!(
            "\nToken request failed: the index produced a {status} response without\nany reasons.\n\n{RETRY_LATER}\n"
        ),

        ExchangeError::MissingToken => format!(
            "\nToken response error: the index gave us an invalid response.\n\n{RETRY_LATER}\n"
        ),

        ExchangeError::MultiLineToken => format!(
            "\nToken response error: the index returned a credential that spans\nmore than one line, so it cannot be masked.\n\n{RETRY_LATER}\n"
        ),

        other => other.to_string(),
    }
}

/// The block appended to the step summary.
pub fn summary_block(message: &str) -> String {
    format!(
        r#"
Trusted publishing exchange failure:

{message}

You're seeing this because the action wasn't given the inputs needed to
perform password-based or token-based authentication. If you intended to
perform one of those authentication methods instead of trusted
publishing, then you should double-check your secret configuration and variable
names.

Read more about trusted publishers at https://docs.pypi.org/trusted-publishers/

Read more about how this action uses trusted publishers at
https://github.com/marketplace/actions/pypi-publish#trusted-publishing
"#
    )
}

/// Renders fatal errors to the step summary and the diagnostic stream.
#[derive(Debug, Clone, Default)]
pub struct FailureReporter {
    step_summary: Option<PathBuf>,
}

impl FailureReporter {
    pub fn new(step_summary: Option<PathBuf>) -> Self {
        Self { step_summary }
    }

    /// Report `err` and return the process exit code.
    ///
    /// A summary file that cannot be written is logged; the `::error::` line
    /// is still emitted.
    pub fn report<W: Write + ?Sized>(
        &self,
        err: &ExchangeError,
        diagnostics: &mut W,
    ) -> io::Result<i32> {
        debug!(kind = %err.kind(), "trusted publishing exchange failed");

        let message = summary_message(err);

        match &self.step_summary {
            Some(path) => {
                if let Err(e) = append_summary(path, &message) {
                    warn!(path = %path.display(), error = %e, "failed to write step summary");
                }
            }
            None => debug!("no step summary configured; skipping failure summary"),
        }

        let line = format!("Trusted publishing exchange failure: {message}");
        WorkflowCommand::Error(&line).write_to(diagnostics)?;

        Ok(err.exit_code())
    }
}

fn append_summary(path: &Path, message: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", summary_block(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IdentityError, RefusalReason};

    #[test]
    fn test_refusal_renders_one_bullet_per_reason() {
        let err = ExchangeError::Refused {
            reasons: vec![
                RefusalReason {
                    code: "a".into(),
                    description: "first".into(),
                },
                RefusalReason {
                    code: "b".into(),
                    description: "second".into(),
                },
                RefusalReason {
                    code: "c".into(),
                    description: "third".into(),
                },
            ],
        };

        let message = summary_message(&err);
        let bullets: Vec<&str> = message.lines().filter(|l| l.starts_with("* ")).collect();
        assert_eq!(
            bullets,
            vec!["* `a`: first", "* `b`: second", "* `c`: third"]
        );
    }

    #[test]
    fn test_malformed_json_mentions_status_only() {
        let message = summary_message(&ExchangeError::MalformedJson { status: 502 });
        assert!(message.contains("502"));
        assert!(message.contains("wait a few minutes"));
    }

    #[test]
    fn test_multi_line_token_message_explains_masking() {
        let message = summary_message(&ExchangeError::MultiLineToken);
        assert!(message.contains("cannot be masked"));
        assert!(message.contains("wait a few minutes"));
    }

    #[test]
    fn test_identity_template_wraps_message() {
        let err = ExchangeError::Identity(IdentityError::new("permission denied"));
        let message = summary_message(&err);
        assert!(message.contains("OpenID Connect token retrieval failed: permission denied"));
        assert!(message.contains("id-token: write"));
    }

    #[test]
    fn test_report_writes_summary_and_single_error_line() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.md");
        std::fs::write(&summary, "previous step\n").unwrap();

        let reporter = FailureReporter::new(Some(summary.clone()));
        let mut diagnostics = Vec::new();
        let code = reporter
            .report(&ExchangeError::MissingToken, &mut diagnostics)
            .unwrap();
        assert_eq!(code, 1);

        let written = std::fs::read_to_string(&summary).unwrap();
        assert!(written.starts_with("previous step\n"));
        assert!(written.contains("Trusted publishing exchange failure:"));
        assert!(written.contains("the index gave us an invalid response"));

        let diagnostics = String::from_utf8(diagnostics).unwrap();
        assert_eq!(diagnostics.lines().count(), 1);
        assert!(diagnostics.starts_with("::error::Trusted publishing exchange failure: "));
        assert!(diagnostics.contains("%0A"));
    }

    #[test]
    fn test_report_without_summary_still_signals() {
        let reporter = FailureReporter::default();
        let mut diagnostics = Vec::new();
        let err = ExchangeError::TrustedPublishingDisabled {
            domain: "example-index.org".into(),
        };

        assert_eq!(reporter.report(&err, &mut diagnostics).unwrap(), 1);
        let diagnostics = String::from_utf8(diagnostics).unwrap();
        assert!(diagnostics.contains("trusted publishing disabled"));
    }

    #[test]
    fn test_unwritable_summary_still_signals() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = FailureReporter::new(Some(dir.path().join("missing").join("summary.md")));
        let mut diagnostics = Vec::new();

        let code = reporter
            .report(&ExchangeError::MissingToken, &mut diagnostics)
            .unwrap();
        assert_eq!(code, 1);
        assert!(!diagnostics.is_empty());
    }
}
