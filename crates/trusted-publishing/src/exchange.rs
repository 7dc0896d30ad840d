//! The exchange flow: audience → identity token → mint → emit or report.
//!
//! Every stage either hands a value to the next one or returns an error; the
//! first error ends the flow.

use std::io::{self, Write};

use tracing::{info, warn};

use crate::client::IndexClient;
use crate::config::ExchangeConfig;
use crate::emit::emit_credential;
use crate::error::ExchangeResult;
use crate::exit_codes;
use crate::identity::IdentityProvider;
use crate::report::FailureReporter;
use crate::types::Credential;
use crate::workflow::WorkflowCommand;

/// One trusted publishing exchange against one index.
pub struct TrustedPublishingExchange<P> {
    client: IndexClient,
    provider: P,
}

impl<P: IdentityProvider> TrustedPublishingExchange<P> {
    pub fn new(config: &ExchangeConfig, provider: P) -> ExchangeResult<Self> {
        Ok(Self {
            client: IndexClient::new(config)?,
            provider,
        })
    }

    /// Run the exchange. `diagnostics` receives the `::debug::` endpoint line.
    pub async fn run<D: Write + ?Sized>(&self, diagnostics: &mut D) -> ExchangeResult<Credential> {
        let audience = self.client.fetch_audience().await?;

        let notice = format!(
            "selected trusted publishing exchange endpoint: {}",
            self.client.endpoints().mint_token_url
        );
        if let Err(e) = WorkflowCommand::Debug(&notice).write_to(diagnostics) {
            warn!(error = %e, "failed to write debug line");
        }

        let token = self.provider.identity_token(&audience).await?;
        info!(audience = %audience, "obtained identity token");

        self.client.mint_token(&token).await
    }
}

/// Run the exchange and render its outcome: credential on `stdout` or a
/// failure report. Returns the process exit code.
pub async fn execute<P, O, D>(
    config: &ExchangeConfig,
    provider: P,
    stdout: &mut O,
    diagnostics: &mut D,
) -> io::Result<i32>
where
    P: IdentityProvider,
    O: Write + ?Sized,
    D: Write + ?Sized,
{
    let reporter = FailureReporter::new(config.step_summary.clone());

    let outcome = match TrustedPublishingExchange::new(config, provider) {
        Ok(exchange) => exchange.run(diagnostics).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(credential) => {
            emit_credential(&credential, stdout, diagnostics)?;
            Ok(exit_codes::SUCCESS)
        }
        Err(err) => reporter.report(&err, diagnostics),
    }
}
