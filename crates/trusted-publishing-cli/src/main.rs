use std::io;

use clap::Parser;
use trusted_publishing::config::REPOSITORY_URL_INPUT;
use trusted_publishing::{
    execute, exit_codes, normalized_input, ExchangeConfig, ExchangeResult, FailureReporter,
    GitHubActionsProvider,
};

mod args;

use args::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::FAILURE
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            // Nothing has been contacted yet; report and stop.
            let reporter = FailureReporter::new(cli.step_summary());
            return Ok(reporter.report(&err, &mut stderr)?);
        }
    };

    tracing::debug!(
        domain = %config.domain(),
        audience_url = %config.endpoints.audience_url,
        "starting trusted publishing exchange"
    );

    let provider = GitHubActionsProvider::from_env();
    Ok(execute(&config, provider, &mut stdout, &mut stderr).await?)
}

fn build_config(cli: &Cli) -> ExchangeResult<ExchangeConfig> {
    let repository_url = cli
        .repository_url
        .clone()
        .or_else(|| normalized_input(REPOSITORY_URL_INPUT));

    let config =
        ExchangeConfig::new(repository_url.as_deref())?.with_step_summary(cli.step_summary());

    match cli.endpoint_base.as_deref() {
        Some(base) => config.with_endpoint_base(base),
        None => Ok(config),
    }
}
