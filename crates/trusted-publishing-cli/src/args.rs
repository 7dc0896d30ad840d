use std::path::PathBuf;

use clap::Parser;
use trusted_publishing::step_summary_from_env;

#[derive(Parser, Debug)]
#[command(
    name = "mint-token",
    version,
    about = "Exchange the workflow's OIDC identity token for a package index upload credential"
)]
pub struct Cli {
    /// Package index upload URL [default: the `repository-url` workflow input]
    #[arg(long)]
    pub repository_url: Option<String>,

    /// File to append a failure summary to [default: $GITHUB_STEP_SUMMARY]
    #[arg(long)]
    pub step_summary: Option<PathBuf>,

    /// Scheme and authority to send index requests to instead of https://{domain}
    #[arg(long, hide = true)]
    pub endpoint_base: Option<String>,
}

impl Cli {
    /// Step summary path: the flag, else `GITHUB_STEP_SUMMARY`.
    pub fn step_summary(&self) -> Option<PathBuf> {
        self.step_summary.clone().or_else(step_summary_from_env)
    }
}
