//! Trusted publishing credential exchange.
//!
//! Converts an ambient, audience-bound OIDC identity token into a short-lived
//! package index upload credential:
//!
//! 1. `GET https://{domain}/_/oidc/audience` for the audience to request
//! 2. obtain an identity token for that audience ([`IdentityProvider`])
//! 3. `POST https://{domain}/_/oidc/github/mint-token` with `{"token": ...}`
//! 4. mask and print the credential, or report the failure
//!
//! # Quick Start
//!
//! ```no_run
//! use trusted_publishing::{execute, ExchangeConfig, GitHubActionsProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ExchangeConfig::from_env()?;
//! let code = execute(
//!     &config,
//!     GitHubActionsProvider::from_env(),
//!     &mut std::io::stdout(),
//!     &mut std::io::stderr(),
//! )
//! .await?;
//! std::process::exit(code);
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `INPUT_REPOSITORY-URL` | Index upload URL (also `INPUT_REPOSITORY_URL`) |
//! | `GITHUB_STEP_SUMMARY` | Summary file appended to on failure |
//! | `ACTIONS_ID_TOKEN_REQUEST_URL` | GitHub Actions OIDC token endpoint |
//! | `ACTIONS_ID_TOKEN_REQUEST_TOKEN` | Bearer token for that endpoint |

pub mod client;
pub mod config;
pub mod emit;
pub mod error;
pub mod exchange;
pub mod exit_codes;
pub mod identity;
pub mod report;
pub mod types;
pub mod workflow;

pub use client::{IndexClient, EXCHANGE_USER_AGENT};
pub use config::{
    normalized_input, step_summary_from_env, ExchangeConfig, IndexEndpoints, RepositoryReference,
};
pub use emit::emit_credential;
pub use error::{ErrorKind, ExchangeError, ExchangeResult, IdentityError, RefusalReason};
pub use exchange::{execute, TrustedPublishingExchange};
pub use identity::{GitHubActionsProvider, IdentityProvider};
pub use report::{summary_message, FailureReporter};
pub use types::{Audience, Credential, IdentityToken, MintTokenResponse};
pub use workflow::WorkflowCommand;
