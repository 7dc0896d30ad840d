//! Exchange configuration: repository reference, derived endpoints, and the
//! workflow-runner inputs they come from.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `INPUT_REPOSITORY-URL` / `INPUT_REPOSITORY_URL` | Index upload URL |
//! | `GITHUB_STEP_SUMMARY` | Append-only summary file written on failure |

use std::path::PathBuf;

use url::Url;

use crate::error::{ExchangeError, ExchangeResult};

/// Environment variable naming the step summary file.
pub const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// Name of the repository URL input.
pub const REPOSITORY_URL_INPUT: &str = "repository-url";

const AUDIENCE_PATH: &str = "/_/oidc/audience";
const MINT_TOKEN_PATH: &str = "/_/oidc/github/mint-token";

/// Read a workflow input the way the runner exposes it.
///
/// Looks up `INPUT_<NAME>` with the name upper-cased, then the same key with
/// `-` replaced by `_`. Empty values count as unset.
pub fn normalized_input(name: &str) -> Option<String> {
    let key = format!("INPUT_{}", name.to_uppercase());
    non_empty_var(&key).or_else(|| non_empty_var(&key.replace('-', "_")))
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// A configured repository URL, reduced to its network authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    domain: String,
}

impl RepositoryReference {
    /// Parse a repository URL such as `https://upload.pypi.org/legacy/`.
    pub fn parse(url: &str) -> ExchangeResult<Self> {
        let parsed = Url::parse(url.trim()).map_err(|e| {
            ExchangeError::config(format!("invalid repository URL {url:?}: {e}"))
        })?;

        let host = parsed.host_str().unwrap_or_default();
        if host.is_empty() {
            return Err(ExchangeError::config(format!(
                "repository URL {url:?} has no network location"
            )));
        }

        let domain = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self { domain })
    }

    /// Host plus optional port.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Endpoints on `https://{domain}`.
    pub fn endpoints(&self) -> IndexEndpoints {
        IndexEndpoints::from_root(&format!("https://{}", self.domain))
    }
}

/// The two index endpoints the exchange talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEndpoints {
    pub audience_url: String,
    pub mint_token_url: String,
}

impl IndexEndpoints {
    /// Endpoints rooted at an explicit scheme and authority, for mirrors and
    /// local test servers.
    pub fn from_base_url(base: &str) -> ExchangeResult<Self> {
        let parsed = Url::parse(base)
            .map_err(|e| ExchangeError::config(format!("invalid endpoint base {base:?}: {e}")))?;
        if parsed.host_str().is_none() {
            return Err(ExchangeError::config(format!(
                "endpoint base {base:?} has no network location"
            )));
        }
        Ok(Self::from_root(parsed.origin().ascii_serialization().as_str()))
    }

    fn from_root(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            audience_url: format!("{root}{AUDIENCE_PATH}"),
            mint_token_url: format!("{root}{MINT_TOKEN_PATH}"),
        }
    }
}

/// Validated configuration for one exchange.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Repository the credential is minted for.
    pub repository: RepositoryReference,

    /// Where the audience and mint-token requests go.
    pub endpoints: IndexEndpoints,

    /// Step summary file appended to on failure.
    pub step_summary: Option<PathBuf>,
}

impl ExchangeConfig {
    /// Build from a repository URL. A missing URL is a configuration error.
    pub fn new(repository_url: Option<&str>) -> ExchangeResult<Self> {
        let url = repository_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                ExchangeError::config(
                    "no repository URL configured; set the `repository-url` input",
                )
            })?;

        let repository = RepositoryReference::parse(url)?;
        let endpoints = repository.endpoints();

        Ok(Self {
            repository,
            endpoints,
            step_summary: None,
        })
    }

    /// Create config from the workflow-runner environment.
    pub fn from_env() -> ExchangeResult<Self> {
        let repository_url = normalized_input(REPOSITORY_URL_INPUT);
        Ok(Self::new(repository_url.as_deref())?.with_step_summary(step_summary_from_env()))
    }

    /// Set the step summary file.
    pub fn with_step_summary(mut self, path: Option<PathBuf>) -> Self {
        self.step_summary = path;
        self
    }

    /// Root both endpoints at `base` instead of `https://{domain}`.
    pub fn with_endpoint_base(mut self, base: &str) -> ExchangeResult<Self> {
        self.endpoints = IndexEndpoints::from_base_url(base)?;
        Ok(self)
    }

    pub fn domain(&self) -> &str {
        self.repository.domain()
    }
}

/// Step summary path from `GITHUB_STEP_SUMMARY`, if set.
pub fn step_summary_from_env() -> Option<PathBuf> {
    non_empty_var(STEP_SUMMARY_ENV).map(PathBuf::from)
}
