//! Identity token acquisition.
//!
//! The exchange only needs "give me a signed token for this audience". Any
//! [`IdentityProvider`] satisfies that; [`GitHubActionsProvider`] is the
//! ambient one used by the binary.
//!
//! # GitHub Actions
//!
//! The job must be allowed to request tokens:
//!
//! ```yaml
//! permissions:
//!   id-token: write
//! ```

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::debug;
use url::Url;

use crate::error::IdentityError;
use crate::types::{Audience, IdentityToken};

/// URL the runner exposes for requesting OIDC tokens.
pub const REQUEST_URL_ENV: &str = "ACTIONS_ID_TOKEN_REQUEST_URL";

/// Bearer token authorizing requests to [`REQUEST_URL_ENV`].
pub const REQUEST_TOKEN_ENV: &str = "ACTIONS_ID_TOKEN_REQUEST_TOKEN";

/// Source of audience-bound identity tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn identity_token(&self, audience: &Audience) -> Result<IdentityToken, IdentityError>;
}

/// GitHub Actions ambient OIDC credentials.
///
/// The runner variables are read up front but only checked when a token is
/// requested, so a job without `id-token: write` fails at that step.
#[derive(Debug, Clone)]
pub struct GitHubActionsProvider {
    request_url: Option<String>,
    request_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct OidcTokenResponse {
    value: String,
}

impl GitHubActionsProvider {
    /// Create from the runner environment.
    pub fn from_env() -> Self {
        Self {
            request_url: std::env::var(REQUEST_URL_ENV).ok(),
            request_token: std::env::var(REQUEST_TOKEN_ENV).ok(),
            client: reqwest::Client::new(),
        }
    }

    /// Create with an explicit request URL and token.
    pub fn new(request_url: impl Into<String>, request_token: impl Into<String>) -> Self {
        Self {
            request_url: Some(request_url.into()),
            request_token: Some(request_token.into()),
            client: reqwest::Client::new(),
        }
    }

    fn token_url(&self, audience: &Audience) -> Result<Url, IdentityError> {
        let request_url = self.request_url.as_deref().ok_or_else(|| {
            IdentityError::new(format!(
                "GitHub: missing or insufficient OIDC token permissions, the {REQUEST_URL_ENV} environment variable was unset"
            ))
        })?;

        let mut url = Url::parse(request_url).map_err(|e| {
            IdentityError::new(format!("GitHub: malformed {REQUEST_URL_ENV}: {e}"))
        })?;
        url.query_pairs_mut()
            .append_pair("audience", audience.as_str());
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for GitHubActionsProvider {
    async fn identity_token(&self, audience: &Audience) -> Result<IdentityToken, IdentityError> {
        let url = self.token_url(audience)?;
        let request_token = self.request_token.as_deref().ok_or_else(|| {
            IdentityError::new(format!(
                "GitHub: missing or insufficient OIDC token permissions, the {REQUEST_TOKEN_ENV} environment variable was unset"
            ))
        })?;

        debug!(audience = %audience, "requesting GitHub Actions OIDC token");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("bearer {request_token}"))
            .header(ACCEPT, "application/json; api-version=2.0")
            .send()
            .await
            .map_err(|e| IdentityError::new(format!("GitHub: OIDC token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::new(format!(
                "GitHub: OIDC token request failed (code={}, body={:?})",
                status.as_u16(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: OidcTokenResponse = response.json().await.map_err(|e| {
            IdentityError::new(format!("GitHub: malformed or incomplete JSON: {e}"))
        })?;

        Ok(IdentityToken::new(body.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_github_token_bound_to_audience() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/token"))
            .and(query_param("api-version", "2.0"))
            .and(query_param("audience", "pypi"))
            .and(header("authorization", "bearer runner-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": "tok123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GitHubActionsProvider::new(
            format!("{}/token?api-version=2.0", server.uri()),
            "runner-secret",
        );
        let token = provider
            .identity_token(&Audience::new("pypi"))
            .await
            .unwrap();

        assert_eq!(token.as_str(), "tok123");
    }

    #[tokio::test]
    async fn test_github_missing_permissions() {
        let provider = GitHubActionsProvider {
            request_url: None,
            request_token: None,
            client: reqwest::Client::new(),
        };

        let err = provider
            .identity_token(&Audience::new("pypi"))
            .await
            .unwrap_err();
        assert!(err.message().contains(REQUEST_URL_ENV));
    }

    #[tokio::test]
    async fn test_github_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let provider = GitHubActionsProvider::new(format!("{}/token", server.uri()), "x");
        let err = provider
            .identity_token(&Audience::new("pypi"))
            .await
            .unwrap_err();

        assert!(err.message().contains("code=401"), "{err}");
    }

    #[tokio::test]
    async fn test_github_missing_value_field() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 1
            })))
            .mount(&server)
            .await;

        let provider = GitHubActionsProvider::new(format!("{}/token", server.uri()), "x");
        let err = provider
            .identity_token(&Audience::new("pypi"))
            .await
            .unwrap_err();

        assert!(err.message().contains("malformed"), "{err}");
    }
}
