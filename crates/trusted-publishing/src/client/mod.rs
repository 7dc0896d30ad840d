//! Index client for the two trusted publishing endpoints.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::config::{ExchangeConfig, IndexEndpoints};
use crate::error::{ExchangeError, ExchangeResult};
use crate::types::{Audience, Credential, IdentityToken, MintTokenResponse};

mod http;

use http::{classify_audience, classify_mint, HttpBackend};

/// `User-Agent` sent on every index request.
pub const EXCHANGE_USER_AGENT: &str = concat!("trusted-publishing/", env!("CARGO_PKG_VERSION"));

/// Client for the index side of the exchange. Each method performs exactly
/// one request.
#[derive(Debug, Clone)]
pub struct IndexClient {
    http: HttpBackend,
    endpoints: IndexEndpoints,
    domain: String,
}

impl IndexClient {
    pub fn new(config: &ExchangeConfig) -> ExchangeResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(EXCHANGE_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|e| ExchangeError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http: HttpBackend { client },
            endpoints: config.endpoints.clone(),
            domain: config.domain().to_string(),
        })
    }

    /// `GET /_/oidc/audience`.
    pub async fn fetch_audience(&self) -> ExchangeResult<Audience> {
        let url = &self.endpoints.audience_url;
        debug!(url = %url, "fetching trusted publishing audience");

        let response = self.http.get(url).await?;
        let audience = classify_audience(&self.domain, &response)?;

        debug!(audience = %audience, "selected audience");
        Ok(audience)
    }

    /// `POST /_/oidc/github/mint-token`.
    pub async fn mint_token(&self, token: &IdentityToken) -> ExchangeResult<Credential> {
        let url = &self.endpoints.mint_token_url;
        debug!(url = %url, "exchanging identity token");

        let response = self.http.post_token(url, token.as_str()).await?;
        match classify_mint(&response)? {
            MintTokenResponse::Minted(credential) => {
                info!(domain = %self.domain, "minted publishing credential");
                Ok(credential)
            }
            MintTokenResponse::Refused(reasons) => Err(ExchangeError::Refused { reasons }),
        }
    }

    pub fn endpoints(&self) -> &IndexEndpoints {
        &self.endpoints
    }
}
