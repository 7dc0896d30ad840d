//! Values that flow through the exchange, plus the wire types of the index
//! protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RefusalReason;

/// Audience the identity token must be bound to, as chosen by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience(String);

impl Audience {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed OIDC identity token. `Debug` never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityToken(<redacted>)")
    }
}

/// Short-lived publishing credential minted by the index. `Debug` never shows
/// the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Body of `GET /_/oidc/audience`.
#[derive(Debug, Deserialize)]
pub(crate) struct AudienceResponse {
    pub audience: String,
}

/// Body of `POST /_/oidc/github/mint-token`.
#[derive(Serialize)]
pub(crate) struct MintTokenRequest<'a> {
    pub token: &'a str,
}

/// Refusal body returned with a non-2xx mint-token status.
#[derive(Debug, Deserialize)]
pub(crate) struct RefusalResponse {
    pub errors: Vec<RefusalReason>,
}

/// Classified mint-token response.
#[derive(Debug, PartialEq, Eq)]
pub enum MintTokenResponse {
    /// `{ "token": ... }`
    Minted(Credential),
    /// `{ "errors": [{ "code", "description" }, ...] }`
    Refused(Vec<RefusalReason>),
}
