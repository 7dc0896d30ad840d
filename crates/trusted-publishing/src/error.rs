//! Error types for the trusted publishing exchange.

use std::fmt;

/// Coarse failure classes. Every class is fatal to the current invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing/invalid repository reference, or the index reports trusted
    /// publishing as unavailable for it.
    Configuration,
    /// The index answered with something that looks like an outage.
    ServerUnavailable,
    /// The ambient identity token could not be obtained.
    IdentityProvider,
    /// The index explicitly rejected the exchange.
    ExchangeRefused,
    /// A syntactically valid response that lacks the expected fields.
    MalformedServerResponse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::ServerUnavailable => "server-unavailable",
            Self::IdentityProvider => "identity-provider",
            Self::ExchangeRefused => "exchange-refused",
            Self::MalformedServerResponse => "malformed-server-response",
        };
        f.write_str(s)
    }
}

/// Failure of the identity token capability. The message is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct IdentityError {
    message: String,
}

impl IdentityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A single machine-readable reason the index gave for refusing an exchange.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct RefusalReason {
    pub code: String,
    pub description: String,
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "* `{}`: {}", self.code, self.description)
    }
}

/// Exchange errors.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// Invalid or missing configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Audience endpoint answered 403.
    #[error("audience retrieval failed: repository at {domain} has trusted publishing disabled")]
    TrustedPublishingDisabled { domain: String },

    /// Audience endpoint answered 404.
    #[error(
        "audience retrieval failed: repository at {domain} does not indicate trusted publishing support"
    )]
    TrustedPublishingUnsupported { domain: String },

    /// Audience endpoint answered any other non-2xx status.
    #[error("audience retrieval failed: repository at {domain} responded with unexpected {status}: {reason}")]
    UnexpectedAudienceStatus {
        domain: String,
        status: u16,
        reason: String,
    },

    /// Audience endpoint answered 2xx without a usable `audience` field.
    #[error("audience retrieval failed: repository at {domain} returned a malformed audience response")]
    MalformedAudience { domain: String },

    /// Transport-level failure (DNS, refused connection, reset, ...).
    #[error("network error while contacting {url}: {message}")]
    Network { url: String, message: String },

    /// The identity token capability failed.
    #[error("OpenID Connect token retrieval failed: {0}")]
    Identity(#[from] IdentityError),

    /// Mint-token response body was not JSON.
    #[error("token request failed: the index produced an unexpected {status} response")]
    MalformedJson { status: u16 },

    /// Mint-token endpoint refused the exchange.
    #[error("token request failed: the server refused the request ({} reasons)", .reasons.len())]
    Refused { reasons: Vec<RefusalReason> },

    /// Mint-token endpoint failed without a well-formed `errors` list.
    #[error("token request failed: the index answered {status} without a list of reasons")]
    MalformedRefusal { status: u16 },

    /// Mint-token endpoint succeeded without a `token` field.
    #[error("token response error: the index gave us an invalid response")]
    MissingToken,

    /// Mint-token endpoint returned a `token` spanning more than one line.
    #[error("token response error: the index returned a credential containing a line break")]
    MultiLineToken,
}

impl ExchangeError {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. }
            | Self::TrustedPublishingDisabled { .. }
            | Self::TrustedPublishingUnsupported { .. } => ErrorKind::Configuration,

            Self::UnexpectedAudienceStatus { .. }
            | Self::MalformedJson { .. }
            | Self::Network { .. } => ErrorKind::ServerUnavailable,

            Self::Identity(_) => ErrorKind::IdentityProvider,

            Self::Refused { .. } => ErrorKind::ExchangeRefused,

            Self::MalformedAudience { .. }
            | Self::MalformedRefusal { .. }
            | Self::MissingToken
            | Self::MultiLineToken => ErrorKind::MalformedServerResponse,
        }
    }

    /// Exit code for the process. Every failure maps to 1.
    pub fn exit_code(&self) -> i32 {
        crate::exit_codes::FAILURE
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn network(url: &str, err: &reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
