//! HTTP layer: one-shot requests and response classification.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{ExchangeError, ExchangeResult};
use crate::types::{
    Audience, AudienceResponse, Credential, MintTokenRequest, MintTokenResponse, RefusalResponse,
};

/// Raw response: status plus the full body.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// HTTP backend (holds the reqwest client). Never retries.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
}

impl HttpBackend {
    pub(crate) async fn get(&self, url: &str) -> ExchangeResult<RawResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExchangeError::network(url, &e))?;
        Self::read(url, response).await
    }

    pub(crate) async fn post_token(&self, url: &str, token: &str) -> ExchangeResult<RawResponse> {
        let response = self
            .client
            .post(url)
            .json(&MintTokenRequest { token })
            .send()
            .await
            .map_err(|e| ExchangeError::network(url, &e))?;
        Self::read(url, response).await
    }

    async fn read(url: &str, response: reqwest::Response) -> ExchangeResult<RawResponse> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ExchangeError::network(url, &e))?
            .to_vec();
        debug!(url = %url, status = status.as_u16(), len = body.len(), "received response");
        Ok(RawResponse { status, body })
    }
}

/// Classify a `GET /_/oidc/audience` response.
pub(crate) fn classify_audience(domain: &str, response: &RawResponse) -> ExchangeResult<Audience> {
    let status = response.status;

    if status.is_success() {
        return serde_json::from_slice::<AudienceResponse>(&response.body)
            .map(|r| Audience::new(r.audience))
            .map_err(|_| ExchangeError::MalformedAudience {
                domain: domain.to_string(),
            });
    }

    let domain = domain.to_string();
    Err(match status {
        StatusCode::FORBIDDEN => ExchangeError::TrustedPublishingDisabled { domain },
        StatusCode::NOT_FOUND => ExchangeError::TrustedPublishingUnsupported { domain },
        other => ExchangeError::UnexpectedAudienceStatus {
            domain,
            status: other.as_u16(),
            reason: other.canonical_reason().unwrap_or("Unknown Status").to_string(),
        },
    })
}

/// Classify a `POST /_/oidc/github/mint-token` response into a credential or
/// a structured refusal. Anything else is an error.
pub(crate) fn classify_mint(response: &RawResponse) -> ExchangeResult<MintTokenResponse> {
    let status = response.status.as_u16();

    let payload: serde_json::Value = serde_json::from_slice(&response.body)
        .map_err(|_| ExchangeError::MalformedJson { status })?;

    if !response.status.is_success() {
        let refusal: RefusalResponse = serde_json::from_value(payload)
            .map_err(|_| ExchangeError::MalformedRefusal { status })?;
        return Ok(MintTokenResponse::Refused(refusal.errors));
    }

    let token = payload
        .get("token")
        .and_then(serde_json::Value::as_str)
        .ok_or(ExchangeError::MissingToken)?;

    // The credential is masked and printed as a single line.
    if token.contains(['\r', '\n']) {
        return Err(ExchangeError::MultiLineToken);
    }

    Ok(MintTokenResponse::Minted(Credential::new(token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefusalReason;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_audience_success() {
        let audience = classify_audience("d", &raw(200, r#"{"audience":"pypi"}"#)).unwrap();
        assert_eq!(audience.as_str(), "pypi");
    }

    #[test]
    fn test_audience_status_mapping() {
        assert!(matches!(
            classify_audience("d", &raw(403, "")),
            Err(ExchangeError::TrustedPublishingDisabled { .. })
        ));
        assert!(matches!(
            classify_audience("d", &raw(404, "")),
            Err(ExchangeError::TrustedPublishingUnsupported { .. })
        ));

        match classify_audience("d", &raw(503, "")) {
            Err(ExchangeError::UnexpectedAudienceStatus { status, reason, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(reason, "Service Unavailable");
            }
            other => panic!("expected UnexpectedAudienceStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_audience_missing_field() {
        for body in [r#"{"aud":"pypi"}"#, "<html>", r#"{"audience":7}"#] {
            assert!(
                matches!(
                    classify_audience("d", &raw(200, body)),
                    Err(ExchangeError::MalformedAudience { .. })
                ),
                "{body}"
            );
        }
    }

    #[test]
    fn test_mint_success() {
        let outcome = classify_mint(&raw(200, r#"{"token":"secret-abc"}"#)).unwrap();
        assert_eq!(outcome, MintTokenResponse::Minted(Credential::new("secret-abc")));
    }

    #[test]
    fn test_mint_invalid_json_any_status() {
        for status in [200, 400, 502] {
            match classify_mint(&raw(status, "<html>upstream</html>")) {
                Err(ExchangeError::MalformedJson { status: s }) => assert_eq!(s, status),
                other => panic!("expected MalformedJson, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_mint_refusal_keeps_order() {
        let body = r#"{"errors":[
            {"code":"invalid-token","description":"audience mismatch"},
            {"code":"invalid-publisher","description":"no matching publisher"}
        ]}"#;

        let outcome = classify_mint(&raw(422, body)).unwrap();
        assert_eq!(
            outcome,
            MintTokenResponse::Refused(vec![
                RefusalReason {
                    code: "invalid-token".into(),
                    description: "audience mismatch".into(),
                },
                RefusalReason {
                    code: "invalid-publisher".into(),
                    description: "no matching publisher".into(),
                },
            ])
        );
    }

    #[test]
    fn test_mint_refusal_without_errors() {
        assert!(matches!(
            classify_mint(&raw(400, r#"{"message":"nope"}"#)),
            Err(ExchangeError::MalformedRefusal { status: 400 })
        ));
    }

    #[test]
    fn test_mint_success_without_token() {
        assert!(matches!(
            classify_mint(&raw(200, r#"{"errors":[]}"#)),
            Err(ExchangeError::MissingToken)
        ));
    }

    #[test]
    fn test_mint_token_with_line_break_is_rejected() {
        for body in [
            r#"{"token":"abc\nSECOND"}"#,
            r#"{"token":"abc\r\nSECOND"}"#,
            r#"{"token":"abc\r"}"#,
        ] {
            let err = classify_mint(&raw(200, body)).unwrap_err();
            assert!(matches!(err, ExchangeError::MultiLineToken), "{body}: {err:?}");
            assert_eq!(err.kind(), crate::ErrorKind::MalformedServerResponse);
        }
    }
}
