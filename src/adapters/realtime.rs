//! Realtime voice-session provider client.
//!
//! Talks to the provider's session endpoint over HTTPS with bearer auth.
//! Connect and read timeouts are finite and come from configuration, so a
//! hung provider resolves to `Error::Upstream` instead of hanging the
//! caller. There is no mock-credential fallback: provider failures are
//! loud.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{SessionCredential, SessionProvider, SessionRequest};
use crate::core::{Error, Result};

/// HTTP client for the realtime session endpoint
pub struct RealtimeClient {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

/// Provider response body, e.g.
/// `{"id": "sess_abc", "client_secret": {"value": "ek_...", "expires_at": 1736500000}}`
#[derive(Debug, Deserialize)]
struct SessionResponseBody {
    id: String,
    client_secret: ClientSecret,
}

#[derive(Debug, Deserialize)]
struct ClientSecret {
    value: String,
    /// Unix timestamp (seconds) at which the key expires
    expires_at: i64,
}

impl RealtimeClient {
    /// Build a client with the given endpoint, key, and timeouts
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| Error::Upstream(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

/// Parse the provider response body into a credential.
///
/// `expires_at` is an absolute epoch timestamp; the credential carries the
/// remaining lifetime relative to `now` (clamped at zero for keys that are
/// already expired on arrival).
fn parse_session_response(body: &str, now: DateTime<Utc>) -> Result<SessionCredential> {
    let parsed: SessionResponseBody = serde_json::from_str(body)
        .map_err(|e| Error::Upstream(format!("malformed session response: {}", e)))?;

    if parsed.id.is_empty() || parsed.client_secret.value.is_empty() {
        return Err(Error::Upstream(
            "session response missing id or client secret".to_string(),
        ));
    }

    Ok(SessionCredential {
        ephemeral_key: parsed.client_secret.value,
        session_id: parsed.id,
        expires_in_seconds: (parsed.client_secret.expires_at - now.timestamp()).max(0),
    })
}

#[async_trait]
impl SessionProvider for RealtimeClient {
    async fn create_session(&self, request: &SessionRequest) -> Result<SessionCredential> {
        let body = serde_json::json!({
            "model": request.model,
            "modalities": { "audio": true, "text": false },
            "voice": request.voice.as_api_value(),
            "instructions": request.instructions,
            "metadata": { "alarm_id": request.alarm_id },
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("session request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("failed to read session response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "session endpoint returned {}: {}",
                status,
                text.trim()
            )));
        }

        let credential = parse_session_response(&text, Utc::now())?;
        tracing::info!(
            alarm_id = request.alarm_id,
            session_id = %credential.session_id,
            "Created realtime session"
        );
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_session_response() {
        let now = Utc.timestamp_opt(1_736_500_000, 0).unwrap();
        let body = r#"{
            "id": "sess_abc",
            "client_secret": { "value": "ek_secret", "expires_at": 1736500900 }
        }"#;

        let credential = parse_session_response(body, now).unwrap();
        assert_eq!(credential.session_id, "sess_abc");
        assert_eq!(credential.ephemeral_key, "ek_secret");
        assert_eq!(credential.expires_in_seconds, 900);
    }

    #[test]
    fn test_expired_key_clamps_to_zero() {
        let now = Utc.timestamp_opt(1_736_500_000, 0).unwrap();
        let body = r#"{
            "id": "sess_abc",
            "client_secret": { "value": "ek_secret", "expires_at": 1736400000 }
        }"#;

        let credential = parse_session_response(body, now).unwrap();
        assert_eq!(credential.expires_in_seconds, 0);
    }

    #[test]
    fn test_malformed_body_is_upstream_error() {
        let err = parse_session_response("not json", Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));

        let err = parse_session_response(r#"{"id": "x"}"#, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let body = r#"{
            "id": "",
            "client_secret": { "value": "ek", "expires_at": 0 }
        }"#;
        let err = parse_session_response(body, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
