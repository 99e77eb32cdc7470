//! Reporting wire contract and its HTTP adapter.

use async_trait::async_trait;
use gate_core::{Verdict, WhitelistStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Client-observed transport failures. All of them are recovered by
/// retaining the last-known verdict and retrying next interval; none is
/// fatal.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("server answered {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The report an agent sends every interval.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub product_key: String,
    pub place_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Verdict payload as it appears on the wire.
#[derive(Debug, Deserialize)]
struct WireVerdict {
    authorized: bool,
    status: WhitelistStatus,
    active: bool,
}

impl From<WireVerdict> for Verdict {
    fn from(wire: WireVerdict) -> Self {
        Verdict {
            authorized: wire.authorized,
            status: wire.status,
            active: wire.active,
        }
    }
}

/// How the agent reaches the reporting endpoint.
#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// Send one report and parse the verdict.
    async fn send_report(&self, report: &AgentReport) -> Result<Verdict, TransportError>;
}

/// Production transport: `POST {base_url}/report`.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ReportTransport for HttpTransport {
    async fn send_report(&self, report: &AgentReport) -> Result<Verdict, TransportError> {
        let url = format!("{}/report", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let wire: WireVerdict = response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        Ok(wire.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_without_empty_fields() {
        let report = AgentReport {
            product_key: "key".to_string(),
            place_id: "42".to_string(),
            game_name: None,
            user_id: None,
            username: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "product_key": "key", "place_id": "42" })
        );
    }

    #[test]
    fn test_wire_verdict_parses() {
        let wire: WireVerdict = serde_json::from_str(
            r#"{"authorized":false,"status":"unwhitelisted","active":true,"game_name":"X"}"#,
        )
        .unwrap();
        let verdict: Verdict = wire.into();
        assert!(!verdict.authorized);
        assert_eq!(verdict.status, WhitelistStatus::Unwhitelisted);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result: Result<WireVerdict, _> = serde_json::from_str("{\"authorized\":\"maybe\"}");
        assert!(result.is_err());
    }
}
