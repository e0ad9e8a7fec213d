//! # Push Client
//!
//! Thin wrapper over the FCM HTTP API, behind a trait so tests can
//! record sends instead of hitting the network.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::config::PushConfig;

use super::errors::{NotifyError, NotifyResult};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
}

/// What FCM said about one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The token is dead and should be pruned.
    InvalidToken,
}

pub trait PushClient {
    fn send(
        &self,
        token: &str,
        message: &PushMessage,
    ) -> impl std::future::Future<Output = NotifyResult<SendOutcome>> + Send;
}

/// Real FCM client. With `enabled = false` every send is a logged no-op,
/// so development setups work without credentials.
#[derive(Clone)]
pub struct HttpPushClient {
    http: reqwest::Client,
    config: PushConfig,
}

impl HttpPushClient {
    pub fn new(config: PushConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl PushClient for HttpPushClient {
    async fn send(&self, token: &str, message: &PushMessage) -> NotifyResult<SendOutcome> {
        if !self.config.enabled {
            debug!(title = %message.title, "push disabled, dropping message");
            return Ok(SendOutcome::Delivered);
        }

        let payload = json!({
            "to": token,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": message.data,
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("Authorization", format!("key={}", self.config.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Delivery(format!(
                "FCM returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        // Per-token errors come back 200 with an error string per result.
        let token_error = body
            .get("results")
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("error"))
            .and_then(|e| e.as_str());

        match token_error {
            Some("NotRegistered") | Some("InvalidRegistration") => Ok(SendOutcome::InvalidToken),
            Some(other) => Err(NotifyError::Delivery(other.to_string())),
            None => Ok(SendOutcome::Delivered),
        }
    }
}

/// Recording client for tests.
#[derive(Default)]
pub struct MockPushClient {
    pub sent: Mutex<Vec<(String, PushMessage)>>,
    /// Tokens the mock reports as dead.
    pub invalid_tokens: Vec<String>,
}

impl MockPushClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("mock lock")
            .iter()
            .map(|(token, _)| token.clone())
            .collect()
    }
}

impl PushClient for MockPushClient {
    async fn send(&self, token: &str, message: &PushMessage) -> NotifyResult<SendOutcome> {
        if self.invalid_tokens.iter().any(|t| t == token) {
            return Ok(SendOutcome::InvalidToken);
        }
        self.sent
            .lock()
            .expect("mock lock")
            .push((token.to_string(), message.clone()));
        Ok(SendOutcome::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_client_is_a_noop() {
        let client = HttpPushClient::new(PushConfig {
            enabled: false,
            endpoint: "http://127.0.0.1:1".to_string(),
            server_key: String::new(),
        });

        let message = PushMessage {
            title: "Order ready".to_string(),
            body: "CEN-20260804-0001".to_string(),
            data: HashMap::new(),
        };
        // Never touches the (unreachable) endpoint.
        assert_eq!(
            client.send("token", &message).await.unwrap(),
            SendOutcome::Delivered
        );
    }

    #[tokio::test]
    async fn test_mock_records_sends_and_invalid_tokens() {
        let mut client = MockPushClient::new();
        client.invalid_tokens.push("dead".to_string());

        let message = PushMessage {
            title: "t".to_string(),
            body: "b".to_string(),
            data: HashMap::new(),
        };

        assert_eq!(
            client.send("live", &message).await.unwrap(),
            SendOutcome::Delivered
        );
        assert_eq!(
            client.send("dead", &message).await.unwrap(),
            SendOutcome::InvalidToken
        );
        assert_eq!(client.sent_to(), vec!["live"]);
    }
}
