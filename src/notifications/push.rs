//! Push delivery through Firebase Cloud Messaging.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// A push notification payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    /// The token is no longer registered; it should be deleted.
    #[error("push token is no longer valid")]
    InvalidToken,

    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push provider returned status {0}")]
    Provider(u16),
}

#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError>;
}

/// FCM HTTP v1 style sender.
pub struct FcmPushProvider {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl FcmPushProvider {
    pub fn new(endpoint: String, server_key: String) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            server_key,
        })
    }
}

/// Whether an FCM error response means the token is dead.
fn is_unregistered(status: u16, body: &str) -> bool {
    status == 404 || status == 410 || body.contains("UNREGISTERED")
}

#[async_trait]
impl PushProvider for FcmPushProvider {
    #[instrument(skip(self, message), fields(title = %message.title))]
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        let payload = json!({
            "message": {
                "token": token,
                "notification": { "title": message.title, "body": message.body },
                "data": message.data,
            }
        });
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.server_key)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %body, "FCM rejected message");
        if is_unregistered(status.as_u16(), &body) {
            Err(PushError::InvalidToken)
        } else {
            Err(PushError::Provider(status.as_u16()))
        }
    }
}

/// Logs messages instead of sending them.
pub struct LogPushProvider;

#[async_trait]
impl PushProvider for LogPushProvider {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        let tail = token.get(token.len().saturating_sub(6)..).unwrap_or(token);
        info!(token = %format!("...{tail}"), title = %message.title, "Push (log only)");
        Ok(())
    }
}

/// Records sent messages; tokens marked invalid are rejected.
#[derive(Default)]
pub struct RecordingPushProvider {
    invalid: HashSet<String>,
    sent: Mutex<Vec<(String, PushMessage)>>,
}

impl RecordingPushProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invalid(mut self, token: &str) -> Self {
        self.invalid.insert(token.to_string());
        self
    }

    pub fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PushProvider for RecordingPushProvider {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        if self.invalid.contains(token) {
            return Err(PushError::InvalidToken);
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((token.to_string(), message.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_tokens_are_recognized() {
        assert!(is_unregistered(404, ""));
        assert!(is_unregistered(410, ""));
        assert!(is_unregistered(400, r#"{"error":{"details":[{"errorCode":"UNREGISTERED"}]}}"#));
        assert!(!is_unregistered(500, "internal"));
    }
}
