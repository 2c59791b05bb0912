//! Outbound SMS, used for one-time passwords and admin broadcasts.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("sms request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sms provider returned status {0}")]
    Provider(u16),
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, phone: &str, body: &str) -> Result<(), SmsError>;
}

#[derive(Serialize)]
struct SmsRequest<'a> {
    to: &'a str,
    from: &'a str,
    message: &'a str,
}

/// JSON-over-HTTP SMS gateway authenticated with an API key header.
pub struct HttpSmsSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender_id: String,
}

impl HttpSmsSender {
    pub fn new(endpoint: String, api_key: String, sender_id: String) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            sender_id,
        })
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    #[instrument(skip(self, body))]
    async fn send(&self, phone: &str, body: &str) -> Result<(), SmsError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&SmsRequest {
                to: phone,
                from: &self.sender_id,
                message: body,
            })
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SmsError::Provider(response.status().as_u16()))
        }
    }
}

/// Logs messages instead of sending them. OTP codes end up in the log, so
/// this is for local runs only.
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, phone: &str, body: &str) -> Result<(), SmsError> {
        info!(%phone, %body, "SMS (log only)");
        Ok(())
    }
}

/// Records messages; can be switched to fail every send.
#[derive(Default)]
pub struct RecordingSmsSender {
    failing: AtomicBool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The digits of the last message sent to `phone`.
    pub fn last_code_for(&self, phone: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == phone)
            .map(|(_, body)| {
                body.split(|c: char| !c.is_ascii_digit())
                    .find(|run| run.len() >= 4)
                    .unwrap_or_default()
                    .to_string()
            })
    }
}

#[async_trait]
impl SmsSender for RecordingSmsSender {
    async fn send(&self, phone: &str, body: &str) -> Result<(), SmsError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(SmsError::Provider(503));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((phone.to_string(), body.to_string()));
        Ok(())
    }
}
