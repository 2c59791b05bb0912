//! One-time passwords sent by SMS.
//!
//! A phone has at most one pending code. Only a SHA-256 digest of the code is
//! kept, together with its expiry and the number of wrong guesses. Time is
//! passed in by the caller.

use super::AuthError;
use crate::notifications::SmsSender;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OtpSettings {
    pub ttl: Duration,
    /// Number of digits, 4..=8.
    pub length: u32,
    /// Wrong guesses allowed before the code is locked.
    pub max_attempts: u32,
    /// Minimum time between two codes for the same phone.
    pub resend_cooldown: Duration,
    /// Sent instead of a random code. For demos and tests.
    pub fixed_code: Option<String>,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
            length: 6,
            max_attempts: 3,
            resend_cooldown: Duration::seconds(60),
            fixed_code: None,
        }
    }
}

struct PendingOtp {
    digest: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    attempts: u32,
}

fn digest(phone: &str, code: &str) -> String {
    hex::encode(Sha256::digest(format!("{phone}:{code}").as_bytes()))
}

/// `length` decimal digits, zero padded.
///
/// A v4 UUID comes from the OS random source and its low 62 bits are all
/// random, so reducing it modulo `10^length` (at most `10^8`) has no bias worth
/// measuring.
fn random_digits(length: u32) -> String {
    let width = length as usize;
    let modulus = 10u128.pow(length);
    format!("{:0width$}", Uuid::new_v4().as_u128() % modulus)
}

pub struct OtpService {
    settings: OtpSettings,
    sms: Arc<dyn SmsSender>,
    pending: Mutex<HashMap<String, PendingOtp>>,
}

impl OtpService {
    pub fn new(settings: OtpSettings, sms: Arc<dyn SmsSender>) -> Self {
        Self {
            settings,
            sms,
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn generate(&self) -> String {
        if let Some(code) = &self.settings.fixed_code {
            return code.clone();
        }
        random_digits(self.settings.length)
    }

    /// Generates a code for `phone` and sends it by SMS.
    ///
    /// # Errors
    /// - `TooManyRequests` inside the resend cooldown of the previous code
    /// - `Delivery` when the SMS could not be sent; no code stays pending
    pub async fn issue(&self, phone: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let code = self.generate();
        {
            let mut pending = self.pending.lock().await;
            if let Some(previous) = pending.get(phone) {
                let ready_at = previous.issued_at + self.settings.resend_cooldown;
                if now < ready_at {
                    let wait = (ready_at - now).num_milliseconds();
                    return Err(AuthError::TooManyRequests {
                        retry_after: u64::try_from((wait + 999) / 1000).unwrap_or(1),
                    });
                }
            }
            pending.insert(
                phone.to_string(),
                PendingOtp {
                    digest: digest(phone, &code),
                    issued_at: now,
                    expires_at: now + self.settings.ttl,
                    attempts: 0,
                },
            );
        }

        let body = format!(
            "Your Canopy verification code is {code}. It expires in {} minutes.",
            self.settings.ttl.num_minutes().max(1)
        );
        if let Err(e) = self.sms.send(phone, &body).await {
            warn!(%phone, error = %e, "Failed to send OTP");
            let mut pending = self.pending.lock().await;
            if pending.get(phone).is_some_and(|p| p.issued_at == now) {
                pending.remove(phone);
            }
            return Err(AuthError::Delivery(
                "We could not send the verification code. Please try again.".to_string(),
            ));
        }
        info!(%phone, "OTP issued");
        Ok(())
    }

    /// Checks `code` against the pending code of `phone`. Success consumes it.
    ///
    /// # Errors
    /// - `OtpExpired` past the TTL (the code is dropped)
    /// - `TooManyAttempts` once `max_attempts` wrong guesses were made
    /// - `InvalidOtp` for a wrong code or when no code is pending
    pub async fn verify(&self, phone: &str, code: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let mut pending = self.pending.lock().await;
        let Some(otp) = pending.get_mut(phone) else {
            return Err(AuthError::InvalidOtp);
        };
        if now >= otp.expires_at {
            pending.remove(phone);
            return Err(AuthError::OtpExpired);
        }
        if otp.attempts >= self.settings.max_attempts {
            return Err(AuthError::TooManyAttempts);
        }
        if otp.digest != digest(phone, code.trim()) {
            otp.attempts += 1;
            debug!(%phone, attempts = otp.attempts, "Wrong OTP");
            return Err(AuthError::InvalidOtp);
        }
        pending.remove(phone);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::RecordingSmsSender;

    const PHONE: &str = "+919876543210";

    fn service(sms: Arc<RecordingSmsSender>) -> OtpService {
        OtpService::new(OtpSettings::default(), sms)
    }

    #[test]
    fn random_digits_are_padded_to_length() {
        for length in 4..=8 {
            for _ in 0..50 {
                let code = random_digits(length);
                assert_eq!(code.len(), length as usize);
                assert!(code.bytes().all(|b| b.is_ascii_digit()), "{code}");
            }
        }
        let distinct: std::collections::HashSet<_> = (0..20).map(|_| random_digits(8)).collect();
        assert!(distinct.len() > 1);
    }

    #[tokio::test]
    async fn test_code_is_sent_and_consumed() {
        let sms = Arc::new(RecordingSmsSender::new());
        let otp = service(sms.clone());
        let now = Utc::now();

        otp.issue(PHONE, now).await.unwrap();
        let code = sms.last_code_for(PHONE).unwrap();
        assert_eq!(code.len(), 6);

        otp.verify(PHONE, &code, now).await.unwrap();
        assert!(matches!(otp.verify(PHONE, &code, now).await, Err(AuthError::InvalidOtp)));
    }

    #[tokio::test]
    async fn test_wrong_code_fails_and_locks_after_limit() {
        let sms = Arc::new(RecordingSmsSender::new());
        let otp = service(sms.clone());
        let now = Utc::now();
        otp.issue(PHONE, now).await.unwrap();
        let code = sms.last_code_for(PHONE).unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..3 {
            assert!(matches!(otp.verify(PHONE, wrong, now).await, Err(AuthError::InvalidOtp)));
        }
        assert!(matches!(
            otp.verify(PHONE, &code, now).await,
            Err(AuthError::TooManyAttempts)
        ));
    }

    #[tokio::test]
    async fn test_expiry_and_cooldown() {
        let sms = Arc::new(RecordingSmsSender::new());
        let otp = service(sms.clone());
        let now = Utc::now();
        otp.issue(PHONE, now).await.unwrap();

        match otp.issue(PHONE, now + Duration::seconds(20)).await {
            Err(AuthError::TooManyRequests { retry_after }) => assert_eq!(retry_after, 40),
            other => panic!("expected cooldown, got {other:?}"),
        }

        let code = sms.last_code_for(PHONE).unwrap();
        let late = now + Duration::minutes(5);
        assert!(matches!(otp.verify(PHONE, &code, late).await, Err(AuthError::OtpExpired)));
    }

    #[tokio::test]
    async fn test_failed_delivery_leaves_nothing_pending() {
        let sms = Arc::new(RecordingSmsSender::new());
        sms.set_failing(true);
        let otp = OtpService::new(
            OtpSettings {
                fixed_code: Some("1234".to_string()),
                length: 4,
                ..Default::default()
            },
            sms.clone(),
        );
        let now = Utc::now();
        assert!(matches!(otp.issue(PHONE, now).await, Err(AuthError::Delivery(_))));
        assert!(matches!(otp.verify(PHONE, "1234", now).await, Err(AuthError::InvalidOtp)));

        sms.set_failing(false);
        otp.issue(PHONE, now).await.unwrap();
        otp.verify(PHONE, "1234", now).await.unwrap();
    }
}
