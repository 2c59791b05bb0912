//! Runtime configuration from environment variables.
//!
//! `main` loads a `.env` file first (dotenvy), so every key below can live there:
//!
//! | Key                          | Default            |
//! |------------------------------|--------------------|
//! | `CANOPY_BIND_ADDR`           | `127.0.0.1:8080`   |
//! | `CANOPY_ADMIN_KEY`           | required           |
//! | `CANOPY_ACTOR_BUFFER`        | `64`               |
//! | `CANOPY_MAX_BODY_BYTES`      | `1048576`          |
//! | `OTP_TTL_SECS`               | `300`              |
//! | `OTP_LENGTH`                 | `6`                |
//! | `OTP_MAX_ATTEMPTS`           | `3`                |
//! | `OTP_RESEND_COOLDOWN_SECS`   | `60`               |
//! | `OTP_FIXED_CODE`             | unset              |
//! | `SMS_ENDPOINT`, `SMS_API_KEY`, `SMS_SENDER_ID` | log only |
//! | `FCM_ENDPOINT`, `FCM_SERVER_KEY`               | log only |
//! | `GEOCODING_ENDPOINT`, `GEOCODING_API_KEY`      | no geocoding |
//! | `PAYMENTS_ENDPOINT`, `PAYMENTS_SECRET`         | fake gateway |
//! | `PAYMENTS_CURRENCY`          | `inr`              |
//!
//! A provider whose endpoint is unset falls back to a log-only or in-memory
//! adapter.

use crate::auth::OtpSettings;
use crate::geocoding::{Geocoder, HttpGeocoder, StaticGeocoder};
use crate::notifications::{FcmPushProvider, HttpSmsSender, LogPushProvider, LogSmsSender, PushProvider, SmsSender};
use crate::payments::{FakePaymentGateway, HttpPaymentGateway, PaymentGateway};
use chrono::Duration;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} is required")]
    Missing { key: &'static str },

    #[error("invalid configuration: {0}")]
    Inconsistent(String),

    #[error("could not build the {provider} client: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
}

/// Endpoint and credential of an outbound HTTP provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub admin_key: String,
    pub actor_buffer: usize,
    pub max_body_bytes: usize,
    pub otp: OtpSettings,
    pub sms: Option<ProviderConfig>,
    pub sms_sender_id: String,
    pub fcm: Option<ProviderConfig>,
    pub geocoding: Option<ProviderConfig>,
    pub payments: Option<ProviderConfig>,
    pub currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            admin_key: "dev-admin-key".to_string(),
            actor_buffer: 64,
            max_body_bytes: 1024 * 1024,
            otp: OtpSettings::default(),
            sms: None,
            sms_sender_id: "CANOPY".to_string(),
            fcm: None,
            geocoding: None,
            payments: None,
            currency: "inr".to_string(),
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn provider(
    lookup: &impl Fn(&str) -> Option<String>,
    endpoint_key: &'static str,
    secret_key: &'static str,
) -> Result<Option<ProviderConfig>, ConfigError> {
    let Some(endpoint) = lookup(endpoint_key).filter(|e| !e.trim().is_empty()) else {
        return Ok(None);
    };
    let key = lookup(secret_key)
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::Missing { key: secret_key })?;
    Ok(Some(ProviderConfig { endpoint, key }))
}

impl AppConfig {
    /// Reads the configuration through `lookup`, which maps a key to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let otp_defaults = OtpSettings::default();
        let config = Self {
            bind_addr: parse(&lookup, "CANOPY_BIND_ADDR", defaults.bind_addr)?,
            admin_key: lookup("CANOPY_ADMIN_KEY").ok_or(ConfigError::Missing {
                key: "CANOPY_ADMIN_KEY",
            })?,
            actor_buffer: parse(&lookup, "CANOPY_ACTOR_BUFFER", defaults.actor_buffer)?,
            max_body_bytes: parse(&lookup, "CANOPY_MAX_BODY_BYTES", defaults.max_body_bytes)?,
            otp: OtpSettings {
                ttl: Duration::seconds(parse(
                    &lookup,
                    "OTP_TTL_SECS",
                    otp_defaults.ttl.num_seconds(),
                )?),
                length: parse(&lookup, "OTP_LENGTH", otp_defaults.length)?,
                max_attempts: parse(&lookup, "OTP_MAX_ATTEMPTS", otp_defaults.max_attempts)?,
                resend_cooldown: Duration::seconds(parse(
                    &lookup,
                    "OTP_RESEND_COOLDOWN_SECS",
                    otp_defaults.resend_cooldown.num_seconds(),
                )?),
                fixed_code: lookup("OTP_FIXED_CODE").filter(|c| !c.trim().is_empty()),
            },
            sms: provider(&lookup, "SMS_ENDPOINT", "SMS_API_KEY")?,
            sms_sender_id: lookup("SMS_SENDER_ID").unwrap_or(defaults.sms_sender_id),
            fcm: provider(&lookup, "FCM_ENDPOINT", "FCM_SERVER_KEY")?,
            geocoding: provider(&lookup, "GEOCODING_ENDPOINT", "GEOCODING_API_KEY")?,
            payments: provider(&lookup, "PAYMENTS_ENDPOINT", "PAYMENTS_SECRET")?,
            currency: lookup("PAYMENTS_CURRENCY")
                .map(|c| c.trim().to_lowercase())
                .unwrap_or(defaults.currency),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_key.trim().is_empty() {
            return Err(ConfigError::Inconsistent(
                "the admin key must not be empty".to_string(),
            ));
        }
        if self.actor_buffer == 0 {
            return Err(ConfigError::Inconsistent(
                "the actor buffer must be at least 1".to_string(),
            ));
        }
        if self.otp.ttl <= Duration::zero() {
            return Err(ConfigError::Inconsistent(
                "the OTP lifetime must be positive".to_string(),
            ));
        }
        if !(4..=8).contains(&self.otp.length) {
            return Err(ConfigError::Inconsistent(format!(
                "OTP length must be between 4 and 8, got {}",
                self.otp.length
            )));
        }
        if self.otp.max_attempts == 0 {
            return Err(ConfigError::Inconsistent(
                "at least one OTP attempt must be allowed".to_string(),
            ));
        }
        if self.otp.resend_cooldown < Duration::zero() {
            return Err(ConfigError::Inconsistent(
                "the OTP resend cooldown cannot be negative".to_string(),
            ));
        }
        if let Some(code) = &self.otp.fixed_code {
            let digits = code.chars().all(|c| c.is_ascii_digit());
            if !digits || code.len() != self.otp.length as usize {
                return Err(ConfigError::Inconsistent(format!(
                    "the fixed OTP must be {} digits",
                    self.otp.length
                )));
            }
        }
        if self.currency.len() != 3 {
            return Err(ConfigError::Inconsistent(format!(
                "currency must be a three-letter code, got {}",
                self.currency
            )));
        }
        Ok(())
    }
}

/// The outbound adapters the platform talks to.
#[derive(Clone)]
pub struct Providers {
    pub push: Arc<dyn PushProvider>,
    pub sms: Arc<dyn SmsSender>,
    pub geocoder: Arc<dyn Geocoder>,
    pub payments: Arc<dyn PaymentGateway>,
}

fn build_error(provider: &'static str, e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Provider {
        provider,
        message: e.to_string(),
    }
}

impl Providers {
    /// HTTP adapters for the configured providers, local stand-ins for the rest.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let push: Arc<dyn PushProvider> = match &config.fcm {
            Some(fcm) => Arc::new(
                FcmPushProvider::new(fcm.endpoint.clone(), fcm.key.clone())
                    .map_err(|e| build_error("push", e))?,
            ),
            None => {
                info!("No push provider configured, push messages are logged");
                Arc::new(LogPushProvider)
            }
        };
        let sms: Arc<dyn SmsSender> = match &config.sms {
            Some(sms) => Arc::new(
                HttpSmsSender::new(
                    sms.endpoint.clone(),
                    sms.key.clone(),
                    config.sms_sender_id.clone(),
                )
                .map_err(|e| build_error("sms", e))?,
            ),
            None => {
                info!("No SMS provider configured, SMS are logged");
                Arc::new(LogSmsSender)
            }
        };
        let geocoder: Arc<dyn Geocoder> = match &config.geocoding {
            Some(geo) => Arc::new(
                HttpGeocoder::new(geo.endpoint.clone(), geo.key.clone())
                    .map_err(|e| build_error("geocoding", e))?,
            ),
            None => {
                info!("No geocoding provider configured, locations stay without coordinates");
                Arc::new(StaticGeocoder::new())
            }
        };
        let payments: Arc<dyn PaymentGateway> = match &config.payments {
            Some(pay) => Arc::new(
                HttpPaymentGateway::new(pay.endpoint.clone(), pay.key.clone())
                    .map_err(|e| build_error("payments", e))?,
            ),
            None => {
                info!("No payment gateway configured, using the in-memory gateway");
                Arc::new(FakePaymentGateway::new())
            }
        };
        Ok(Self {
            push,
            sms,
            geocoder,
            payments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_to_unset_keys() {
        let config = AppConfig::from_lookup(lookup(&[("CANOPY_ADMIN_KEY", "secret")])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.otp.length, 6);
        assert_eq!(config.otp.ttl, Duration::minutes(5));
        assert!(config.sms.is_none());
        assert_eq!(config.currency, "inr");
    }

    #[test]
    fn reads_values_and_providers() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CANOPY_ADMIN_KEY", "secret"),
            ("CANOPY_BIND_ADDR", "0.0.0.0:9000"),
            ("OTP_LENGTH", "4"),
            ("OTP_FIXED_CODE", "1234"),
            ("SMS_ENDPOINT", "https://sms.example.com/send"),
            ("SMS_API_KEY", "k"),
            ("PAYMENTS_CURRENCY", "USD"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.otp.fixed_code.as_deref(), Some("1234"));
        assert_eq!(
            config.sms,
            Some(ProviderConfig {
                endpoint: "https://sms.example.com/send".to_string(),
                key: "k".to_string()
            })
        );
        assert_eq!(config.currency, "usd");
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing {
                key: "CANOPY_ADMIN_KEY"
            }
        );
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("CANOPY_ADMIN_KEY", "s"), ("OTP_LENGTH", "six")])),
            Err(ConfigError::InvalidValue { key: "OTP_LENGTH", .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("CANOPY_ADMIN_KEY", "s"), ("OTP_LENGTH", "9")])),
            Err(ConfigError::Inconsistent(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("CANOPY_ADMIN_KEY", "s"), ("OTP_FIXED_CODE", "12345")])),
            Err(ConfigError::Inconsistent(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("CANOPY_ADMIN_KEY", "s"), ("OTP_TTL_SECS", "0")])),
            Err(ConfigError::Inconsistent(_))
        ));
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("CANOPY_ADMIN_KEY", "s"), ("FCM_ENDPOINT", "https://fcm")]))
                .unwrap_err(),
            ConfigError::Missing {
                key: "FCM_SERVER_KEY"
            }
        );
    }
}
