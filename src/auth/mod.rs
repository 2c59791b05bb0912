//! # Phone Authentication
//!
//! Users sign up and sign in with their phone number. Both flows end in a
//! one-time password sent by SMS; verifying it marks the phone verified,
//! optionally registers the device's push token and returns a bearer token.
//!
//! ```text
//! sign_up / sign_in ──► OTP by SMS ──► verify_otp ──► access token
//!                          ▲
//!                      resend_otp
//! ```

pub mod otp;
pub mod token;

pub use otp::{OtpService, OtpSettings};
pub use token::TokenStore;

use crate::clients::{FcmTokenClient, UserClient};
use crate::model::{FcmTokenCreate, Platform, User, UserCreate, UserId, UserUpdate};
use crate::notification_actor::NotificationError;
use crate::user_actor::UserError;
use crate::validation::ValidationErrors;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("The verification code is invalid.")]
    InvalidOtp,

    #[error("The verification code has expired.")]
    OtpExpired,

    #[error("Too many attempts. Please request a new code.")]
    TooManyAttempts,

    #[error("Please wait {retry_after} seconds before requesting a new code.")]
    TooManyRequests { retry_after: u64 },

    /// The SMS provider failed.
    #[error("{0}")]
    Delivery(String),

    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Device(#[from] NotificationError),
}

/// Strips spaces, dashes and parentheses and checks for `+` followed by 8 to 15
/// digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let phone: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = phone.strip_prefix('+')?;
    let valid = (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    valid.then_some(phone)
}

fn require_phone(errors: &mut ValidationErrors, raw: Option<&str>) -> Option<String> {
    let raw = errors.require("phone", raw)?;
    let phone = normalize_phone(&raw);
    if phone.is_none() {
        errors.add(
            "phone",
            "The phone must be a valid number with country code, e.g. +919876543210.",
        );
    }
    phone
}

fn check_email(errors: &mut ValidationErrors, email: Option<&str>) {
    if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        errors.check(valid, "email", "The email must be a valid email address.");
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUp {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PhoneRequest {
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtp {
    pub phone: Option<String>,
    pub code: Option<String>,
    pub fcm_token: Option<String>,
    pub device_id: Option<String>,
    pub platform: Option<Platform>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeviceRegistration {
    pub token: Option<String>,
    pub device_id: Option<String>,
    pub platform: Option<Platform>,
}

/// Result of a successful OTP verification.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserClient,
    devices: FcmTokenClient,
    otp: Arc<OtpService>,
    sessions: Arc<TokenStore>,
}

impl AuthService {
    pub fn new(
        users: UserClient,
        devices: FcmTokenClient,
        otp: Arc<OtpService>,
        sessions: Arc<TokenStore>,
    ) -> Self {
        Self {
            users,
            devices,
            otp,
            sessions,
        }
    }

    /// Registers a new user and sends them a verification code.
    #[instrument(skip(self, request))]
    pub async fn sign_up(&self, request: SignUp) -> Result<UserId, AuthError> {
        let mut errors = ValidationErrors::new();
        let name = errors.require("name", request.name.as_deref());
        let phone = require_phone(&mut errors, request.phone.as_deref());
        check_email(&mut errors, request.email.as_deref());
        if let Some(phone) = &phone {
            if self.users.find_by_phone(phone).await?.is_some() {
                errors.add("phone", "The phone has already been taken.");
            }
        }
        errors.into_result()?;
        let (Some(name), Some(phone)) = (name, phone) else {
            return Err(AuthError::Validation(ValidationErrors::single(
                "phone",
                "The phone field is required.",
            )));
        };

        let params = UserCreate {
            name,
            phone: phone.clone(),
            email: request.email,
        };
        let id = match self.users.create_user(params).await {
            Ok(id) => id,
            Err(UserError::PhoneTaken(_)) => {
                return Err(ValidationErrors::single("phone", "The phone has already been taken.").into())
            }
            Err(UserError::ValidationError(message)) => {
                return Err(ValidationErrors::single("name", message).into())
            }
            Err(e) => return Err(e.into()),
        };
        info!(user = %id, "User signed up");
        self.otp.issue(&phone, Utc::now()).await?;
        Ok(id)
    }

    async fn known_phone(&self, raw: Option<&str>) -> Result<User, AuthError> {
        let mut errors = ValidationErrors::new();
        let phone = require_phone(&mut errors, raw);
        errors.into_result()?;
        let Some(phone) = phone else {
            return Err(AuthError::InvalidOtp);
        };
        match self.users.find_by_phone(&phone).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(ValidationErrors::single("phone", "This account has been disabled.").into()),
            None => Err(ValidationErrors::single(
                "phone",
                "No account is registered with this phone number.",
            )
            .into()),
        }
    }

    /// Sends a verification code to an existing, active user.
    #[instrument(skip(self, request))]
    pub async fn sign_in(&self, request: PhoneRequest) -> Result<UserId, AuthError> {
        let user = self.known_phone(request.phone.as_deref()).await?;
        self.otp.issue(&user.phone, Utc::now()).await?;
        Ok(user.id)
    }

    #[instrument(skip(self, request))]
    pub async fn resend_otp(&self, request: PhoneRequest) -> Result<(), AuthError> {
        let user = self.known_phone(request.phone.as_deref()).await?;
        self.otp.issue(&user.phone, Utc::now()).await
    }

    /// Checks the code; on success marks the phone verified, registers the push
    /// token if one was sent and issues an access token.
    #[instrument(skip(self, request))]
    pub async fn verify_otp(&self, request: VerifyOtp) -> Result<Session, AuthError> {
        let mut errors = ValidationErrors::new();
        let code = errors.require("code", request.code.as_deref());
        let user = self.known_phone(request.phone.as_deref()).await;
        errors.into_result()?;
        let user = user?;
        let code = code.unwrap_or_default();

        let now = Utc::now();
        self.otp.verify(&user.phone, &code, now).await?;
        let user = self
            .users
            .update_user(
                user.id,
                UserUpdate {
                    phone_verified_at: Some(now),
                    ..Default::default()
                },
            )
            .await?;

        if let Some(token) = request.fcm_token.filter(|t| !t.trim().is_empty()) {
            self.devices
                .register(FcmTokenCreate {
                    user_id: user.id,
                    token,
                    device_id: request.device_id,
                    platform: request.platform.unwrap_or(Platform::Android),
                    at: now,
                })
                .await?;
        }

        let token = self.sessions.issue(user.id).await;
        info!(user = %user.id, "User verified");
        Ok(Session { token, user })
    }

    /// Resolves a bearer token.
    pub async fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        self.sessions
            .resolve(token)
            .await
            .ok_or(AuthError::Unauthenticated)
    }

    /// Revokes the token and forgets the device's push token.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &str, device_id: Option<&str>) -> Result<(), AuthError> {
        let user = self.authenticate(token).await?;
        self.sessions.revoke(token).await;
        if let Some(device) = device_id {
            let removed = self.devices.remove_device(user, device).await?;
            info!(%user, removed, "Device tokens removed");
        }
        Ok(())
    }

    pub async fn profile(&self, user: UserId) -> Result<User, AuthError> {
        Ok(self.users.require(user).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user: UserId,
        request: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &request.name {
            errors.check(!name.trim().is_empty(), "name", "The name field is required.");
        }
        check_email(&mut errors, request.email.as_deref());
        errors.into_result()?;
        let update = UserUpdate {
            name: request.name,
            email: request.email,
            ..Default::default()
        };
        Ok(self.users.update_user(user, update).await?)
    }

    /// Registers a push token for a signed-in user.
    pub async fn register_device(
        &self,
        user: UserId,
        request: DeviceRegistration,
    ) -> Result<(), AuthError> {
        let mut errors = ValidationErrors::new();
        let token = errors.require("token", request.token.as_deref());
        errors.into_result()?;
        let token = token.unwrap_or_default();
        self.devices
            .register(FcmTokenCreate {
                user_id: user,
                token,
                device_id: request.device_id,
                platform: request.platform.unwrap_or(Platform::Android),
                at: Utc::now(),
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phones_are_normalized() {
        assert_eq!(normalize_phone("+91 98765-43210").as_deref(), Some("+919876543210"));
        assert_eq!(normalize_phone("+1 (415) 555-0100").as_deref(), Some("+14155550100"));
        assert_eq!(normalize_phone("9876543210"), None);
        assert_eq!(normalize_phone("+1234567"), None);
        assert_eq!(normalize_phone("+12345678901234567"), None);
        assert_eq!(normalize_phone("+91 98x65 43210"), None);
    }
}
