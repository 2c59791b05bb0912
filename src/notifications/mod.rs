//! # Notification Delivery
//!
//! [`Notifier`] fans messages out over push and SMS:
//!
//! - push goes to every registered token of a user; a token the provider
//!   reports as unregistered is deleted on the spot
//! - SMS goes to the user's phone
//! - provider failures are counted and logged, never retried
//!
//! Admin broadcasts are delivered by the `DispatchAdminNotification` job, which
//! calls [`Notifier::dispatch_admin_notification`].

pub mod push;
pub mod sms;

pub use push::{FcmPushProvider, LogPushProvider, PushError, PushMessage, PushProvider, RecordingPushProvider};
pub use sms::{HttpSmsSender, LogSmsSender, RecordingSmsSender, SmsError, SmsSender};

use crate::clients::{FcmTokenClient, NotificationClient, UserClient};
use crate::model::{
    AdminNotification, Audience, Channel, DeliveryReport, NotificationId, NotificationStatus,
    User, UserId,
};
use crate::notification_actor::NotificationError;
use crate::user_actor::UserError;
use canopy_actors::ActorClient;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error(transparent)]
    User(#[from] UserError),
}

#[derive(Clone)]
pub struct Notifier {
    users: UserClient,
    tokens: FcmTokenClient,
    notifications: NotificationClient,
    push: Arc<dyn PushProvider>,
    sms: Arc<dyn SmsSender>,
}

impl Notifier {
    pub fn new(
        users: UserClient,
        tokens: FcmTokenClient,
        notifications: NotificationClient,
        push: Arc<dyn PushProvider>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            users,
            tokens,
            notifications,
            push,
            sms,
        }
    }

    /// Sends `message` to every device of `user`.
    ///
    /// Unregistered tokens are deleted and count as failed and pruned. Other
    /// failures count as failed.
    #[instrument(skip(self, message), fields(title = %message.title))]
    pub async fn push_to_user(
        &self,
        user: UserId,
        message: &PushMessage,
    ) -> Result<DeliveryReport, NotifyError> {
        let mut report = DeliveryReport::default();
        for token in self.tokens.tokens_for(user).await? {
            match self.push.send(&token.token, message).await {
                Ok(()) => report.delivered += 1,
                Err(PushError::InvalidToken) => {
                    info!(token_id = %token.id, "Pruning unregistered push token");
                    report.failed += 1;
                    match self.tokens.delete(token.id).await {
                        Ok(()) => report.pruned += 1,
                        Err(e) => warn!(token_id = %token.id, error = %e, "Failed to prune token"),
                    }
                }
                Err(e) => {
                    warn!(token_id = %token.id, error = %e, "Push delivery failed");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    async fn sms_to(&self, user: &User, body: &str) -> DeliveryReport {
        match self.sms.send(&user.phone, body).await {
            Ok(()) => DeliveryReport {
                delivered: 1,
                ..Default::default()
            },
            Err(e) => {
                warn!(user = %user.id, error = %e, "SMS delivery failed");
                DeliveryReport {
                    failed: 1,
                    ..Default::default()
                }
            }
        }
    }

    /// Pushes a one-off message to a user (order paid, adoption confirmed).
    pub async fn notify_user(
        &self,
        user: UserId,
        message: &PushMessage,
    ) -> Result<DeliveryReport, NotifyError> {
        self.users.require(user).await?;
        self.push_to_user(user, message).await
    }

    async fn audience(&self, audience: &Audience) -> Result<Vec<User>, NotifyError> {
        match audience {
            Audience::AllUsers => Ok(self.users.active_users().await?),
            Audience::Users(ids) => {
                let mut users = Vec::with_capacity(ids.len());
                for id in ids {
                    match self.users.get(*id).await? {
                        Some(user) if user.is_active => users.push(user),
                        _ => warn!(user = %id, "Skipping unknown or inactive recipient"),
                    }
                }
                Ok(users)
            }
        }
    }

    /// Delivers an admin broadcast and records the outcome on it.
    ///
    /// A notification that was already sent is returned unchanged.
    #[instrument(skip(self))]
    pub async fn dispatch_admin_notification(
        &self,
        id: NotificationId,
    ) -> Result<AdminNotification, NotifyError> {
        let notification = self.notifications.require(id).await?;
        if notification.status == NotificationStatus::Sent {
            info!("Notification already sent");
            return Ok(notification);
        }

        let recipients = self.audience(&notification.audience).await?;
        let message = PushMessage::new(&notification.title, &notification.body)
            .with_data("notification_id", notification.id.0.to_string());
        let sms_body = format!("{}: {}", notification.title, notification.body);

        let mut report = DeliveryReport::default();
        for user in &recipients {
            for channel in &notification.channels {
                match channel {
                    Channel::Push => report.merge(self.push_to_user(user.id, &message).await?),
                    Channel::Sms => report.merge(self.sms_to(user, &sms_body).await),
                }
            }
        }
        info!(
            recipients = recipients.len(),
            delivered = report.delivered,
            failed = report.failed,
            pruned = report.pruned,
            "Notification dispatched"
        );
        Ok(self
            .notifications
            .record_delivery(id, report, Utc::now())
            .await?)
    }
}
