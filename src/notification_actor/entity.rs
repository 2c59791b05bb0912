//! ActorEntity implementations for [`AdminNotification`] and [`FcmToken`].

use super::NotificationError;
use crate::model::{
    AdminNotification, Audience, DeliveryReport, FcmToken, FcmTokenCreate, FcmTokenId,
    FcmTokenUpdate, NotificationCreate, NotificationId, NotificationStatus,
};
use async_trait::async_trait;
use canopy_actors::ActorEntity;
use chrono::{DateTime, Utc};
use std::convert::Infallible;

/// Custom actions for the AdminNotification actor. Each returns the notification.
#[derive(Debug, Clone)]
pub enum NotificationAction {
    /// Draft (or Failed, for a retry) -> Queued.
    MarkQueued,
    /// Stores the fan-out counters. Sent when anything was delivered or nothing
    /// failed, Failed otherwise.
    RecordDelivery {
        report: DeliveryReport,
        at: DateTime<Utc>,
    },
}

#[async_trait]
impl ActorEntity for AdminNotification {
    type Id = NotificationId;
    type Create = NotificationCreate;
    type Update = Infallible;
    type Action = NotificationAction;
    type ActionResult = AdminNotification;
    type Context = ();
    type Error = NotificationError;

    fn from_create_params(
        id: NotificationId,
        params: NotificationCreate,
    ) -> Result<Self, Self::Error> {
        let title = params.title.trim().to_string();
        let body = params.body.trim().to_string();
        if title.is_empty() || body.is_empty() {
            return Err(NotificationError::Invalid(
                "title and body are required".to_string(),
            ));
        }
        let mut channels = Vec::with_capacity(params.channels.len());
        for channel in params.channels {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }
        if channels.is_empty() {
            return Err(NotificationError::Invalid(
                "at least one channel is required".to_string(),
            ));
        }
        if matches!(&params.audience, Audience::Users(users) if users.is_empty()) {
            return Err(NotificationError::Invalid(
                "the audience names no users".to_string(),
            ));
        }
        Ok(Self {
            id,
            title,
            body,
            audience: params.audience,
            channels,
            status: NotificationStatus::Draft,
            delivered: 0,
            failed: 0,
            pruned_tokens: 0,
            created_at: Utc::now(),
            sent_at: None,
        })
    }

    async fn on_update(&mut self, update: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: NotificationAction,
        _ctx: &(),
    ) -> Result<AdminNotification, Self::Error> {
        match action {
            NotificationAction::MarkQueued => {
                if !matches!(
                    self.status,
                    NotificationStatus::Draft | NotificationStatus::Failed
                ) {
                    return Err(NotificationError::Invalid(format!(
                        "{} is already {:?}",
                        self.id, self.status
                    )));
                }
                self.status = NotificationStatus::Queued;
            }
            NotificationAction::RecordDelivery { report, at } => {
                self.delivered = report.delivered;
                self.failed = report.failed;
                self.pruned_tokens = report.pruned;
                self.status = if report.delivered == 0 && report.failed > 0 {
                    NotificationStatus::Failed
                } else {
                    NotificationStatus::Sent
                };
                self.sent_at = Some(at);
            }
        }
        Ok(self.clone())
    }
}

#[async_trait]
impl ActorEntity for FcmToken {
    type Id = FcmTokenId;
    type Create = FcmTokenCreate;
    type Update = FcmTokenUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Context = ();
    type Error = NotificationError;

    fn from_create_params(id: FcmTokenId, params: FcmTokenCreate) -> Result<Self, Self::Error> {
        let token = params.token.trim().to_string();
        if token.is_empty() {
            return Err(NotificationError::Invalid("token is required".to_string()));
        }
        Ok(Self {
            id,
            user_id: params.user_id,
            token,
            device_id: params.device_id,
            platform: params.platform,
            last_used_at: params.at,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.token.clone())
    }

    async fn on_update(&mut self, update: FcmTokenUpdate, _ctx: &()) -> Result<(), Self::Error> {
        self.user_id = update.user_id;
        self.device_id = update.device_id;
        self.platform = update.platform;
        self.last_used_at = update.at;
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}
