use crate::model::{
    AdminNotification, DeliveryReport, FcmToken, FcmTokenCreate, FcmTokenUpdate,
    NotificationCreate, NotificationId, UserId,
};
use crate::notification_actor::{NotificationAction, NotificationError};
use canopy_actors::ActorClient;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

resource_client!(
    /// Client for admin notifications.
    NotificationClient,
    AdminNotification,
    NotificationError
);

impl NotificationClient {
    #[instrument(skip(self, params), fields(title = %params.title))]
    pub async fn create_notification(
        &self,
        params: NotificationCreate,
    ) -> Result<NotificationId, NotificationError> {
        self.inner.create(params).await.map_err(NotificationError::from)
    }

    pub async fn require(&self, id: NotificationId) -> Result<AdminNotification, NotificationError> {
        self.get(id)
            .await?
            .ok_or_else(|| NotificationError::NotFound(id.to_string()))
    }

    pub async fn mark_queued(&self, id: NotificationId) -> Result<AdminNotification, NotificationError> {
        self.inner
            .perform_action(id, NotificationAction::MarkQueued)
            .await
            .map_err(NotificationError::from)
    }

    #[instrument(skip(self))]
    pub async fn record_delivery(
        &self,
        id: NotificationId,
        report: DeliveryReport,
        at: DateTime<Utc>,
    ) -> Result<AdminNotification, NotificationError> {
        self.inner
            .perform_action(id, NotificationAction::RecordDelivery { report, at })
            .await
            .map_err(NotificationError::from)
    }
}

resource_client!(
    /// Client for registered device push tokens.
    FcmTokenClient,
    FcmToken,
    NotificationError
);

impl FcmTokenClient {
    /// Registers a token, or moves an existing one to the new owner and device.
    #[instrument(skip(self, params), fields(user = %params.user_id))]
    pub async fn register(&self, params: FcmTokenCreate) -> Result<FcmToken, NotificationError> {
        let token = params.token.trim();
        let existing = self.list().await?.into_iter().find(|t| t.token == token);
        if let Some(found) = existing {
            debug!(token_id = %found.id, "Token known, moving it");
            let update = FcmTokenUpdate {
                user_id: params.user_id,
                device_id: params.device_id,
                platform: params.platform,
                at: params.at,
            };
            return self
                .inner
                .update(found.id, update)
                .await
                .map_err(NotificationError::from);
        }
        let id = self.inner.create(params).await?;
        self.get(id)
            .await?
            .ok_or_else(|| NotificationError::NotFound(id.to_string()))
    }

    pub async fn tokens_for(&self, user: UserId) -> Result<Vec<FcmToken>, NotificationError> {
        let mut tokens = self.list().await?;
        tokens.retain(|t| t.user_id == user);
        Ok(tokens)
    }

    /// Deletes the user's tokens registered from `device_id`. Returns how many
    /// were removed.
    #[instrument(skip(self))]
    pub async fn remove_device(
        &self,
        user: UserId,
        device_id: &str,
    ) -> Result<usize, NotificationError> {
        let stale: Vec<FcmToken> = self
            .tokens_for(user)
            .await?
            .into_iter()
            .filter(|t| t.device_id.as_deref() == Some(device_id))
            .collect();
        for token in &stale {
            self.delete(token.id).await?;
        }
        Ok(stale.len())
    }
}
