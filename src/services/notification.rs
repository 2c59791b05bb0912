//! Admin broadcasts.

use crate::clients::NotificationClient;
use crate::jobs::{Job, JobQueue};
use crate::model::{AdminNotification, NotificationCreate};
use crate::notification_actor::NotificationError;
use canopy_actors::ActorClient;
use tracing::instrument;

#[derive(Clone)]
pub struct NotificationService {
    notifications: NotificationClient,
    jobs: JobQueue,
}

impl NotificationService {
    pub fn new(notifications: NotificationClient, jobs: JobQueue) -> Self {
        Self {
            notifications,
            jobs,
        }
    }

    /// Stores the notification, marks it queued and hands delivery to the job
    /// worker.
    #[instrument(skip(self, params), fields(title = %params.title))]
    pub async fn broadcast(
        &self,
        params: NotificationCreate,
    ) -> Result<AdminNotification, NotificationError> {
        let id = self.notifications.create_notification(params).await?;
        let queued = self.notifications.mark_queued(id).await?;
        self.jobs.dispatch(Job::DispatchAdminNotification(id));
        Ok(queued)
    }

    pub async fn list(&self) -> Result<Vec<AdminNotification>, NotificationError> {
        self.notifications.list().await
    }
}
