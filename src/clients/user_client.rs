use crate::model::{User, UserCreate, UserId, UserUpdate};
use crate::user_actor::UserError;
use canopy_actors::ActorClient;
use tracing::{debug, instrument};

resource_client!(
    /// Client for interacting with the User actor.
    UserClient,
    User,
    UserError
);

impl UserClient {
    #[instrument(skip(self, params))]
    pub async fn create_user(&self, params: UserCreate) -> Result<UserId, UserError> {
        debug!(?params, "create_user called");
        self.inner.create(params).await.map_err(UserError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(UserError::from)
    }

    /// Fetches a user that must exist.
    pub async fn require(&self, id: UserId) -> Result<User, UserError> {
        self.get(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, UserError> {
        Ok(self.list().await?.into_iter().find(|u| u.phone == phone))
    }

    pub async fn active_users(&self) -> Result<Vec<User>, UserError> {
        let mut users = self.list().await?;
        users.retain(|u| u.is_active);
        Ok(users)
    }
}
