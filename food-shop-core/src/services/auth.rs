use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::cache::{magic_link_key, CacheError, CacheStore, CacheStoreExt};
use crate::config::AuthConfig;
use crate::error::{Context, ServiceError};
use crate::identity::RequestIdentity;
use crate::models::Role;
use crate::queue::{EmailDispatcher, EmailTask};
use crate::repositories::{RestaurantRepository, UserRepository};
use crate::services::session::SessionService;

/// Passwordless sign-in through single-use links sent by email.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    cache: Arc<dyn CacheStore>,
    sessions: Arc<SessionService>,
    email: Arc<dyn EmailDispatcher>,
    api_base_url: String,
    redirect_url: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        cache: Arc<dyn CacheStore>,
        sessions: Arc<SessionService>,
        email: Arc<dyn EmailDispatcher>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            restaurants,
            cache,
            sessions,
            email,
            api_base_url: config.api_base_url.clone(),
            redirect_url: config.redirect_url.clone(),
        }
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    fn magic_link(&self, code: Uuid) -> String {
        format!(
            "{}/v1/auth/link?code={}&redirect={}",
            self.api_base_url, code, self.redirect_url
        )
    }

    /// Stores a fresh code for the user and queues the email carrying it.
    /// Succeeds once the code is stored, whatever happens to the email.
    #[instrument(skip(self, email))]
    pub async fn sign_in(&self, email: &str) -> Result<(), ServiceError> {
        let user = self
            .users
            .get_user_by_email(email)
            .await
            .context("get user by email")?
            .ok_or(ServiceError::UserNotFound)?;

        let code = Uuid::new_v4();
        self.cache
            .set_json(&magic_link_key(&code), &user.id, AuthConfig::MAGIC_LINK_TTL)
            .await
            .context("store magic link code")?;

        self.email.submit(EmailTask::sign_in_magic_link(
            &user.email,
            &user.full_name,
            &self.magic_link(code),
        ));

        info!(user_id = %user.id, "magic link issued");
        Ok(())
    }

    /// Consumes `code` and opens a session, returning its token.
    #[instrument(skip(self, code))]
    pub async fn verify_magic_link(&self, code: Uuid) -> Result<String, ServiceError> {
        let key = magic_link_key(&code);
        let user_id: Uuid = match self.cache.get_json(&key).await {
            Ok(user_id) => user_id,
            Err(CacheError::Miss) => return Err(ServiceError::MagicLinkNotFound),
            Err(err) => return Err(err).context("get magic link code"),
        };

        let user = self
            .users
            .get_user_by_id(user_id)
            .await
            .context("get user by ID")?
            .ok_or(ServiceError::UserNotFound)?;

        self.cache
            .delete(&key)
            .await
            .context("delete magic link code")?;

        let restaurant_id = match user.role {
            Role::Manager => self
                .restaurants
                .get_restaurant_id_by_user_id(user.id)
                .await
                .context("get restaurant ID by user ID")?,
            Role::Customer => None,
        };

        let session = self
            .sessions
            .create_session(user.id, restaurant_id, user.role)
            .await?;

        info!(user_id = %user.id, session_id = %session.id, "signed in");
        Ok(session.token)
    }

    #[instrument(skip(self, identity), fields(session_id = %identity.session_id))]
    pub async fn sign_out(&self, identity: &RequestIdentity) -> Result<(), ServiceError> {
        self.sessions.delete_session(identity.session_id).await
    }
}
