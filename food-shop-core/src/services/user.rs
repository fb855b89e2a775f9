use std::{sync::Arc, time::Duration};

use tracing::{instrument, warn};

use crate::cache::{user_key, CacheError, CacheStore, CacheStoreExt};
use crate::config::AuthConfig;
use crate::error::{Context, ServiceError};
use crate::identity::RequestIdentity;
use crate::models::{Role, User, UserProfile};
use crate::repositories::{RepositoryError, RestaurantRepository, UserRepository};
use crate::services::auth::AuthService;

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    cache: Arc<dyn CacheStore>,
    auth: Arc<AuthService>,
    cache_ttl: Duration,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        cache: Arc<dyn CacheStore>,
        auth: Arc<AuthService>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            restaurants,
            cache,
            auth,
            cache_ttl: config.cache_ttl,
        }
    }

    /// Registers a customer and sends them a sign-in link.
    #[instrument(skip(self, payload))]
    pub async fn create_customer(&self, payload: NewCustomer) -> Result<User, ServiceError> {
        let existing = self
            .users
            .get_user_by_email(&payload.email)
            .await
            .context("get user by email")?;
        if existing.is_some() {
            return Err(ServiceError::EmailAlreadyExists);
        }

        let user = User::new(payload.full_name, payload.email, payload.phone, Role::Customer);
        match self.users.create_user(&user).await {
            Ok(()) => {}
            Err(RepositoryError::Conflict(_)) => return Err(ServiceError::EmailAlreadyExists),
            Err(err) => return Err(err).context("create user"),
        }

        self.auth.sign_in(&user.email).await?;
        Ok(user)
    }

    /// Cache-aside read of the acting user's profile.
    pub async fn get_profile(&self, identity: &RequestIdentity) -> Result<UserProfile, ServiceError> {
        let key = user_key(&identity.user_id);
        match self.cache.get_json::<UserProfile>(&key).await {
            Ok(profile) => return Ok(profile),
            Err(CacheError::Miss) => {}
            Err(err) => return Err(err).context("get cached user"),
        }

        let user = self
            .users
            .get_user_by_id(identity.user_id)
            .await
            .context("get user by ID")?
            .ok_or(ServiceError::UserNotFound)?;

        let restaurant_name = match (user.role, identity.restaurant_id) {
            (Role::Manager, Some(restaurant_id)) => self
                .restaurants
                .get_restaurant_by_id(restaurant_id)
                .await
                .context("get restaurant by ID")?
                .map(|r| r.name),
            _ => None,
        };

        let profile = UserProfile {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            restaurant_name,
        };

        if let Err(err) = self.cache.set_json(&key, &profile, self.cache_ttl).await {
            warn!(user_id = %profile.id, error = %err, "cannot cache user profile");
        }

        Ok(profile)
    }
}
