use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::cache::{session_key, user_sessions_key, CacheError, CacheStore, CacheStoreExt};
use crate::config::AuthConfig;
use crate::error::{Context, ServiceError};
use crate::models::{Role, Session};
use crate::services::token::TokenService;

/// Sessions live in the cache under `session:{id}`. Each user also has a set
/// `user_sessions:{user_id}` of their session IDs for listing and bulk revocation.
pub struct SessionService {
    tokens: Arc<TokenService>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(tokens: Arc<TokenService>, cache: Arc<dyn CacheStore>, config: &AuthConfig) -> Self {
        Self {
            tokens,
            cache,
            ttl: config.session_ttl,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_session(
        &self,
        user_id: Uuid,
        restaurant_id: Option<Uuid>,
        role: Role,
    ) -> Result<Session, ServiceError> {
        let id = Uuid::now_v7();
        let token = self
            .tokens
            .create_token(user_id, id, restaurant_id)
            .context("create token")?;

        let session = Session {
            id,
            user_id,
            restaurant_id,
            role,
            token,
            created_at: Utc::now(),
        };

        let key = session_key(&id);
        self.cache
            .set_json(&key, &session, self.ttl)
            .await
            .context("store session")?;

        if let Err(err) = self
            .cache
            .add_to_set(&user_sessions_key(&user_id), &id.to_string(), self.ttl)
            .await
        {
            if let Err(cleanup) = self.cache.delete(&key).await {
                warn!(session_id = %id, error = %cleanup, "cannot remove half-created session");
            }
            return Err(err).context("add session to user set");
        }

        Ok(session)
    }

    pub async fn get_session_by_token(&self, token: &str) -> Result<Session, ServiceError> {
        let session_id = self.tokens.extract_session_id(token).map_err(|err| {
            debug!(error = %err, "session token rejected");
            ServiceError::SessionNotFound
        })?;

        let session = self
            .find(session_id)
            .await?
            .ok_or(ServiceError::SessionNotFound)?;

        if session.token != token {
            return Err(ServiceError::SessionNotFound);
        }

        Ok(session)
    }

    /// Returns the user's live sessions and drops IDs whose record has expired.
    pub async fn get_sessions_by_user_id(&self, user_id: Uuid) -> Result<Vec<Session>, ServiceError> {
        let set_key = user_sessions_key(&user_id);
        let members = self
            .cache
            .get_set_members(&set_key)
            .await
            .context("get user sessions")?;

        let mut sessions = Vec::with_capacity(members.len());
        for member in members {
            let live = match Uuid::parse_str(&member) {
                Ok(id) => self.find(id).await?,
                Err(_) => None,
            };

            match live {
                Some(session) => sessions.push(session),
                None => self
                    .cache
                    .remove_from_set(&set_key, &member)
                    .await
                    .context("remove stale session ID")?,
            }
        }

        Ok(sessions)
    }

    #[instrument(skip(self))]
    pub async fn delete_session(&self, session_id: Uuid) -> Result<(), ServiceError> {
        let session = self
            .find(session_id)
            .await?
            .ok_or(ServiceError::SessionNotFound)?;

        self.cache
            .delete(&session_key(&session_id))
            .await
            .context("delete session")?;
        self.cache
            .remove_from_set(&user_sessions_key(&session.user_id), &session_id.to_string())
            .await
            .context("remove session from user set")?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_all_sessions(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let set_key = user_sessions_key(&user_id);
        let members = self
            .cache
            .get_set_members(&set_key)
            .await
            .context("get user sessions")?;

        if members.is_empty() {
            return Err(ServiceError::SessionNotFound);
        }

        for member in &members {
            let Ok(session_id) = Uuid::parse_str(member) else {
                warn!(%member, "skipping malformed session set member");
                continue;
            };
            if let Err(err) = self.cache.delete(&session_key(&session_id)).await {
                warn!(%session_id, error = %err, "cannot delete session, continuing");
            }
        }

        self.cache
            .delete(&set_key)
            .await
            .context("delete user session set")?;

        Ok(())
    }

    async fn find(&self, session_id: Uuid) -> Result<Option<Session>, ServiceError> {
        match self.cache.get_json::<Session>(&session_key(&session_id)).await {
            Ok(session) => Ok(Some(session)),
            Err(CacheError::Miss) => Ok(None),
            Err(err) => Err(err).context("get session"),
        }
    }
}
