use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid key material: {0}")]
    Key(#[source] jsonwebtoken::errors::Error),
    #[error("cannot sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("token carries no session ID")]
    MissingSessionId,
    #[error("token carries a malformed session ID")]
    MalformedSessionId,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rid: Option<String>,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies ES256 session tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Result<Self, TokenError> {
        Self::from_pem(
            &config.private_key_pem,
            &config.public_key_pem,
            &config.token_issuer,
            config.session_ttl,
        )
    }

    pub fn from_pem(
        private_key_pem: &[u8],
        public_key_pem: &[u8],
        issuer: &str,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_ec_pem(private_key_pem).map_err(TokenError::Key)?;
        let decoding_key = DecodingKey::from_ec_pem(public_key_pem).map_err(TokenError::Key)?;

        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: issuer.to_string(),
            ttl,
        })
    }

    pub fn create_token(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        restaurant_id: Option<Uuid>,
    ) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            sid: Some(session_id.to_string()),
            rid: restaurant_id.map(|id| id.to_string()),
            iss: self.issuer.clone(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::ES256), &claims, &self.encoding_key).map_err(TokenError::Sign)
    }

    pub fn extract_session_id(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Invalid)?;

        let sid = data.claims.sid.ok_or(TokenError::MissingSessionId)?;
        Uuid::parse_str(&sid).map_err(|_| TokenError::MalformedSessionId)
    }
}
