use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use food_shop_core::{Permission, RequestIdentity, ServiceError};
use tracing::debug;

use crate::error::ApiError;
use crate::handlers::AppState;

/// Reads the session token from the session cookie, falling back to a bearer
/// `Authorization` header.
pub fn session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value);

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}

/// Resolves the caller's session and makes it available as a
/// [`RequestIdentity`] extension.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(request.headers(), &state.config.cookie_name)
        .ok_or(ApiError::Unauthenticated)?
        .to_string();

    let session = match state.ctx.sessions.get_session_by_token(&token).await {
        Ok(session) => session,
        Err(ServiceError::SessionNotFound) => {
            debug!("rejected request with unknown session");
            return Err(ApiError::Unauthenticated);
        }
        Err(err) => return Err(err.into()),
    };

    request
        .extensions_mut()
        .insert(RequestIdentity::from(&session));
    Ok(next.run(request).await)
}

/// The caller resolved by [`authenticate`]. Handlers outside the
/// authenticated router get `UserNotFoundInContext`.
pub struct Identity(pub RequestIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .map(Identity)
            .ok_or_else(|| ServiceError::UserNotFoundInContext.into())
    }
}

pub fn require(identity: &RequestIdentity, permission: Permission) -> Result<(), ApiError> {
    if identity.role.has_permission(permission) {
        Ok(())
    } else {
        debug!(user_id = %identity.user_id, ?permission, "permission denied");
        Err(ApiError::Forbidden)
    }
}
