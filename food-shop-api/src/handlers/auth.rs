use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::{instrument, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::models::*;

use super::AppState;

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/link", get(verify_magic_link))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/sign-out", post(sign_out))
}

fn session_cookie(config: &ApiConfig, token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        config.cookie_name,
        token,
        config.cookie_max_age.as_secs()
    )
}

fn expired_cookie(config: &ApiConfig) -> String {
    format!(
        "{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0",
        config.cookie_name
    )
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate()?;
    state.ctx.auth.sign_in(&payload.email).await?;

    Ok(Json(MessageResponse {
        message: "Magic link sent",
    }))
}

#[instrument(skip(state, query))]
pub async fn verify_magic_link(
    State(state): State<AppState>,
    Query(query): Query<MagicLinkQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if query.redirect != state.ctx.auth.redirect_url() {
        warn!(redirect = %query.redirect, "magic link with unexpected redirect");
        return Err(ApiError::BadRequest("redirect is not allowed".to_string()));
    }

    let token = state.ctx.auth.verify_magic_link(query.code).await?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, query.redirect),
            (header::SET_COOKIE, session_cookie(&state.config, &token)),
        ],
    ))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn sign_out(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<impl IntoResponse, ApiError> {
    state.ctx.auth.sign_out(&identity).await?;

    Ok((
        [(header::SET_COOKIE, expired_cookie(&state.config))],
        Json(MessageResponse {
            message: "Signed out",
        }),
    ))
}
