use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use food_shop_core::models::{User, UserProfile};
use tracing::instrument;

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::models::*;

use super::AppState;

pub fn public_router() -> Router<AppState> {
    Router::new().route("/users", post(create_customer))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users/me", get(get_profile))
}

#[instrument(skip(state, payload))]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.ctx.users.create_customer(payload.validate()?).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state.ctx.users.get_profile(&identity).await?;
    Ok(Json(profile))
}
