use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use food_shop_core::{
    models::{OrderDetails, Restaurant},
    Permission,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{require, Identity};
use crate::models::*;

use super::AppState;

pub fn public_router() -> Router<AppState> {
    Router::new().route("/restaurants", post(create_restaurant))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurants/{restaurant_id}/orders", post(create_order))
}

#[instrument(skip(state, payload))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<Restaurant>), ApiError> {
    let restaurant = state
        .ctx
        .restaurants
        .create_restaurant(payload.validate()?)
        .await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn create_order(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetails>), ApiError> {
    require(&identity, Permission::CreateOrder)?;
    payload.validate()?;

    let order = state
        .ctx
        .restaurants
        .create_order(&identity, restaurant_id, &payload.items)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
