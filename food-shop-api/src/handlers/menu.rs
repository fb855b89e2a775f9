use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use food_shop_core::{models::PopularProduct, Permission};
use tracing::instrument;

use crate::error::ApiError;
use crate::middleware::{require, Identity};
use crate::models::*;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menus", put(update_menu))
        .route("/products/popular", get(get_popular_products))
}

#[instrument(skip(state, identity, payload), fields(user_id = %identity.user_id))]
pub async fn update_menu(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Json(payload): Json<UpdateMenuRequest>,
) -> Result<StatusCode, ApiError> {
    require(&identity, Permission::UpdateMenu)?;

    state
        .ctx
        .menus
        .update_menu(&identity, payload.validate()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn get_popular_products(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<Json<Vec<PopularProduct>>, ApiError> {
    require(&identity, Permission::GetPopularProducts)?;

    let popular = state.ctx.menus.get_popular_products(&identity).await?;
    Ok(Json(popular))
}
