pub mod auth;
pub mod evaluation;
pub mod menu;
pub mod order;
pub mod restaurant;
pub mod user;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};
use food_shop_core::AppContext;

use crate::config::ApiConfig;
use crate::middleware::authenticate;

#[derive(Clone)]
pub struct AppState {
    pub ctx: AppContext,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(ctx: AppContext, config: ApiConfig) -> Self {
        Self {
            ctx,
            config: Arc::new(config),
        }
    }
}

/// Every `/v1` route. Routes in the protected half can extract an `Identity`.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .merge(auth::public_router())
        .merge(user::public_router())
        .merge(restaurant::public_router());

    let protected = Router::new()
        .merge(auth::router())
        .merge(user::router())
        .merge(restaurant::router())
        .merge(order::router())
        .merge(evaluation::router())
        .merge(menu::router())
        .route_layer(from_fn_with_state(state, authenticate));

    public.merge(protected)
}
