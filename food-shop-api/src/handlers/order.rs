use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use food_shop_core::{
    models::{OrderSummary, Page},
    services::OrderTransition,
    Permission,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{require, Identity};
use crate::models::*;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{order_id}/approve", patch(approve_order))
        .route("/orders/{order_id}/dispatch", patch(dispatch_order))
        .route("/orders/{order_id}/deliver", patch(deliver_order))
        .route("/orders/{order_id}/cancel", patch(cancel_order))
}

fn permission_for(transition: OrderTransition) -> Permission {
    match transition {
        OrderTransition::Approve => Permission::ApproveOrder,
        OrderTransition::Dispatch => Permission::DispatchOrder,
        OrderTransition::Deliver => Permission::DeliverOrder,
        OrderTransition::Cancel => Permission::CancelOrder,
    }
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn list_orders(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Page<OrderSummary>>, ApiError> {
    require(&identity, Permission::ListOrders)?;

    let (filter, pagination) = query.into_parts();
    let page = state
        .ctx
        .orders
        .list_orders(&identity, &filter, pagination)
        .await?;
    Ok(Json(page))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn approve_order(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require(&identity, permission_for(OrderTransition::Approve))?;
    state.ctx.orders.approve_order(&identity, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn dispatch_order(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require(&identity, permission_for(OrderTransition::Dispatch))?;
    state.ctx.orders.dispatch_order(&identity, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn deliver_order(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require(&identity, permission_for(OrderTransition::Deliver))?;
    state.ctx.orders.deliver_order(&identity, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn cancel_order(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require(&identity, permission_for(OrderTransition::Cancel))?;
    state.ctx.orders.cancel_order(&identity, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
