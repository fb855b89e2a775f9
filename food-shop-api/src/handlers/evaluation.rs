use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use food_shop_core::{
    models::{Evaluation, EvaluationSummary, Page},
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
        .route(
            "/evaluations",
            get(list_evaluations).post(create_evaluation),
        )
        .route("/evaluations/{evaluation_id}/answer", patch(answer_evaluation))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn list_evaluations(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Query(query): Query<ListEvaluationsQuery>,
) -> Result<Json<Page<EvaluationSummary>>, ApiError> {
    require(&identity, Permission::ListEvaluations)?;

    let (filter, pagination) = query.into_parts();
    let page = state
        .ctx
        .evaluations
        .list_evaluations(&identity, &filter, pagination)
        .await?;
    Ok(Json(page))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn create_evaluation(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Json(payload): Json<CreateEvaluationRequest>,
) -> Result<(StatusCode, Json<Evaluation>), ApiError> {
    require(&identity, Permission::CreateEvaluation)?;
    payload.validate()?;

    let evaluation = state
        .ctx
        .evaluations
        .create_evaluation(
            &identity,
            payload.restaurant_id,
            payload.rating,
            payload.comment,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn answer_evaluation(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(evaluation_id): Path<Uuid>,
    Json(payload): Json<AnswerEvaluationRequest>,
) -> Result<StatusCode, ApiError> {
    require(&identity, Permission::AnswerEvaluation)?;
    payload.validate()?;

    state
        .ctx
        .evaluations
        .answer_evaluation(&identity, evaluation_id, &payload.answer)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
