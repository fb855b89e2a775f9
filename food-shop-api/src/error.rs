use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use food_shop_core::ServiceError;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Permission denied")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Service(err) => service_status(err),
        }
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    use ServiceError::*;

    match err {
        UserNotFound | RestaurantNotFound | OrderNotFound | MagicLinkNotFound
        | SomeProductsNotFound | EvaluationNotFound => StatusCode::NOT_FOUND,
        OrderDoesNotBelongToRestaurant | EvaluationDoesNotBelongToRestaurant => {
            StatusCode::FORBIDDEN
        }
        OrderCannotBeApproved | OrderCannotBeDispatched | OrderCannotBeDelivered
        | OrderCannotBeCancelled | EmailAlreadyExists => StatusCode::CONFLICT,
        SessionNotFound | UserNotFoundInContext => StatusCode::UNAUTHORIZED,
        Repository { .. } | Cache { .. } | Token { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::Service(err) if err.is_internal() => {
                error!(error = %err, "request failed");
                "Something went wrong".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "title": status.canonical_reason().unwrap_or("Error"),
            "details": details,
        }));

        (status, body).into_response()
    }
}
