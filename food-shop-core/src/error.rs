use thiserror::Error;

use crate::cache::CacheError;
use crate::repositories::RepositoryError;
use crate::services::token::TokenError;

/// Errors returned by the service layer.
///
/// Unit variants are business outcomes callers match on. The struct variants
/// wrap technical failures together with the operation that produced them.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("restaurant not found")]
    RestaurantNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("magic link not found")]
    MagicLinkNotFound,
    #[error("session not found")]
    SessionNotFound,
    #[error("some products not found")]
    SomeProductsNotFound,
    #[error("evaluation not found")]
    EvaluationNotFound,

    #[error("order does not belong to restaurant")]
    OrderDoesNotBelongToRestaurant,
    #[error("evaluation does not belong to restaurant")]
    EvaluationDoesNotBelongToRestaurant,
    #[error("user not found in context")]
    UserNotFoundInContext,

    #[error("order cannot be approved")]
    OrderCannotBeApproved,
    #[error("order cannot be dispatched")]
    OrderCannotBeDispatched,
    #[error("order cannot be delivered")]
    OrderCannotBeDelivered,
    #[error("order cannot be cancelled")]
    OrderCannotBeCancelled,

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("{context}: {source}")]
    Repository {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
    #[error("{context}: {source}")]
    Cache {
        context: &'static str,
        #[source]
        source: CacheError,
    },
    #[error("{context}: {source}")]
    Token {
        context: &'static str,
        #[source]
        source: TokenError,
    },
}

impl ServiceError {
    /// True for technical failures, false for business outcomes.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ServiceError::Repository { .. } | ServiceError::Cache { .. } | ServiceError::Token { .. }
        )
    }
}

/// Attaches an operation name to a technical error.
pub trait Context<T> {
    fn context(self, context: &'static str) -> Result<T, ServiceError>;
}

impl<T> Context<T> for Result<T, RepositoryError> {
    fn context(self, context: &'static str) -> Result<T, ServiceError> {
        self.map_err(|source| ServiceError::Repository { context, source })
    }
}

impl<T> Context<T> for Result<T, CacheError> {
    fn context(self, context: &'static str) -> Result<T, ServiceError> {
        self.map_err(|source| ServiceError::Cache { context, source })
    }
}

impl<T> Context<T> for Result<T, TokenError> {
    fn context(self, context: &'static str) -> Result<T, ServiceError> {
        self.map_err(|source| ServiceError::Token { context, source })
    }
}
