use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Context, ServiceError};
use crate::identity::RequestIdentity;
use crate::models::{Evaluation, EvaluationFilter, EvaluationSummary, Page, Pagination};
use crate::repositories::{EvaluationRepository, RestaurantRepository};

pub struct EvaluationService {
    evaluations: Arc<dyn EvaluationRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
}

impl EvaluationService {
    pub fn new(
        evaluations: Arc<dyn EvaluationRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
    ) -> Self {
        Self {
            evaluations,
            restaurants,
        }
    }

    /// `rating` is expected in 1..=5.
    #[instrument(skip(self, identity, comment), fields(user_id = %identity.user_id))]
    pub async fn create_evaluation(
        &self,
        identity: &RequestIdentity,
        restaurant_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Evaluation, ServiceError> {
        self.restaurants
            .get_restaurant_by_id(restaurant_id)
            .await
            .context("get restaurant by ID")?
            .ok_or(ServiceError::RestaurantNotFound)?;

        let evaluation = Evaluation {
            id: Uuid::new_v4(),
            customer_id: identity.user_id,
            restaurant_id,
            rating,
            comment,
            answer: None,
            created_at: Utc::now(),
        };
        self.evaluations
            .create_evaluation(&evaluation)
            .await
            .context("create evaluation")?;

        Ok(evaluation)
    }

    #[instrument(skip(self, identity, answer))]
    pub async fn answer_evaluation(
        &self,
        identity: &RequestIdentity,
        evaluation_id: Uuid,
        answer: &str,
    ) -> Result<(), ServiceError> {
        let restaurant_id = identity.restaurant_id()?;

        let evaluation = self
            .evaluations
            .get_evaluation_by_id(evaluation_id)
            .await
            .context("get evaluation by ID")?
            .ok_or(ServiceError::EvaluationNotFound)?;

        if evaluation.restaurant_id != restaurant_id {
            return Err(ServiceError::EvaluationDoesNotBelongToRestaurant);
        }

        self.evaluations
            .update_answer(evaluation.id, answer)
            .await
            .context("update evaluation answer")
    }

    pub async fn list_evaluations(
        &self,
        identity: &RequestIdentity,
        filter: &EvaluationFilter,
        pagination: Pagination,
    ) -> Result<Page<EvaluationSummary>, ServiceError> {
        let restaurant_id = identity.restaurant_id()?;

        let (items, total) = self
            .evaluations
            .list_evaluations(restaurant_id, filter, pagination)
            .await
            .context("list evaluations")?;

        Ok(Page {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
        })
    }
}
