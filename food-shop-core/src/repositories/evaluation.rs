use std::collections::HashMap;

use async_trait::async_trait;
use diesel::{pg::Pg, prelude::*};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::{DbPool, EvaluationRepository, RepositoryError};
use crate::models::{Evaluation, EvaluationFilter, EvaluationSummary, Pagination};
use crate::schema::{evaluations, users};

pub struct PgEvaluationRepository {
    pool: DbPool,
}

impl PgEvaluationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(
    restaurant_id: Uuid,
    filter: &EvaluationFilter,
) -> evaluations::BoxedQuery<'static, Pg> {
    let mut query = evaluations::table
        .filter(evaluations::restaurant_id.eq(restaurant_id))
        .into_boxed();

    if let Some(rating) = filter.rating {
        query = query.filter(evaluations::rating.eq(rating));
    }
    if let Some(name) = filter.customer_name.as_deref().filter(|n| !n.is_empty()) {
        let customers = users::table
            .filter(users::full_name.ilike(format!("%{name}%")))
            .select(users::id);
        query = query.filter(evaluations::customer_id.eq_any(customers));
    }

    query
}

#[async_trait]
impl EvaluationRepository for PgEvaluationRepository {
    async fn create_evaluation(&self, evaluation: &Evaluation) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        diesel::insert_into(evaluations::table)
            .values(evaluation)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_evaluation_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let evaluation = evaluations::table
            .find(id)
            .select(Evaluation::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(evaluation)
    }

    async fn update_answer(&self, id: Uuid, answer: &str) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        diesel::update(evaluations::table.find(id))
            .set(evaluations::answer.eq(Some(answer)))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn list_evaluations(
        &self,
        restaurant_id: Uuid,
        filter: &EvaluationFilter,
        pagination: Pagination,
    ) -> Result<(Vec<EvaluationSummary>, i64), RepositoryError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = filtered(restaurant_id, filter)
            .count()
            .get_result(&mut conn)
            .await?;

        let page: Vec<Evaluation> = filtered(restaurant_id, filter)
            .select(Evaluation::as_select())
            .order(evaluations::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset())
            .load(&mut conn)
            .await?;

        let customer_ids: Vec<Uuid> = page.iter().map(|e| e.customer_id).collect();
        let names: HashMap<Uuid, String> = users::table
            .filter(users::id.eq_any(customer_ids))
            .select((users::id, users::full_name))
            .load::<(Uuid, String)>(&mut conn)
            .await?
            .into_iter()
            .collect();

        let summaries = page
            .into_iter()
            .map(|evaluation| EvaluationSummary {
                customer_name: names
                    .get(&evaluation.customer_id)
                    .cloned()
                    .unwrap_or_default(),
                evaluation,
            })
            .collect();

        Ok((summaries, total))
    }
}
