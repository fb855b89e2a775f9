use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::{DbPool, RepositoryError, RestaurantRepository};
use crate::models::{Restaurant, User};
use crate::schema::{restaurants, users};

pub struct PgRestaurantRepository {
    pool: DbPool,
}

impl PgRestaurantRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestaurantRepository for PgRestaurantRepository {
    async fn create_restaurant_with_manager(
        &self,
        manager: &User,
        restaurant: &Restaurant,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<_, RepositoryError, _>(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(manager)
                    .execute(conn)
                    .await?;
                diesel::insert_into(restaurants::table)
                    .values(restaurant)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let restaurant = restaurants::table
            .find(id)
            .select(Restaurant::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(restaurant)
    }

    async fn get_restaurant_id_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let id = restaurants::table
            .filter(restaurants::manager_id.eq(user_id))
            .select(restaurants::id)
            .first(&mut conn)
            .await
            .optional()?;
        Ok(id)
    }
}
