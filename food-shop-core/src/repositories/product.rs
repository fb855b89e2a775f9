use async_trait::async_trait;
use chrono::Utc;
use diesel::{dsl::count, prelude::*};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::{DbPool, ProductRepository, RepositoryError};
use crate::models::{MenuChanges, PopularProduct, Product};
use crate::schema::{order_items, orders, products};

pub struct PgProductRepository {
    pool: DbPool,
}

impl PgProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_products_by_ids_and_restaurant_id(
        &self,
        ids: &[Uuid],
        restaurant_id: Uuid,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let products = products::table
            .filter(products::id.eq_any(ids.to_vec()))
            .filter(products::restaurant_id.eq(restaurant_id))
            .filter(products::deleted_at.is_null())
            .select(Product::as_select())
            .load(&mut conn)
            .await?;
        Ok(products)
    }

    async fn update_menu(
        &self,
        restaurant_id: Uuid,
        changes: &MenuChanges,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<_, RepositoryError, _>(|conn| {
            async move {
                for update in &changes.updated {
                    diesel::update(
                        products::table
                            .filter(products::id.eq(update.id))
                            .filter(products::restaurant_id.eq(restaurant_id))
                            .filter(products::deleted_at.is_null()),
                    )
                    .set(update)
                    .execute(conn)
                    .await?;
                }

                if !changes.deleted.is_empty() {
                    diesel::update(
                        products::table
                            .filter(products::id.eq_any(changes.deleted.clone()))
                            .filter(products::restaurant_id.eq(restaurant_id))
                            .filter(products::deleted_at.is_null()),
                    )
                    .set(products::deleted_at.eq(Some(Utc::now())))
                    .execute(conn)
                    .await?;
                }

                if !changes.created.is_empty() {
                    diesel::insert_into(products::table)
                        .values(&changes.created)
                        .execute(conn)
                        .await?;
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_popular_products(
        &self,
        restaurant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PopularProduct>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let popular = order_items::table
            .inner_join(orders::table)
            .inner_join(products::table)
            .filter(orders::restaurant_id.eq(restaurant_id))
            .group_by((products::id, products::name))
            .select((products::name, count(order_items::id)))
            .order_by(count(order_items::id).desc())
            .then_order_by(products::name)
            .limit(limit)
            .load::<PopularProduct>(&mut conn)
            .await?;
        Ok(popular)
    }
}
