use std::collections::HashMap;

use async_trait::async_trait;
use diesel::{pg::Pg, prelude::*};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::{DbPool, OrderRepository, RepositoryError};
use crate::models::{Order, OrderFilter, OrderItem, OrderStatus, OrderSummary, Pagination};
use crate::schema::{order_items, orders, users};

pub struct PgOrderRepository {
    pool: DbPool,
}

impl PgOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(restaurant_id: Uuid, filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table
        .filter(orders::restaurant_id.eq(restaurant_id))
        .into_boxed();

    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status));
    }
    if let Some(name) = filter.customer_name.as_deref().filter(|n| !n.is_empty()) {
        let customers = users::table
            .filter(users::full_name.ilike(format!("%{name}%")))
            .select(users::id);
        query = query.filter(orders::customer_id.eq_any(customers));
    }

    query
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order_with_items(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<(), RepositoryError> {
        let items: Vec<OrderItem> = items
            .iter()
            .map(|item| OrderItem {
                order_id: order.id,
                ..item.clone()
            })
            .collect();

        let mut conn = self.pool.get().await?;
        conn.transaction::<_, RepositoryError, _>(|conn| {
            async move {
                diesel::insert_into(orders::table)
                    .values(order)
                    .execute(conn)
                    .await?;

                if !items.is_empty() {
                    diesel::insert_into(order_items::table)
                        .values(&items)
                        .execute(conn)
                        .await?;
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_order_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let order = orders::table
            .find(id)
            .select(Order::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(order)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        diesel::update(orders::table.find(id))
            .set(orders::status.eq(status))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn list_orders(
        &self,
        restaurant_id: Uuid,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> Result<(Vec<OrderSummary>, i64), RepositoryError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = filtered(restaurant_id, filter)
            .count()
            .get_result(&mut conn)
            .await?;

        let page: Vec<Order> = filtered(restaurant_id, filter)
            .select(Order::as_select())
            .order(orders::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset())
            .load(&mut conn)
            .await?;

        let customer_ids: Vec<Uuid> = page.iter().map(|o| o.customer_id).collect();
        let names: HashMap<Uuid, String> = users::table
            .filter(users::id.eq_any(customer_ids))
            .select((users::id, users::full_name))
            .load::<(Uuid, String)>(&mut conn)
            .await?
            .into_iter()
            .collect();

        let summaries = page
            .into_iter()
            .map(|order| OrderSummary {
                customer_name: names.get(&order.customer_id).cloned().unwrap_or_default(),
                order,
            })
            .collect();

        Ok((summaries, total))
    }
}
