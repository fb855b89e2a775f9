use std::io::Write;

use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{evaluations, order_items, orders, products, restaurants, users};

#[derive(FromSqlRow, AsExpression, Serialize, Deserialize, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::OrderStatus)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Delivering,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];
}

impl ToSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            OrderStatus::Pending => out.write_all(b"pending")?,
            OrderStatus::Processing => out.write_all(b"processing")?,
            OrderStatus::Delivering => out.write_all(b"delivering")?,
            OrderStatus::Delivered => out.write_all(b"delivered")?,
            OrderStatus::Canceled => out.write_all(b"canceled")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"pending" => Ok(OrderStatus::Pending),
            b"processing" => Ok(OrderStatus::Processing),
            b"delivering" => Ok(OrderStatus::Delivering),
            b"delivered" => Ok(OrderStatus::Delivered),
            b"canceled" => Ok(OrderStatus::Canceled),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, Serialize, Deserialize, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::UserRole)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Customer,
}

impl ToSql<crate::schema::sql_types::UserRole, Pg> for Role {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            Role::Manager => out.write_all(b"manager")?,
            Role::Customer => out.write_all(b"customer")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::UserRole, Pg> for Role {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"manager" => Ok(Role::Manager),
            b"customer" => Ok(Role::Customer),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, Serialize, Deserialize, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::UserStatus)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
}

impl ToSql<crate::schema::sql_types::UserStatus, Pg> for UserStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            UserStatus::Active => out.write_all(b"active")?,
            UserStatus::Blocked => out.write_all(b"blocked")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::UserStatus, Pg> for UserStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"active" => Ok(UserStatus::Active),
            b"blocked" => Ok(UserStatus::Blocked),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(full_name: String, email: String, phone: Option<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name,
            email,
            phone,
            role,
            status: UserStatus::Active,
            created_at: Utc::now(),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Serialize, Clone, Debug, PartialEq)]
#[diesel(belongs_to(User, foreign_key = manager_id))]
#[diesel(table_name = restaurants)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = products)]
pub struct Product {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_in_cents: i32,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub status: OrderStatus,
    pub total_in_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: Uuid, restaurant_id: Uuid, total_in_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            restaurant_id,
            status: OrderStatus::Pending,
            total_in_cents,
            created_at: Utc::now(),
        }
    }
}

/// A priced line of an order. `price_in_cents` is the unit price captured when
/// the order was placed and is never recomputed.
#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Serialize, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_items)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_in_cents: i32,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// The order ID stays nil until the item is persisted with its order.
    pub fn new(product_id: Uuid, quantity: i32, price_in_cents: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            product_id,
            quantity,
            price_in_cents,
            created_at: Utc::now(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, PartialEq)]
pub struct OrderItemSummary {
    pub items: Vec<OrderItem>,
    pub total_in_cents: i64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = evaluations)]
pub struct Evaluation {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Server-side record of an authenticated actor. Lives only in the cache store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub role: Role,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Cached view of a user served by the profile endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub restaurant_name: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(10).clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Saturates instead of overflowing; a page past the end is simply empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_name: Option<String>,
}

/// New values for an existing product. `description: None` clears it.
#[derive(AsChangeset, Clone, Debug, PartialEq)]
#[diesel(table_name = products, treat_none_as_null = true)]
pub struct ProductUpdate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_in_cents: i32,
}

/// Product changes for one restaurant, applied all or nothing.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MenuChanges {
    pub created: Vec<Product>,
    pub updated: Vec<ProductUpdate>,
    pub deleted: Vec<Uuid>,
}

impl MenuChanges {
    /// IDs of existing products the changes touch, sorted and deduplicated.
    pub fn referenced_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .updated
            .iter()
            .map(|p| p.id)
            .chain(self.deleted.iter().copied())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[derive(Queryable, Serialize, Clone, Debug, PartialEq)]
pub struct PopularProduct {
    pub name: String,
    pub order_count: i64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EvaluationSummary {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub customer_name: String,
}

#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
pub struct EvaluationFilter {
    pub rating: Option<i32>,
    pub customer_name: Option<String>,
}
