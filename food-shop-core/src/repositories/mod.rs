use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{pooled_connection::deadpool::PoolError, AsyncPgConnection};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Evaluation, EvaluationFilter, EvaluationSummary, MenuChanges, Order, OrderFilter, OrderItem,
    OrderStatus, OrderSummary, Pagination, PopularProduct, Product, Restaurant, User,
};

mod evaluation;
mod order;
mod product;
mod restaurant;
mod user;

pub use evaluation::PgEvaluationRepository;
pub use order::PgOrderRepository;
pub use product::PgProductRepository;
pub use restaurant::PgRestaurantRepository;
pub use user::PgUserRepository;

pub type DbPool = diesel_async::pooled_connection::deadpool::Pool<AsyncPgConnection>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("database: {0}")]
    Database(DieselError),
    #[error("connection pool: {0}")]
    Pool(#[from] PoolError),
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::Conflict(info.message().to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order and every item in one transaction. Item order IDs
    /// are overwritten with `order.id`.
    async fn create_order_with_items(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<(), RepositoryError>;

    async fn get_order_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), RepositoryError>;

    /// Returns one page of orders, newest first, plus the total match count.
    async fn list_orders(
        &self,
        restaurant_id: Uuid,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> Result<(Vec<OrderSummary>, i64), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Only live products of `restaurant_id` are returned.
    async fn get_products_by_ids_and_restaurant_id(
        &self,
        ids: &[Uuid],
        restaurant_id: Uuid,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Applies every change in one transaction. Updates and deletes only
    /// touch live products of `restaurant_id`; deletes are soft.
    async fn update_menu(
        &self,
        restaurant_id: Uuid,
        changes: &MenuChanges,
    ) -> Result<(), RepositoryError>;

    /// Products of `restaurant_id` ranked by how many order lines name them.
    async fn get_popular_products(
        &self,
        restaurant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PopularProduct>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn create_restaurant_with_manager(
        &self,
        manager: &User,
        restaurant: &Restaurant,
    ) -> Result<(), RepositoryError>;

    async fn get_restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, RepositoryError>;

    async fn get_restaurant_id_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    async fn create_evaluation(&self, evaluation: &Evaluation) -> Result<(), RepositoryError>;

    async fn get_evaluation_by_id(&self, id: Uuid)
        -> Result<Option<Evaluation>, RepositoryError>;

    async fn update_answer(&self, id: Uuid, answer: &str) -> Result<(), RepositoryError>;

    /// Returns one page of evaluations, newest first, plus the total match count.
    async fn list_evaluations(
        &self,
        restaurant_id: Uuid,
        filter: &EvaluationFilter,
        pagination: Pagination,
    ) -> Result<(Vec<EvaluationSummary>, i64), RepositoryError>;
}
