use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Context, ServiceError};
use crate::identity::RequestIdentity;
use crate::models::{OrderDetails, OrderItemRequest, Restaurant, Role, User};
use crate::repositories::{RepositoryError, RestaurantRepository, UserRepository};
use crate::services::auth::AuthService;
use crate::services::order::OrderService;

#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub restaurant_name: String,
    pub description: Option<String>,
    pub manager_name: String,
    pub email: String,
    pub phone: Option<String>,
}

pub struct RestaurantService {
    users: Arc<dyn UserRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    orders: Arc<OrderService>,
    auth: Arc<AuthService>,
}

impl RestaurantService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        orders: Arc<OrderService>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            users,
            restaurants,
            orders,
            auth,
        }
    }

    /// Registers a restaurant together with its manager, then mails the
    /// manager a sign-in link.
    #[instrument(skip(self, payload))]
    pub async fn create_restaurant(&self, payload: NewRestaurant) -> Result<Restaurant, ServiceError> {
        let existing = self
            .users
            .get_user_by_email(&payload.email)
            .await
            .context("get user by email")?;
        if existing.is_some() {
            return Err(ServiceError::EmailAlreadyExists);
        }

        let manager = User::new(
            payload.manager_name,
            payload.email,
            payload.phone,
            Role::Manager,
        );
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            name: payload.restaurant_name,
            description: payload.description,
            manager_id: manager.id,
            created_at: Utc::now(),
        };

        match self
            .restaurants
            .create_restaurant_with_manager(&manager, &restaurant)
            .await
        {
            Ok(()) => {}
            Err(RepositoryError::Conflict(_)) => return Err(ServiceError::EmailAlreadyExists),
            Err(err) => return Err(err).context("create restaurant with manager"),
        }

        info!(restaurant_id = %restaurant.id, manager_id = %manager.id, "restaurant registered");

        self.auth.sign_in(&manager.email).await?;
        Ok(restaurant)
    }

    /// Places an order at `restaurant_id` on behalf of the acting customer.
    pub async fn create_order(
        &self,
        identity: &RequestIdentity,
        restaurant_id: Uuid,
        items: &[OrderItemRequest],
    ) -> Result<OrderDetails, ServiceError> {
        self.orders
            .create_order(identity.user_id, restaurant_id, items)
            .await
    }
}
