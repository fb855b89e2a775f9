use std::fmt;

use food_shop_core::{
    models::{EvaluationFilter, OrderFilter, OrderItemRequest, OrderStatus, Pagination},
    services::{MenuUpdate, NewCustomer, NewRestaurant, ProductInput},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct MagicLinkQuery {
    pub code: Uuid,
    pub redirect: String,
}

// The code is a bearer credential until it is consumed.
impl fmt::Debug for MagicLinkQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagicLinkQuery")
            .field("code", &"<redacted>")
            .field("redirect", &self.redirect)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRestaurantRequest {
    pub restaurant_name: String,
    pub description: Option<String>,
    pub manager_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<OrderStatus>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEvaluationRequest {
    pub restaurant_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerEvaluationRequest {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct ListEvaluationsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub rating: Option<i32>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price_in_cents: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuRequest {
    #[serde(default)]
    pub products: Vec<ProductRequest>,
    #[serde(default)]
    pub deleted_product_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn email(value: &str) -> Result<(), ApiError> {
    if !value.contains('@') {
        return Err(ApiError::Validation("email is not valid".to_string()));
    }
    Ok(())
}

impl SignInRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        email(&self.email)
    }
}

impl CreateCustomerRequest {
    pub fn validate(self) -> Result<NewCustomer, ApiError> {
        required("full_name", &self.full_name)?;
        email(&self.email)?;
        Ok(NewCustomer {
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
        })
    }
}

impl CreateRestaurantRequest {
    pub fn validate(self) -> Result<NewRestaurant, ApiError> {
        required("restaurant_name", &self.restaurant_name)?;
        required("manager_name", &self.manager_name)?;
        email(&self.email)?;
        Ok(NewRestaurant {
            restaurant_name: self.restaurant_name,
            description: self.description,
            manager_name: self.manager_name,
            email: self.email,
            phone: self.phone,
        })
    }
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(item) = self.items.iter().find(|item| item.quantity < 1) {
            return Err(ApiError::Validation(format!(
                "quantity of product {} must be at least 1",
                item.product_id
            )));
        }
        Ok(())
    }
}

impl ListOrdersQuery {
    pub fn into_parts(self) -> (OrderFilter, Pagination) {
        let customer_name = self.customer_name.filter(|name| !name.trim().is_empty());
        (
            OrderFilter {
                status: self.status,
                customer_name,
            },
            Pagination::new(self.page, self.limit),
        )
    }
}

impl ListEvaluationsQuery {
    pub fn into_parts(self) -> (EvaluationFilter, Pagination) {
        let customer_name = self.customer_name.filter(|name| !name.trim().is_empty());
        (
            EvaluationFilter {
                rating: self.rating,
                customer_name,
            },
            Pagination::new(self.page, self.limit),
        )
    }
}

impl UpdateMenuRequest {
    pub fn validate(self) -> Result<MenuUpdate, ApiError> {
        for product in &self.products {
            required("name", &product.name)?;
            if product.price_in_cents < 0 {
                return Err(ApiError::Validation(format!(
                    "price of {} must not be negative",
                    product.name
                )));
            }
        }
        if let Some(id) = self
            .products
            .iter()
            .filter_map(|p| p.id)
            .find(|id| self.deleted_product_ids.contains(id))
        {
            return Err(ApiError::Validation(format!(
                "product {id} cannot be updated and deleted at once"
            )));
        }

        Ok(MenuUpdate {
            products: self
                .products
                .into_iter()
                .map(|p| ProductInput {
                    id: p.id,
                    name: p.name,
                    description: p.description,
                    price_in_cents: p.price_in_cents,
                })
                .collect(),
            deleted_product_ids: self.deleted_product_ids,
        })
    }
}

impl CreateEvaluationRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ApiError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        Ok(())
    }
}

impl AnswerEvaluationRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        required("answer", &self.answer)
    }
}
