use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use diesel::result::Error as DieselError;
use uuid::Uuid;

use crate::models::{
    Evaluation, EvaluationFilter, EvaluationSummary, MenuChanges, Order, OrderFilter, OrderItem,
    OrderStatus, OrderSummary, Pagination, PopularProduct, Product, Restaurant, Role, User,
};
use crate::repositories::{
    EvaluationRepository, OrderRepository, ProductRepository, RepositoryError,
    RestaurantRepository, UserRepository,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    restaurants: HashMap<Uuid, Restaurant>,
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
    order_items: Vec<OrderItem>,
    evaluations: HashMap<Uuid, Evaluation>,
}

/// Repository fake with transactional inserts and injectable insert failures.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    inserts: AtomicUsize,
    fail_at: Mutex<Option<usize>>,
}

impl MemoryStore {
    /// Makes the `nth` row insert from now on fail (1-based).
    pub fn fail_on_insert(&self, nth: usize) {
        let next = self.inserts.load(Ordering::SeqCst);
        *self.fail_at.lock().unwrap() = Some(next + nth);
    }

    fn insert_row(&self) -> Result<(), RepositoryError> {
        let n = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_at.lock().unwrap() == Some(n) {
            return Err(RepositoryError::Database(DieselError::RollbackTransaction));
        }
        Ok(())
    }

    pub fn add_user(&self, full_name: &str, email: &str, role: Role) -> User {
        let user = User::new(full_name.to_string(), email.to_string(), None, role);
        self.state.lock().unwrap().users.insert(user.id, user.clone());
        user
    }

    pub fn add_restaurant(&self, name: &str, manager_id: Uuid) -> Restaurant {
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            manager_id,
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .restaurants
            .insert(restaurant.id, restaurant.clone());
        restaurant
    }

    pub fn add_product(&self, restaurant_id: Uuid, name: &str, price_in_cents: i32) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            restaurant_id,
            name: name.to_string(),
            description: None,
            price_in_cents,
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.state
            .lock()
            .unwrap()
            .products
            .insert(product.id, product.clone());
        product
    }

    pub fn delete_product(&self, id: Uuid) {
        if let Some(p) = self.state.lock().unwrap().products.get_mut(&id) {
            p.deleted_at = Some(Utc::now());
        }
    }

    pub fn product(&self, id: Uuid) -> Option<Product> {
        self.state.lock().unwrap().products.get(&id).cloned()
    }

    /// Live products of a restaurant, sorted by name.
    pub fn menu_of(&self, restaurant_id: Uuid) -> Vec<Product> {
        let state = self.state.lock().unwrap();
        let mut menu: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.restaurant_id == restaurant_id && p.deleted_at.is_none())
            .cloned()
            .collect();
        menu.sort_by(|a, b| a.name.cmp(&b.name));
        menu
    }

    pub fn add_order_item(&self, order_id: Uuid, product: &Product, quantity: i32) {
        let item = OrderItem {
            order_id,
            ..OrderItem::new(product.id, quantity, product.price_in_cents)
        };
        self.state.lock().unwrap().order_items.push(item);
    }

    pub fn add_order(&self, customer_id: Uuid, restaurant_id: Uuid, status: OrderStatus) -> Order {
        let order = Order {
            status,
            ..Order::new(customer_id, restaurant_id, 0)
        };
        self.state
            .lock()
            .unwrap()
            .orders
            .insert(order.id, order.clone());
        order
    }

    pub fn add_evaluation(&self, customer_id: Uuid, restaurant_id: Uuid) -> Evaluation {
        self.add_rated_evaluation(customer_id, restaurant_id, 4)
    }

    pub fn add_rated_evaluation(
        &self,
        customer_id: Uuid,
        restaurant_id: Uuid,
        rating: i32,
    ) -> Evaluation {
        let evaluation = Evaluation {
            id: Uuid::new_v4(),
            customer_id,
            restaurant_id,
            rating,
            comment: "good".to_string(),
            answer: None,
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .evaluations
            .insert(evaluation.id, evaluation.clone());
        evaluation
    }

    pub fn order(&self, id: Uuid) -> Option<Order> {
        self.state.lock().unwrap().orders.get(&id).cloned()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().unwrap().orders.values().cloned().collect()
    }

    pub fn items_of(&self, order_id: Uuid) -> Vec<OrderItem> {
        let state = self.state.lock().unwrap();
        state
            .order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().unwrap().order_items.len()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let state = self.state.lock().unwrap();
        state.users.values().find(|u| u.email == email).cloned()
    }

    pub fn restaurant_managed_by(&self, manager_id: Uuid) -> Option<Restaurant> {
        let state = self.state.lock().unwrap();
        state
            .restaurants
            .values()
            .find(|r| r.manager_id == manager_id)
            .cloned()
    }

    pub fn evaluation(&self, id: Uuid) -> Option<Evaluation> {
        self.state.lock().unwrap().evaluations.get(&id).cloned()
    }

    pub fn evaluations(&self) -> Vec<Evaluation> {
        let state = self.state.lock().unwrap();
        state.evaluations.values().cloned().collect()
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order_with_items(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<(), RepositoryError> {
        self.insert_row()?;
        let mut staged = Vec::with_capacity(items.len());
        for item in items {
            self.insert_row()?;
            staged.push(OrderItem {
                order_id: order.id,
                ..item.clone()
            });
        }

        let mut state = self.state.lock().unwrap();
        state.orders.insert(order.id, order.clone());
        state.order_items.extend(staged);
        Ok(())
    }

    async fn get_order_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        Ok(self.order(id))
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), RepositoryError> {
        if let Some(order) = self.state.lock().unwrap().orders.get_mut(&id) {
            order.status = status;
        }
        Ok(())
    }

    async fn list_orders(
        &self,
        restaurant_id: Uuid,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> Result<(Vec<OrderSummary>, i64), RepositoryError> {
        let state = self.state.lock().unwrap();
        let name_of = |id: &Uuid| {
            state
                .users
                .get(id)
                .map(|u| u.full_name.clone())
                .unwrap_or_default()
        };

        let mut matching: Vec<OrderSummary> = state
            .orders
            .values()
            .filter(|o| o.restaurant_id == restaurant_id)
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .map(|o| OrderSummary {
                order: o.clone(),
                customer_name: name_of(&o.customer_id),
            })
            .filter(|s| {
                filter.customer_name.as_deref().map_or(true, |needle| {
                    s.customer_name
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
                })
            })
            .collect();
        matching.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn get_products_by_ids_and_restaurant_id(
        &self,
        ids: &[Uuid],
        restaurant_id: Uuid,
    ) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id))
            .filter(|p| p.restaurant_id == restaurant_id && p.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn update_menu(
        &self,
        restaurant_id: Uuid,
        changes: &MenuChanges,
    ) -> Result<(), RepositoryError> {
        for _ in &changes.created {
            self.insert_row()?;
        }

        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        for product in state.products.values_mut() {
            if product.restaurant_id != restaurant_id || product.deleted_at.is_some() {
                continue;
            }
            if let Some(update) = changes.updated.iter().find(|u| u.id == product.id) {
                product.name = update.name.clone();
                product.description = update.description.clone();
                product.price_in_cents = update.price_in_cents;
            }
            if changes.deleted.contains(&product.id) {
                product.deleted_at = Some(now);
            }
        }
        for product in &changes.created {
            state.products.insert(product.id, product.clone());
        }
        Ok(())
    }

    async fn get_popular_products(
        &self,
        restaurant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PopularProduct>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for item in &state.order_items {
            let in_restaurant = state
                .orders
                .get(&item.order_id)
                .is_some_and(|o| o.restaurant_id == restaurant_id);
            if in_restaurant {
                *counts.entry(item.product_id).or_default() += 1;
            }
        }

        let mut popular: Vec<PopularProduct> = counts
            .into_iter()
            .filter_map(|(id, order_count)| {
                state.products.get(&id).map(|p| PopularProduct {
                    name: p.name.clone(),
                    order_count,
                })
            })
            .collect();
        popular.sort_by(|a, b| b.order_count.cmp(&a.order_count).then(a.name.cmp(&b.name)));
        popular.truncate(limit.max(0) as usize);
        Ok(popular)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
        self.insert_row()?;
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("users_email_key".to_string()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.user_by_email(email))
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }
}

#[async_trait]
impl RestaurantRepository for MemoryStore {
    async fn create_restaurant_with_manager(
        &self,
        manager: &User,
        restaurant: &Restaurant,
    ) -> Result<(), RepositoryError> {
        self.insert_row()?;
        self.insert_row()?;

        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.email == manager.email) {
            return Err(RepositoryError::Conflict("users_email_key".to_string()));
        }
        state.users.insert(manager.id, manager.clone());
        state.restaurants.insert(restaurant.id, restaurant.clone());
        Ok(())
    }

    async fn get_restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, RepositoryError> {
        Ok(self.state.lock().unwrap().restaurants.get(&id).cloned())
    }

    async fn get_restaurant_id_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, RepositoryError> {
        Ok(self.restaurant_managed_by(user_id).map(|r| r.id))
    }
}

#[async_trait]
impl EvaluationRepository for MemoryStore {
    async fn create_evaluation(&self, evaluation: &Evaluation) -> Result<(), RepositoryError> {
        self.insert_row()?;
        self.state
            .lock()
            .unwrap()
            .evaluations
            .insert(evaluation.id, evaluation.clone());
        Ok(())
    }

    async fn get_evaluation_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        Ok(self.evaluation(id))
    }

    async fn update_answer(&self, id: Uuid, answer: &str) -> Result<(), RepositoryError> {
        if let Some(e) = self.state.lock().unwrap().evaluations.get_mut(&id) {
            e.answer = Some(answer.to_string());
        }
        Ok(())
    }

    async fn list_evaluations(
        &self,
        restaurant_id: Uuid,
        filter: &EvaluationFilter,
        pagination: Pagination,
    ) -> Result<(Vec<EvaluationSummary>, i64), RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<EvaluationSummary> = state
            .evaluations
            .values()
            .filter(|e| e.restaurant_id == restaurant_id)
            .filter(|e| filter.rating.map_or(true, |r| e.rating == r))
            .map(|e| EvaluationSummary {
                evaluation: e.clone(),
                customer_name: state
                    .users
                    .get(&e.customer_id)
                    .map(|u| u.full_name.clone())
                    .unwrap_or_default(),
            })
            .filter(|s| {
                filter.customer_name.as_deref().map_or(true, |needle| {
                    s.customer_name
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
                })
            })
            .collect();
        matching.sort_by(|a, b| b.evaluation.created_at.cmp(&a.evaluation.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .collect();
        Ok((page, total))
    }
}
