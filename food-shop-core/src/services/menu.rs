use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{Context, ServiceError};
use crate::identity::RequestIdentity;
use crate::models::{MenuChanges, PopularProduct, Product, ProductUpdate};
use crate::repositories::ProductRepository;

const POPULAR_PRODUCTS_LIMIT: i64 = 5;

/// A product as submitted by the manager. Without an `id` it is new.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price_in_cents: i32,
}

#[derive(Debug, Clone, Default)]
pub struct MenuUpdate {
    pub products: Vec<ProductInput>,
    pub deleted_product_ids: Vec<Uuid>,
}

impl MenuUpdate {
    fn into_changes(self, restaurant_id: Uuid) -> MenuChanges {
        let now = Utc::now();
        let mut changes = MenuChanges {
            deleted: self.deleted_product_ids,
            ..MenuChanges::default()
        };

        for input in self.products {
            match input.id {
                Some(id) => changes.updated.push(ProductUpdate {
                    id,
                    name: input.name,
                    description: input.description,
                    price_in_cents: input.price_in_cents,
                }),
                None => changes.created.push(Product {
                    id: Uuid::new_v4(),
                    restaurant_id,
                    name: input.name,
                    description: input.description,
                    price_in_cents: input.price_in_cents,
                    created_at: now,
                    deleted_at: None,
                }),
            }
        }

        changes
    }
}

pub struct MenuService {
    products: Arc<dyn ProductRepository>,
}

impl MenuService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Creates, updates and soft-deletes products of the manager's restaurant
    /// in one go. Every referenced product must be live and owned by that
    /// restaurant, otherwise nothing changes.
    #[instrument(skip(self, identity, update), fields(user_id = %identity.user_id))]
    pub async fn update_menu(
        &self,
        identity: &RequestIdentity,
        update: MenuUpdate,
    ) -> Result<(), ServiceError> {
        let restaurant_id = identity.restaurant_id()?;
        let changes = update.into_changes(restaurant_id);

        let referenced = changes.referenced_ids();
        if !referenced.is_empty() {
            let found = self
                .products
                .get_products_by_ids_and_restaurant_id(&referenced, restaurant_id)
                .await
                .context("get products by IDs and restaurant ID")?;
            if found.len() != referenced.len() {
                warn!(
                    %restaurant_id,
                    requested = referenced.len(),
                    found = found.len(),
                    "menu update references unknown products"
                );
                return Err(ServiceError::SomeProductsNotFound);
            }
        }

        self.products
            .update_menu(restaurant_id, &changes)
            .await
            .context("update menu")?;

        info!(
            %restaurant_id,
            created = changes.created.len(),
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            "menu updated"
        );
        Ok(())
    }

    pub async fn get_popular_products(
        &self,
        identity: &RequestIdentity,
    ) -> Result<Vec<PopularProduct>, ServiceError> {
        let restaurant_id = identity.restaurant_id()?;
        self.products
            .get_popular_products(restaurant_id, POPULAR_PRODUCTS_LIMIT)
            .await
            .context("get popular products")
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{OrderStatus, Role};
    use crate::test_support::MemoryStore;

    use super::*;

    fn manager_of(restaurant_id: Uuid) -> RequestIdentity {
        RequestIdentity {
            user_id: Uuid::new_v4(),
            session_id: Uuid::now_v7(),
            role: Role::Manager,
            restaurant_id: Some(restaurant_id),
        }
    }

    fn input(id: Option<Uuid>, name: &str, price_in_cents: i32) -> ProductInput {
        ProductInput {
            id,
            name: name.to_string(),
            description: None,
            price_in_cents,
        }
    }

    #[tokio::test]
    async fn menu_update_creates_updates_and_deletes() {
        let store = Arc::new(MemoryStore::default());
        let restaurant = store.add_restaurant("Cantina", Uuid::new_v4());
        let taco = store.add_product(restaurant.id, "Taco", 500);
        let nachos = store.add_product(restaurant.id, "Nachos", 700);
        let service = MenuService::new(store.clone());

        service
            .update_menu(
                &manager_of(restaurant.id),
                MenuUpdate {
                    products: vec![
                        input(Some(taco.id), "Taco al pastor", 650),
                        input(None, "Burrito", 900),
                    ],
                    deleted_product_ids: vec![nachos.id],
                },
            )
            .await
            .unwrap();

        let menu = store.menu_of(restaurant.id);
        let names: Vec<&str> = menu.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Burrito", "Taco al pastor"]);
        assert_eq!(store.product(taco.id).unwrap().price_in_cents, 650);
        assert!(store.product(nachos.id).unwrap().deleted_at.is_some());
    }

    #[tokio::test]
    async fn foreign_products_reject_the_whole_update() {
        let store = Arc::new(MemoryStore::default());
        let mine = store.add_restaurant("Cantina", Uuid::new_v4());
        let theirs = store.add_restaurant("Elsewhere", Uuid::new_v4());
        let taco = store.add_product(mine.id, "Taco", 500);
        let foreign = store.add_product(theirs.id, "Pizza", 1200);
        let service = MenuService::new(store.clone());

        let err = service
            .update_menu(
                &manager_of(mine.id),
                MenuUpdate {
                    products: vec![
                        input(Some(taco.id), "Renamed", 1),
                        input(None, "Burrito", 900),
                    ],
                    deleted_product_ids: vec![foreign.id],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::SomeProductsNotFound));
        assert_eq!(store.product(taco.id), Some(taco));
        assert_eq!(store.product(foreign.id), Some(foreign));
        assert_eq!(store.menu_of(mine.id).len(), 1);
    }

    #[tokio::test]
    async fn failed_insert_leaves_the_menu_untouched() {
        let store = Arc::new(MemoryStore::default());
        let restaurant = store.add_restaurant("Cantina", Uuid::new_v4());
        let taco = store.add_product(restaurant.id, "Taco", 500);
        let service = MenuService::new(store.clone());
        store.fail_on_insert(2);

        let err = service
            .update_menu(
                &manager_of(restaurant.id),
                MenuUpdate {
                    products: vec![
                        input(None, "Burrito", 900),
                        input(None, "Quesadilla", 800),
                    ],
                    deleted_product_ids: vec![taco.id],
                },
            )
            .await
            .unwrap_err();

        assert!(err.is_internal());
        assert_eq!(store.menu_of(restaurant.id), vec![taco]);
    }

    #[tokio::test]
    async fn deleted_products_cannot_be_edited() {
        let store = Arc::new(MemoryStore::default());
        let restaurant = store.add_restaurant("Cantina", Uuid::new_v4());
        let taco = store.add_product(restaurant.id, "Taco", 500);
        store.delete_product(taco.id);
        let service = MenuService::new(store.clone());

        let err = service
            .update_menu(
                &manager_of(restaurant.id),
                MenuUpdate {
                    products: vec![input(Some(taco.id), "Taco", 1)],
                    deleted_product_ids: vec![],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::SomeProductsNotFound));
        assert_eq!(store.product(taco.id).unwrap().price_in_cents, 500);
    }

    #[tokio::test]
    async fn popular_products_rank_by_order_lines() {
        let store = Arc::new(MemoryStore::default());
        let mine = store.add_restaurant("Cantina", Uuid::new_v4());
        let theirs = store.add_restaurant("Elsewhere", Uuid::new_v4());
        let taco = store.add_product(mine.id, "Taco", 500);
        let burrito = store.add_product(mine.id, "Burrito", 900);
        let pizza = store.add_product(theirs.id, "Pizza", 1200);
        let customer = Uuid::new_v4();

        for _ in 0..3 {
            let order = store.add_order(customer, mine.id, OrderStatus::Delivered);
            store.add_order_item(order.id, &taco, 1);
        }
        let order = store.add_order(customer, mine.id, OrderStatus::Pending);
        store.add_order_item(order.id, &burrito, 4);
        let elsewhere = store.add_order(customer, theirs.id, OrderStatus::Pending);
        store.add_order_item(elsewhere.id, &pizza, 1);

        let service = MenuService::new(store.clone());
        let popular = service
            .get_popular_products(&manager_of(mine.id))
            .await
            .unwrap();

        assert_eq!(
            popular,
            vec![
                PopularProduct {
                    name: "Taco".to_string(),
                    order_count: 3,
                },
                PopularProduct {
                    name: "Burrito".to_string(),
                    order_count: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn restaurant_without_orders_has_no_popular_products() {
        let store = Arc::new(MemoryStore::default());
        let restaurant = store.add_restaurant("Cantina", Uuid::new_v4());
        store.add_product(restaurant.id, "Taco", 500);
        let service = MenuService::new(store.clone());

        let popular = service
            .get_popular_products(&manager_of(restaurant.id))
            .await
            .unwrap();

        assert!(popular.is_empty());
    }
}
