//! Helpers for the `#[ignore]`d tests that run against a real Postgres.
//! Run them with `DATABASE_URL=... cargo test -- --ignored`.

use chrono::Utc;
use uuid::Uuid;

use crate::database::{create_pool, run_migrations};
use crate::models::{Restaurant, Role, User};
use crate::repositories::{
    DbPool, PgRestaurantRepository, PgUserRepository, RestaurantRepository, UserRepository,
};

pub async fn migrated_pool() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    run_migrations(&url).await.unwrap();
    create_pool(&url, 2).unwrap()
}

/// A fresh restaurant and a customer, with unique emails so runs can repeat.
pub async fn seed_restaurant(pool: &DbPool) -> (Restaurant, User) {
    let tag = Uuid::new_v4().simple();
    let manager = User::new(
        "Maria".to_string(),
        format!("maria-{tag}@example.com"),
        None,
        Role::Manager,
    );
    let restaurant = Restaurant {
        id: Uuid::new_v4(),
        name: "Cantina".to_string(),
        description: None,
        manager_id: manager.id,
        created_at: Utc::now(),
    };
    PgRestaurantRepository::new(pool.clone())
        .create_restaurant_with_manager(&manager, &restaurant)
        .await
        .unwrap();

    let customer = User::new(
        "Carlos".to_string(),
        format!("carlos-{tag}@example.com"),
        None,
        Role::Customer,
    );
    PgUserRepository::new(pool.clone())
        .create_user(&customer)
        .await
        .unwrap();

    (restaurant, customer)
}
