use std::sync::Arc;

use thiserror::Error;

use crate::cache::{CacheError, CacheStore, RedisCache};
use crate::config::Config;
use crate::database::{create_pool, DatabaseError};
use crate::queue::{EmailDispatcher, KafkaEmailQueue, QueueError};
use crate::repositories::{
    EvaluationRepository, OrderRepository, PgEvaluationRepository, PgOrderRepository,
    PgProductRepository, PgRestaurantRepository, PgUserRepository, ProductRepository,
    RestaurantRepository, UserRepository,
};
use crate::services::{
    token::TokenError, AuthService, EvaluationService, MenuService, OrderService,
    RestaurantService, SessionService, TokenService, UserService,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database: {0}")]
    Database(#[from] DatabaseError),
    #[error("cache: {0}")]
    Cache(#[from] CacheError),
    #[error("email queue: {0}")]
    Queue(#[from] QueueError),
    #[error("signing keys: {0}")]
    Token(#[from] TokenError),
}

/// Every service, wired once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub sessions: Arc<SessionService>,
    pub auth: Arc<AuthService>,
    pub orders: Arc<OrderService>,
    pub restaurants: Arc<RestaurantService>,
    pub users: Arc<UserService>,
    pub evaluations: Arc<EvaluationService>,
    pub menus: Arc<MenuService>,
}

/// Backing stores the services run against.
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub restaurants: Arc<dyn RestaurantRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub evaluations: Arc<dyn EvaluationRepository>,
    pub cache: Arc<dyn CacheStore>,
    pub email: Arc<dyn EmailDispatcher>,
}

impl AppContext {
    /// Connects to Postgres, Redis and Kafka and builds the services.
    pub async fn connect(config: &Config) -> Result<Self, StartupError> {
        let pool = create_pool(&config.database_url, config.database_pool_size)?;
        let cache = RedisCache::connect(&config.redis_url).await?;
        let email = KafkaEmailQueue::start(config.kafka_hosts.clone(), config.email_topic.clone())?;

        let stores = Stores {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            restaurants: Arc::new(PgRestaurantRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            evaluations: Arc::new(PgEvaluationRepository::new(pool)),
            cache: Arc::new(cache),
            email: Arc::new(email),
        };

        Self::build(stores, config)
    }

    pub fn build(stores: Stores, config: &Config) -> Result<Self, StartupError> {
        let tokens = Arc::new(TokenService::new(&config.auth)?);
        let sessions = Arc::new(SessionService::new(
            tokens,
            stores.cache.clone(),
            &config.auth,
        ));
        let auth = Arc::new(AuthService::new(
            stores.users.clone(),
            stores.restaurants.clone(),
            stores.cache.clone(),
            sessions.clone(),
            stores.email,
            &config.auth,
        ));
        let menus = Arc::new(MenuService::new(stores.products.clone()));
        let orders = Arc::new(OrderService::new(stores.orders, stores.products));
        let restaurants = Arc::new(RestaurantService::new(
            stores.users.clone(),
            stores.restaurants.clone(),
            orders.clone(),
            auth.clone(),
        ));
        let users = Arc::new(UserService::new(
            stores.users,
            stores.restaurants.clone(),
            stores.cache,
            auth.clone(),
            &config.auth,
        ));
        let evaluations = Arc::new(EvaluationService::new(
            stores.evaluations,
            stores.restaurants,
        ));

        Ok(Self {
            sessions,
            auth,
            orders,
            restaurants,
            users,
            evaluations,
            menus,
        })
    }
}
