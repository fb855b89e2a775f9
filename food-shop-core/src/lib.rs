pub mod cache;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod identity;
pub mod models;
pub mod queue;
pub mod repositories;
pub mod schema;
pub mod services;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use context::AppContext;
pub use error::ServiceError;
pub use identity::{Permission, RequestIdentity};
