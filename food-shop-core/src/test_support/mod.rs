//! In-memory stand-ins for the cache, the database and the email queue.

use std::{sync::Mutex, time::Duration};

use crate::config::AuthConfig;
use crate::queue::{EmailDispatcher, EmailTask};
use crate::services::token::tests::{PRIVATE_KEY, PUBLIC_KEY};

mod log_capture;
mod memory_cache;
mod memory_store;
pub mod postgres;

pub use log_capture::LogCapture;
pub use memory_cache::MemoryCache;
pub use memory_store::MemoryStore;

#[derive(Default)]
pub struct RecordingDispatcher {
    tasks: Mutex<Vec<EmailTask>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<EmailTask> {
        self.tasks.lock().unwrap().clone()
    }
}

impl EmailDispatcher for RecordingDispatcher {
    fn submit(&self, task: EmailTask) {
        self.tasks.lock().unwrap().push(task);
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        private_key_pem: PRIVATE_KEY.to_vec(),
        public_key_pem: PUBLIC_KEY.to_vec(),
        token_issuer: "food-shop".to_string(),
        session_ttl: Duration::from_secs(24 * 60 * 60),
        cache_ttl: Duration::from_secs(10 * 60),
        api_base_url: "http://localhost:8080".to_string(),
        redirect_url: "http://localhost:3000".to_string(),
    }
}
