//! Shared server state
//!
//! One `ServerState` is built at startup and cloned into every handler.
//! All fields are cheap to clone (`Arc` internally).

use std::sync::Arc;

use crate::core::Config;
use crate::db::{Store, StorageResult};
use crate::notify::{self, Notifier};
use crate::orders::OrderManager;
use crate::replacements::ReplacementManager;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub store: Store,
    pub orders: OrderManager,
    pub replacements: ReplacementManager,
    pub notifier: Arc<dyn Notifier>,
}

impl ServerState {
    /// Open the database under the configured working directory
    pub fn initialize(config: &Config) -> StorageResult<Self> {
        std::fs::create_dir_all(&config.work_dir).ok();
        let store = Store::open(config.db_path())?;
        Ok(Self::with_store(config.clone(), store))
    }

    /// Build state over an existing store (tests use an in-memory one)
    pub fn with_store(config: Config, store: Store) -> Self {
        let notifier = notify::from_endpoint(config.notify_email_url.clone());
        Self {
            config: Arc::new(config),
            orders: OrderManager::new(store.clone()),
            replacements: ReplacementManager::new(store.clone()),
            store,
            notifier,
        }
    }
}
