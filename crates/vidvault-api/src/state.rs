use std::sync::Arc;
use vidvault_core::Config;
use vidvault_storage::Storage;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        Self { config, storage }
    }
}
