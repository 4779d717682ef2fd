use std::sync::Arc;

use axum::extract::FromRef;

use shared_config::AppConfig;
use shared_database::{connect_store, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn RecordStore>) -> Self {
        Self { config, store }
    }

    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let store = connect_store(&config);
        Self { config, store }
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
