use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, StoreBackend};

pub mod memory;
pub mod store;
pub mod supabase;

pub use memory::MemoryStore;
pub use store::{Filter, RecordKey, RecordStore};
pub use supabase::SupabaseStore;

/// Builds the store selected by `STORE_BACKEND`.
pub fn connect_store(config: &AppConfig) -> Arc<dyn RecordStore> {
    match config.store_backend {
        StoreBackend::Supabase => {
            info!("Using Supabase store at {}", config.supabase_url);
            Arc::new(SupabaseStore::new(config))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}
