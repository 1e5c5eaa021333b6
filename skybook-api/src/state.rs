use std::sync::Arc;

use skybook_catalog::InventoryService;
use skybook_core::repository::{BookingStore, InventoryReader, ReferenceData};
use skybook_order::BookingCoordinator;
use skybook_store::app_config::RateLimitConfig;
use skybook_store::{InMemoryStore, RedisClient};

#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryService>,
    pub coordinator: Arc<BookingCoordinator>,
    /// Rate limiting is skipped when absent.
    pub redis: Option<Arc<RedisClient>>,
    pub rate_limit: RateLimitConfig,
}

impl AppState {
    pub fn new(
        reference: Arc<dyn ReferenceData>,
        reader: Arc<dyn InventoryReader>,
        store: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            inventory: Arc::new(InventoryService::new(reference.clone(), reader)),
            coordinator: Arc::new(BookingCoordinator::new(store, reference)),
            redis: None,
            rate_limit: RateLimitConfig::default(),
        }
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        let shared = Arc::new(store);
        Self::new(shared.clone(), shared.clone(), shared)
    }

    pub fn with_rate_limit(mut self, redis: Arc<RedisClient>, rate_limit: RateLimitConfig) -> Self {
        self.redis = Some(redis);
        self.rate_limit = rate_limit;
        self
    }
}
