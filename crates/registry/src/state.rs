use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::service::ContainerService;
use crate::store::MemoryRepo;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub containers: ContainerService,
    pub config: Arc<RegistryConfig>,
}

impl AppState {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            containers: ContainerService::new(Arc::new(MemoryRepo::new())),
            config: Arc::new(config),
        }
    }
}
