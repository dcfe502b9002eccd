use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use crate::models::settings::GenerationSettings;
use crate::services::job_store::JobStore;
use crate::services::queue::DriverState;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
    pub settings: Arc<RwLock<GenerationSettings>>,
    pub driver: watch::Receiver<DriverState>,
}

impl AppState {
    pub fn new(
        store: JobStore,
        settings: GenerationSettings,
        driver: watch::Receiver<DriverState>,
    ) -> Self {
        Self {
            store,
            settings: Arc::new(RwLock::new(settings)),
            driver,
        }
    }

    pub fn driver_state(&self) -> DriverState {
        *self.driver.borrow()
    }
}
