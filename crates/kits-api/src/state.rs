use std::sync::Arc;

use crate::config::Settings;
use crate::kits::KitService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub kit_service: Arc<KitService>,
}

impl AppState {
    pub fn new(settings: Settings, kit_service: KitService) -> Self {
        Self {
            settings: Arc::new(settings),
            kit_service: Arc::new(kit_service),
        }
    }
}
