use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::hub::Hub;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub hub: Arc<Hub>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            hub: Arc::new(Hub::new(config.hub.queue_capacity)),
            config: Arc::new(config),
        }
    }
}
