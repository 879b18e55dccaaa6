//! Shared application state
//!
//! Every handler receives a clone of [`AppState`]; the services inside share
//! one database pool.

use std::sync::Arc;
use crate::config::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire repositories and services over an existing pool
    pub fn new(pool: DatabasePool, settings: Settings) -> Result<Self> {
        let database = DatabaseService::new(pool);
        let services = ServiceFactory::new(database, &settings)?;

        Ok(Self {
            services: Arc::new(services),
            settings: Arc::new(settings),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.settings.auth.cookie_name
    }
}
