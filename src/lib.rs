//! MP Tourify backend
//!
//! Content management API for the Madhya Pradesh rural tourism portal.
//! Admins and Rural Tourism Coordinators curate districts, gram panchayats,
//! media and news; the public reads verified content and sends enquiries.

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod routes;
pub mod state;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{TourifyError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use state::AppState;
pub use routes::create_router;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
