//! Services module
//!
//! This module contains business logic services

pub mod admin;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod district;
pub mod media;
pub mod news;
pub mod panchayat;
pub mod storage;
pub mod workflow;

// Re-export commonly used services
pub use admin::AdminService;
pub use auth::{AuthService, AuthContext, Permission, Scope, Claims};
pub use contact::ContactService;
pub use dashboard::{DashboardService, DashboardStats, StatusCounts};
pub use district::DistrictService;
pub use media::MediaService;
pub use news::NewsService;
pub use panchayat::PanchayatService;
pub use storage::StorageService;

use std::future::Future;
use serde::Serialize;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::{TourifyError, Result};
use crate::utils::helpers::{slug_with_suffix, slugify};

const SLUG_ATTEMPTS: usize = 5;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub database: DatabaseService,
    pub auth_service: AuthService,
    pub admin_service: AdminService,
    pub district_service: DistrictService,
    pub panchayat_service: PanchayatService,
    pub media_service: MediaService,
    pub news_service: NewsService,
    pub contact_service: ContactService,
    pub dashboard_service: DashboardService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(database: DatabaseService, settings: &Settings) -> Result<Self> {
        let auth_service = AuthService::new(database.admins.clone(), settings.auth.clone())?;
        let storage_service = StorageService::new(settings.storage.clone())?;

        Ok(Self {
            admin_service: AdminService::new(
                database.admins.clone(),
                database.districts.clone(),
                auth_service.clone(),
            ),
            district_service: DistrictService::new(database.districts.clone()),
            panchayat_service: PanchayatService::new(
                database.panchayats.clone(),
                database.districts.clone(),
                database.media.clone(),
            ),
            media_service: MediaService::new(
                database.media.clone(),
                database.panchayats.clone(),
                database.districts.clone(),
                storage_service,
            ),
            news_service: NewsService::new(database.news.clone()),
            contact_service: ContactService::new(database.contacts.clone()),
            dashboard_service: DashboardService::new(database.clone()),
            auth_service,
            database,
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = self.database.health_check().await.is_ok();

        ServiceHealthStatus {
            database_healthy,
            storage_enabled: self.media_service.storage().is_enabled(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub storage_enabled: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }
}

/// Derive a slug from `name` that `exists` reports as free.
///
/// Collisions get a random suffix; after a few failed attempts the request
/// is rejected as a conflict.
pub async fn unique_slug<F, Fut>(name: &str, exists: F) -> Result<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let base = slugify(name);
    if base.is_empty() {
        return Err(TourifyError::InvalidInput(
            "Name must contain at least one letter or digit".to_string()
        ));
    }

    if !exists(base.clone()).await? {
        return Ok(base);
    }

    for _ in 0..SLUG_ATTEMPTS {
        let candidate = slug_with_suffix(&base);
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
    }

    Err(TourifyError::Conflict(format!("Could not find a free slug for {}", base)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_unique_slug_free() {
        let slug = unique_slug("Chanderi Weavers", |_| async { Ok(false) }).await.unwrap();
        assert_eq!(slug, "chanderi-weavers");
    }

    #[tokio::test]
    async fn test_unique_slug_collision_gets_suffix() {
        let slug = unique_slug("Mandu", |candidate| async move { Ok(candidate == "mandu") })
            .await
            .unwrap();
        assert!(slug.starts_with("mandu-"));
        assert_ne!(slug, "mandu");
    }

    #[tokio::test]
    async fn test_unique_slug_rejects_empty_and_exhausted() {
        assert_matches!(
            unique_slug("???", |_| async { Ok(false) }).await,
            Err(TourifyError::InvalidInput(_))
        );
        assert_matches!(
            unique_slug("Bhopal", |_| async { Ok(true) }).await,
            Err(TourifyError::Conflict(_))
        );
    }
}
