//! Database service layer
//!
//! Bundles one repository per table over a shared pool.

use crate::database::{
    DatabasePool, AdminRepository, DistrictRepository, PanchayatRepository, MediaRepository,
    NewsRepository, ContactRepository,
};
use crate::utils::errors::TourifyError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub admins: AdminRepository,
    pub districts: DistrictRepository,
    pub panchayats: PanchayatRepository,
    pub media: MediaRepository,
    pub news: NewsRepository,
    pub contacts: ContactRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            admins: AdminRepository::new(pool.clone()),
            districts: DistrictRepository::new(pool.clone()),
            panchayats: PanchayatRepository::new(pool.clone()),
            media: MediaRepository::new(pool.clone()),
            news: NewsRepository::new(pool.clone()),
            contacts: ContactRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Round trip to the database
    pub async fn health_check(&self) -> Result<(), TourifyError> {
        super::connection::health_check(&self.pool).await
    }
}
