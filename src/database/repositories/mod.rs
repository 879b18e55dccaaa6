//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod admin;
pub mod district;
pub mod panchayat;
pub mod media;
pub mod news;
pub mod contact;

// Re-export repositories
pub use admin::AdminRepository;
pub use district::DistrictRepository;
pub use panchayat::PanchayatRepository;
pub use media::MediaRepository;
pub use news::NewsRepository;
pub use contact::ContactRepository;
