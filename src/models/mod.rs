//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod common;
pub mod admin;
pub mod district;
pub mod panchayat;
pub mod media;
pub mod news;
pub mod contact;

// Re-export commonly used models
pub use common::{Page, Pagination};
pub use admin::{Admin, NewAdmin, Role, AccountStatus, CreateAdminRequest, UpdateAdminRequest, UpdateAdminStatusRequest, AdminListQuery, LoginRequest, LoginResponse, ChangePasswordRequest};
pub use district::{District, CreateDistrictRequest, UpdateDistrictRequest, DistrictListQuery};
pub use panchayat::{GramPanchayat, NewPanchayat, PanchayatStatus, RtcReport, CreatePanchayatRequest, UpdatePanchayatRequest, UpdatePanchayatStatusRequest, RtcReportRequest, PanchayatListQuery, PanchayatFilter};
pub use media::{Media, NewMedia, FileType, MediaStatus, CreateMediaRequest, UpdateMediaRequest, UpdateMediaStatusRequest, MediaListQuery, MediaFilter, UploadedFile};
pub use news::{News, NewNews, NewsStatus, CreateNewsRequest, UpdateNewsRequest, UpdateNewsStatusRequest, NewsListQuery};
pub use contact::{Contact, ContactStatus, CreateContactRequest, UpdateContactStatusRequest, ContactListQuery};
