//! HTTP handlers
//!
//! Thin axum handlers: extract, call the matching service, wrap the result.
//! Access rules live in the services.

pub mod admins;
pub mod auth;
pub mod contacts;
pub mod dashboard;
pub mod districts;
pub mod extract;
pub mod media;
pub mod news;
pub mod panchayats;
