//! Test helpers module
//!
//! Database setup, request helpers, sample payloads and a mock object
//! storage server shared by the integration tests.

#![allow(dead_code)]

pub mod database_helper;
pub mod storage_mock;
pub mod test_context;
pub mod test_data;

pub use database_helper::*;
pub use storage_mock::*;
pub use test_context::*;
pub use test_data::*;
