//! Gram panchayat model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

/// Documentation lifecycle of a panchayat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "panchayat_status")]
pub enum PanchayatStatus {
    Draft,
    Pending,
    Verified,
}

impl PanchayatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanchayatStatus::Draft => "Draft",
            PanchayatStatus::Pending => "Pending",
            PanchayatStatus::Verified => "Verified",
        }
    }
}

/// Field report filed by a coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcReport {
    pub summary: String,
    pub infrastructure: Option<String>,
    #[serde(default)]
    pub attractions: Vec<String>,
    pub recommendations: Option<String>,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GramPanchayat {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub district_id: Uuid,
    pub block: Option<String>,
    pub description: Option<String>,
    pub population: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: PanchayatStatus,
    pub gallery: Vec<Uuid>,
    pub rtc_report: Option<Json<RtcReport>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert, after validation and workflow defaults
#[derive(Debug, Clone)]
pub struct NewPanchayat {
    pub name: String,
    pub slug: String,
    pub district_id: Uuid,
    pub block: Option<String>,
    pub description: Option<String>,
    pub population: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: PanchayatStatus,
    pub gallery: Vec<Uuid>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePanchayatRequest {
    pub name: String,
    pub district_id: Uuid,
    pub block: Option<String>,
    pub description: Option<String>,
    pub population: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<PanchayatStatus>,
    #[serde(default)]
    pub gallery: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePanchayatRequest {
    pub name: Option<String>,
    pub district_id: Option<Uuid>,
    pub block: Option<String>,
    pub description: Option<String>,
    pub population: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<PanchayatStatus>,
    pub gallery: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePanchayatStatusRequest {
    pub status: PanchayatStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcReportRequest {
    pub summary: String,
    pub infrastructure: Option<String>,
    #[serde(default)]
    pub attractions: Vec<String>,
    pub recommendations: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanchayatListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub district: Option<Uuid>,
    pub status: Option<PanchayatStatus>,
}

/// Repository-level filter; visibility has already been resolved
#[derive(Debug, Clone, Default)]
pub struct PanchayatFilter {
    pub search: Option<String>,
    pub district_id: Option<Uuid>,
    pub status: Option<PanchayatStatus>,
    /// When set, only rows in these districts are returned
    pub within_districts: Option<Vec<Uuid>>,
}
