//! District model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub headquarters: Option<String>,
    pub header_image: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDistrictRequest {
    pub name: String,
    pub description: Option<String>,
    pub headquarters: Option<String>,
    pub header_image: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDistrictRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub headquarters: Option<String>,
    pub header_image: Option<String>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistrictListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub featured: Option<bool>,
}
