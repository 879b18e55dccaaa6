//! Media gallery model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_file_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
        }
    }
}

/// Moderation state of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    Pending,
    Approved,
    Rejected,
}

impl MediaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStatus::Pending => "pending",
            MediaStatus::Approved => "approved",
            MediaStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: FileType,
    pub district_id: Option<Uuid>,
    pub gram_panchayat_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub status: MediaStatus,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMedia {
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: FileType,
    pub district_id: Option<Uuid>,
    pub gram_panchayat_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub status: MediaStatus,
    pub uploaded_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaRequest {
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: FileType,
    pub district_id: Option<Uuid>,
    pub gram_panchayat_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<MediaStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMediaRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub file_type: Option<FileType>,
    pub district_id: Option<Uuid>,
    pub gram_panchayat_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMediaStatusRequest {
    pub status: MediaStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub district: Option<Uuid>,
    pub panchayat: Option<Uuid>,
    #[serde(alias = "file_type")]
    pub file_type: Option<FileType>,
    pub status: Option<MediaStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    pub search: Option<String>,
    pub district_id: Option<Uuid>,
    pub gram_panchayat_id: Option<Uuid>,
    pub file_type: Option<FileType>,
    pub status: Option<MediaStatus>,
    /// When set, rows must be in one of these districts or uploaded by `or_uploaded_by`
    pub within_districts: Option<Vec<Uuid>>,
    pub or_uploaded_by: Option<Uuid>,
}

/// Result of a file upload to object storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    pub public_id: String,
    pub resource_type: FileType,
}
