//! Object storage client
//!
//! Uploads go to a Cloudinary-compatible unsigned upload endpoint:
//! `{base_url}/{cloud_name}/{resource_type}/upload`.

use serde::Deserialize;
use tracing::{info, warn};
use crate::config::settings::StorageConfig;
use crate::models::media::{FileType, UploadedFile};
use crate::utils::errors::{StorageError, StorageResult, TourifyError, Result};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    public_id: String,
}

/// Storage service for media uploads
#[derive(Clone)]
pub struct StorageService {
    config: Option<StorageConfig>,
    http_client: reqwest::Client,
}

impl StorageService {
    /// Create a new StorageService instance
    pub fn new(config: Option<StorageConfig>) -> Result<Self> {
        let timeout = config.as_ref().map(|c| c.timeout_seconds).unwrap_or(30);
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout))
            .user_agent(concat!("mp-tourify/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, http_client })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Largest accepted upload in bytes
    pub fn max_file_size(&self) -> Option<u64> {
        self.config.as_ref().map(|c| c.max_file_size_mb * 1024 * 1024)
    }

    /// Map a MIME type to the media kind it is stored as
    pub fn file_type_for(content_type: &str) -> StorageResult<FileType> {
        let essence = content_type.split(';').next().unwrap_or_default().trim().to_lowercase();

        if essence.starts_with("image/") {
            Ok(FileType::Image)
        } else if essence.starts_with("video/") {
            Ok(FileType::Video)
        } else {
            Err(StorageError::UnsupportedFileType(content_type.to_string()))
        }
    }

    /// Forward a file to object storage
    pub async fn upload(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<UploadedFile> {
        let config = self.config.as_ref().ok_or_else(|| {
            TourifyError::ServiceUnavailable("File uploads are not configured".to_string())
        })?;

        let resource_type = Self::file_type_for(content_type)?;

        if let Some(max) = self.max_file_size() {
            if bytes.len() as u64 > max {
                return Err(TourifyError::InvalidInput(format!(
                    "File exceeds the {} MB limit",
                    config.max_file_size_mb
                )));
            }
        }

        let endpoint = format!(
            "{}/{}/{}/upload",
            config.base_url.trim_end_matches('/'),
            config.cloud_name,
            resource_type.as_str()
        );

        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|_| TourifyError::InvalidInput(format!("Invalid content type '{}'", content_type)))?;
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", config.upload_preset.clone())
            .text("folder", config.folder.clone())
            .part("file", part);

        let response = self.http_client.post(&endpoint).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Storage upload rejected");
            return Err(StorageError::UploadFailed(format!("storage responded with {}", status)).into());
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| StorageError::InvalidResponse("missing url".to_string()))?;

        info!(public_id = %body.public_id, size = size, resource_type = resource_type.as_str(), "File uploaded");

        Ok(UploadedFile {
            url,
            public_id: body.public_id,
            resource_type,
        })
    }
}
