//! Media gallery service implementation
//!
//! Uploads by RTC accounts wait for admin moderation. Media attached to a
//! panchayat inherit its district and appear in its gallery.

use tracing::info;
use uuid::Uuid;
use crate::database::repositories::{DistrictRepository, MediaRepository, PanchayatRepository};
use crate::models::common::{Page, Pagination};
use crate::models::media::{
    CreateMediaRequest, Media, MediaFilter, MediaListQuery, MediaStatus, NewMedia, UpdateMediaRequest,
    UpdateMediaStatusRequest, UploadedFile,
};
use crate::services::auth::{AuthContext, Scope};
use crate::services::storage::StorageService;
use crate::services::workflow;
use crate::utils::errors::{TourifyError, Result};
use crate::utils::helpers::{normalize_tags, optional_text, require_text, validate_url};
use crate::utils::logging::{log_admin_action, log_status_change};

const MAX_TITLE_LEN: usize = 200;

#[derive(Clone)]
pub struct MediaService {
    media: MediaRepository,
    panchayats: PanchayatRepository,
    districts: DistrictRepository,
    storage: StorageService,
}

impl MediaService {
    pub fn new(
        media: MediaRepository,
        panchayats: PanchayatRepository,
        districts: DistrictRepository,
        storage: StorageService,
    ) -> Self {
        Self { media, panchayats, districts, storage }
    }

    /// List the media visible to `viewer`. RTC accounts also see their own uploads.
    pub async fn list(&self, viewer: Option<&AuthContext>, query: MediaListQuery) -> Result<Page<Media>> {
        let pagination = Pagination::new(query.page, query.limit);
        let scope = Scope::for_viewer(viewer);

        let or_uploaded_by = match scope {
            Scope::Districts { admin_id, .. } => Some(admin_id),
            _ => None,
        };

        let filter = MediaFilter {
            search: query.search,
            district_id: query.district,
            gram_panchayat_id: query.panchayat,
            file_type: query.file_type,
            status: if scope.is_public() { Some(MediaStatus::Approved) } else { query.status },
            within_districts: scope.within_districts(),
            or_uploaded_by,
        };

        let (media, total) = self.media.list(&filter, pagination).await?;
        Ok(Page::new(media, total, pagination))
    }

    pub async fn get(&self, viewer: Option<&AuthContext>, id: Uuid) -> Result<Media> {
        let media = self.load(id).await?;

        match viewer {
            None if media.status != MediaStatus::Approved => Err(TourifyError::not_found("media", id)),
            Some(ctx) => {
                require_visible(ctx, &media)?;
                Ok(media)
            }
            None => Ok(media),
        }
    }

    pub async fn create(&self, ctx: &AuthContext, request: CreateMediaRequest) -> Result<Media> {
        let title = require_text("title", &request.title, MAX_TITLE_LEN)?;
        let file_url = require_text("fileUrl", &request.file_url, 2048)?;
        validate_url("fileUrl", &file_url)?;

        let district_id = self
            .resolve_district(ctx, request.district_id, request.gram_panchayat_id)
            .await?;
        let status = workflow::initial_media_status(ctx, request.status);

        let media = self
            .media
            .create(NewMedia {
                title,
                description: optional_text(request.description),
                file_url,
                file_type: request.file_type,
                district_id,
                gram_panchayat_id: request.gram_panchayat_id,
                tags: normalize_tags(request.tags),
                status,
                uploaded_by: ctx.admin_id,
            })
            .await?;

        log_admin_action(ctx.admin_id, "create_media", Some(&media.id.to_string()), Some(status.as_str()));
        Ok(media)
    }

    /// Edit media metadata; RTC edits go back to moderation
    pub async fn update(&self, ctx: &AuthContext, id: Uuid, request: UpdateMediaRequest) -> Result<Media> {
        let mut media = self.load(id).await?;
        require_visible(ctx, &media)?;
        let previous_panchayat = media.gram_panchayat_id;
        let previous_status = media.status;

        if let Some(title) = request.title {
            media.title = require_text("title", &title, MAX_TITLE_LEN)?;
        }
        if let Some(description) = request.description {
            media.description = optional_text(Some(description));
        }
        if let Some(file_url) = request.file_url {
            let file_url = require_text("fileUrl", &file_url, 2048)?;
            validate_url("fileUrl", &file_url)?;
            media.file_url = file_url;
        }
        if let Some(file_type) = request.file_type {
            media.file_type = file_type;
        }
        if let Some(tags) = request.tags {
            media.tags = normalize_tags(tags);
        }

        if request.district_id.is_some() || request.gram_panchayat_id.is_some() {
            // Moving to another district without naming a panchayat detaches the old one
            let panchayat_id = match request.gram_panchayat_id {
                Some(panchayat_id) => Some(panchayat_id),
                None if request.district_id != media.district_id => None,
                None => media.gram_panchayat_id,
            };
            media.district_id = self
                .resolve_district(ctx, request.district_id, panchayat_id)
                .await?;
            media.gram_panchayat_id = panchayat_id;
        }

        media.status = workflow::media_status_after_edit(ctx, media.status);

        let media = self.media.save(&media, previous_panchayat).await?;
        if media.status != previous_status {
            log_status_change("media", id, previous_status.as_str(), media.status.as_str(), ctx.admin_id);
        }
        log_admin_action(ctx.admin_id, "update_media", Some(&id.to_string()), None);
        Ok(media)
    }

    /// Moderation decision by an admin
    pub async fn set_status(&self, ctx: &AuthContext, id: Uuid, request: UpdateMediaStatusRequest) -> Result<Media> {
        let status = workflow::media_status_change(ctx, request.status)?;
        let media = self.load(id).await?;

        let updated = self.media.set_status(id, status).await?;
        log_status_change("media", id, media.status.as_str(), status.as_str(), ctx.admin_id);
        Ok(updated)
    }

    /// Admins delete anything; an RTC may withdraw its own uploads until approved
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<()> {
        let media = self.load(id).await?;

        if !ctx.is_admin() {
            let own = media.uploaded_by == Some(ctx.admin_id);
            if !own || media.status == MediaStatus::Approved {
                return Err(TourifyError::PermissionDenied(
                    "Only pending or rejected uploads of your own can be deleted".to_string()
                ));
            }
        }

        self.media.delete(id).await?;
        log_admin_action(ctx.admin_id, "delete_media", Some(&id.to_string()), None);
        info!(media_id = %id, "Media deleted");
        Ok(())
    }

    /// Forward an uploaded file to object storage
    pub async fn upload(&self, ctx: &AuthContext, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<UploadedFile> {
        let uploaded = self.storage.upload(file_name, content_type, bytes).await?;
        log_admin_action(ctx.admin_id, "upload_file", Some(&uploaded.public_id), Some(uploaded.resource_type.as_str()));
        Ok(uploaded)
    }

    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    async fn load(&self, id: Uuid) -> Result<Media> {
        self.media
            .find_by_id(id)
            .await?
            .ok_or_else(|| TourifyError::not_found("media", id))
    }

    /// District the media ends up in. A referenced panchayat decides it and
    /// a conflicting explicit district is rejected.
    async fn resolve_district(
        &self,
        ctx: &AuthContext,
        district_id: Option<Uuid>,
        panchayat_id: Option<Uuid>,
    ) -> Result<Option<Uuid>> {
        let district_id = match panchayat_id {
            Some(panchayat_id) => {
                let panchayat = self
                    .panchayats
                    .find_by_id(panchayat_id)
                    .await?
                    .ok_or_else(|| TourifyError::InvalidInput(format!("Gram panchayat {} does not exist", panchayat_id)))?;

                if let Some(requested) = district_id {
                    if requested != panchayat.district_id {
                        return Err(TourifyError::InvalidInput(
                            "District does not match the gram panchayat's district".to_string()
                        ));
                    }
                }
                Some(panchayat.district_id)
            }
            None => {
                if let Some(id) = district_id {
                    if self.districts.find_by_id(id).await?.is_none() {
                        return Err(TourifyError::InvalidInput(format!("District {} does not exist", id)));
                    }
                }
                district_id
            }
        };

        if !ctx.is_admin() {
            let district = district_id.ok_or_else(|| {
                TourifyError::InvalidInput("A district or gram panchayat is required".to_string())
            })?;
            ctx.require_district(district)?;
        }

        Ok(district_id)
    }
}

/// RTC accounts reach media in their districts and their own uploads
pub(crate) fn require_visible(ctx: &AuthContext, media: &Media) -> Result<()> {
    if ctx.is_admin() || media.uploaded_by == Some(ctx.admin_id) {
        return Ok(());
    }

    match media.district_id {
        Some(district) => ctx.require_district(district),
        None => Err(TourifyError::PermissionDenied(
            "Media is outside your assigned districts".to_string()
        )),
    }
}
