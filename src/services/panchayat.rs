//! Gram panchayat service implementation
//!
//! Panchayats are documented by RTC accounts inside their assigned
//! districts and verified by admins. The public sees verified entries only.

use chrono::Utc;
use sqlx::types::Json;
use tracing::{debug, info};
use uuid::Uuid;
use crate::database::repositories::{DistrictRepository, MediaRepository, PanchayatRepository};
use crate::models::common::{Page, Pagination};
use crate::models::media::{Media, MediaStatus};
use crate::models::panchayat::{
    CreatePanchayatRequest, GramPanchayat, NewPanchayat, PanchayatFilter, PanchayatListQuery,
    PanchayatStatus, RtcReport, RtcReportRequest, UpdatePanchayatRequest, UpdatePanchayatStatusRequest,
};
use crate::services::auth::{AuthContext, Scope};
use crate::services::media::require_visible;
use crate::services::{unique_slug, workflow};
use crate::utils::errors::{TourifyError, Result};
use crate::utils::helpers::{dedupe_ids, optional_text, require_text, IdOrSlug};
use crate::utils::logging::{log_admin_action, log_status_change};

const MAX_NAME_LEN: usize = 120;
const MAX_REPORT_LEN: usize = 5000;

#[derive(Clone)]
pub struct PanchayatService {
    panchayats: PanchayatRepository,
    districts: DistrictRepository,
    media: MediaRepository,
}

impl PanchayatService {
    pub fn new(panchayats: PanchayatRepository, districts: DistrictRepository, media: MediaRepository) -> Self {
        Self { panchayats, districts, media }
    }

    /// List the panchayats visible to `viewer`
    pub async fn list(&self, viewer: Option<&AuthContext>, query: PanchayatListQuery) -> Result<Page<GramPanchayat>> {
        let pagination = Pagination::new(query.page, query.limit);
        let scope = Scope::for_viewer(viewer);

        let filter = PanchayatFilter {
            search: query.search,
            district_id: query.district,
            status: if scope.is_public() { Some(PanchayatStatus::Verified) } else { query.status },
            within_districts: scope.within_districts(),
        };

        let (panchayats, total) = self.panchayats.list(&filter, pagination).await?;
        Ok(Page::new(panchayats, total, pagination))
    }

    /// Fetch one panchayat by id or slug, applying visibility rules
    pub async fn get(&self, viewer: Option<&AuthContext>, key: &str) -> Result<GramPanchayat> {
        let panchayat = match IdOrSlug::parse(key) {
            IdOrSlug::Id(id) => self.panchayats.find_by_id(id).await?,
            IdOrSlug::Slug(slug) => self.panchayats.find_by_slug(&slug).await?,
        }
        .ok_or_else(|| TourifyError::not_found("gram panchayat", key))?;

        match viewer {
            None if panchayat.status != PanchayatStatus::Verified => {
                Err(TourifyError::not_found("gram panchayat", key))
            }
            Some(ctx) => {
                ctx.require_district(panchayat.district_id)?;
                Ok(panchayat)
            }
            None => Ok(panchayat),
        }
    }

    pub async fn create(&self, ctx: &AuthContext, request: CreatePanchayatRequest) -> Result<GramPanchayat> {
        ctx.require_district(request.district_id)?;
        self.ensure_district(request.district_id).await?;

        let name = require_text("name", &request.name, MAX_NAME_LEN)?;
        validate_population(request.population)?;
        validate_coordinates(request.latitude, request.longitude)?;
        let gallery = self.resolve_gallery(ctx, request.district_id, &[], request.gallery).await?;
        let status = workflow::initial_panchayat_status(ctx, request.status)?;

        let repo = &self.panchayats;
        let slug = unique_slug(&name, |candidate| async move { repo.slug_exists(&candidate).await }).await?;

        let panchayat = self
            .panchayats
            .create(NewPanchayat {
                name,
                slug,
                district_id: request.district_id,
                block: optional_text(request.block),
                description: optional_text(request.description),
                population: request.population,
                latitude: request.latitude,
                longitude: request.longitude,
                status,
                gallery,
                created_by: ctx.admin_id,
            })
            .await?;

        log_admin_action(ctx.admin_id, "create_panchayat", Some(&panchayat.id.to_string()), Some(status.as_str()));
        Ok(panchayat)
    }

    /// Edit a panchayat. RTC edits of verified entries send them back to review.
    pub async fn update(&self, ctx: &AuthContext, id: Uuid, request: UpdatePanchayatRequest) -> Result<GramPanchayat> {
        let mut panchayat = self.load(id).await?;
        ctx.require_district(panchayat.district_id)?;
        let previous_status = panchayat.status;

        if let Some(district_id) = request.district_id {
            if district_id != panchayat.district_id {
                ctx.require_district(district_id)?;
                self.ensure_district(district_id).await?;
                panchayat.district_id = district_id;
            }
        }

        if let Some(name) = request.name {
            let name = require_text("name", &name, MAX_NAME_LEN)?;
            if name != panchayat.name {
                let repo = &self.panchayats;
                panchayat.slug = unique_slug(&name, |candidate| async move { repo.slug_exists(&candidate).await }).await?;
            }
            panchayat.name = name;
        }
        if let Some(block) = request.block {
            panchayat.block = optional_text(Some(block));
        }
        if let Some(description) = request.description {
            panchayat.description = optional_text(Some(description));
        }
        if request.population.is_some() {
            validate_population(request.population)?;
            panchayat.population = request.population;
        }
        if request.latitude.is_some() || request.longitude.is_some() {
            let latitude = request.latitude.or(panchayat.latitude);
            let longitude = request.longitude.or(panchayat.longitude);
            validate_coordinates(latitude, longitude)?;
            panchayat.latitude = latitude;
            panchayat.longitude = longitude;
        }
        if let Some(gallery) = request.gallery {
            panchayat.gallery = self
                .resolve_gallery(ctx, panchayat.district_id, &panchayat.gallery, gallery)
                .await?;
        }

        panchayat.status = match request.status.filter(|s| *s != previous_status) {
            Some(requested) => workflow::panchayat_status_change(ctx, requested)?,
            None => workflow::panchayat_status_after_edit(ctx, previous_status),
        };

        let panchayat = self.panchayats.save(&panchayat).await?;
        if panchayat.status != previous_status {
            log_status_change("gram_panchayat", id, previous_status.as_str(), panchayat.status.as_str(), ctx.admin_id);
        }
        log_admin_action(ctx.admin_id, "update_panchayat", Some(&id.to_string()), None);
        Ok(panchayat)
    }

    pub async fn set_status(&self, ctx: &AuthContext, id: Uuid, request: UpdatePanchayatStatusRequest) -> Result<GramPanchayat> {
        let panchayat = self.load(id).await?;
        ctx.require_district(panchayat.district_id)?;

        let status = workflow::panchayat_status_change(ctx, request.status)?;
        let updated = self.panchayats.set_status(id, status).await?;

        log_status_change("gram_panchayat", id, panchayat.status.as_str(), status.as_str(), ctx.admin_id);
        Ok(updated)
    }

    /// File or replace the field report
    pub async fn submit_report(&self, ctx: &AuthContext, id: Uuid, request: RtcReportRequest) -> Result<GramPanchayat> {
        let mut panchayat = self.load(id).await?;
        ctx.require_district(panchayat.district_id)?;
        let previous_status = panchayat.status;

        let attractions = request
            .attractions
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        panchayat.rtc_report = Some(Json(RtcReport {
            summary: require_text("summary", &request.summary, MAX_REPORT_LEN)?,
            infrastructure: optional_text(request.infrastructure),
            attractions,
            recommendations: optional_text(request.recommendations),
            submitted_by: Some(ctx.admin_id),
            submitted_at: Some(Utc::now()),
        }));
        panchayat.status = workflow::panchayat_status_after_edit(ctx, previous_status);

        let panchayat = self.panchayats.save(&panchayat).await?;
        if panchayat.status != previous_status {
            log_status_change("gram_panchayat", id, previous_status.as_str(), panchayat.status.as_str(), ctx.admin_id);
        }
        debug!(panchayat_id = %id, "RTC report submitted");
        Ok(panchayat)
    }

    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<()> {
        ctx.require_admin()?;

        if !self.panchayats.delete(id).await? {
            return Err(TourifyError::not_found("gram panchayat", id));
        }

        log_admin_action(ctx.admin_id, "delete_panchayat", Some(&id.to_string()), None);
        info!(panchayat_id = %id, "Gram panchayat deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<GramPanchayat> {
        self.panchayats
            .find_by_id(id)
            .await?
            .ok_or_else(|| TourifyError::not_found("gram panchayat", id))
    }

    async fn ensure_district(&self, district_id: Uuid) -> Result<()> {
        if self.districts.find_by_id(district_id).await?.is_none() {
            return Err(TourifyError::InvalidInput(format!("District {} does not exist", district_id)));
        }
        Ok(())
    }

    /// Validate a gallery for a panchayat in `district_id`. Only ids not
    /// already in `current` are checked.
    async fn resolve_gallery(
        &self,
        ctx: &AuthContext,
        district_id: Uuid,
        current: &[Uuid],
        gallery: Vec<Uuid>,
    ) -> Result<Vec<Uuid>> {
        let gallery = dedupe_ids(gallery);
        let added: Vec<Uuid> = gallery.iter().filter(|id| !current.contains(id)).copied().collect();
        let found = self.media.find_by_ids(&added).await?;

        for id in &added {
            let media = found
                .iter()
                .find(|m| m.id == *id)
                .ok_or_else(|| TourifyError::InvalidInput(format!("Media {} does not exist", id)))?;
            check_gallery_media(ctx, district_id, media)?;
        }

        Ok(gallery)
    }
}

fn check_gallery_media(ctx: &AuthContext, district_id: Uuid, media: &Media) -> Result<()> {
    require_visible(ctx, media)?;

    if media.status == MediaStatus::Rejected {
        return Err(TourifyError::InvalidInput(format!(
            "Media {} was rejected and cannot be shown in a gallery",
            media.id
        )));
    }
    if media.district_id.is_some_and(|d| d != district_id) {
        return Err(TourifyError::InvalidInput(format!(
            "Media {} belongs to another district",
            media.id
        )));
    }
    Ok(())
}

fn validate_population(population: Option<i32>) -> Result<()> {
    match population {
        Some(p) if p < 0 => Err(TourifyError::InvalidInput("Population cannot be negative".to_string())),
        _ => Ok(()),
    }
}

fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<()> {
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(TourifyError::InvalidInput("Latitude must be between -90 and 90".to_string()));
        }
    }
    if let Some(lng) = longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(TourifyError::InvalidInput("Longitude must be between -180 and 180".to_string()));
        }
    }
    Ok(())
}
