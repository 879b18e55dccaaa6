//! District service implementation
//!
//! Districts are public reference data. Only admins create, edit or delete
//! them, and a district still holding panchayats cannot be deleted.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use crate::database::repositories::DistrictRepository;
use crate::models::common::{Page, Pagination};
use crate::models::district::{CreateDistrictRequest, District, DistrictListQuery, UpdateDistrictRequest};
use crate::services::auth::AuthContext;
use crate::services::unique_slug;
use crate::utils::errors::{TourifyError, Result};
use crate::utils::helpers::{optional_text, require_text, validate_url, IdOrSlug};
use crate::utils::logging::log_admin_action;

const MAX_NAME_LEN: usize = 120;

#[derive(Clone)]
pub struct DistrictService {
    districts: DistrictRepository,
}

impl DistrictService {
    pub fn new(districts: DistrictRepository) -> Self {
        Self { districts }
    }

    pub async fn list(&self, query: DistrictListQuery) -> Result<Page<District>> {
        let pagination = Pagination::new(query.page, query.limit);
        let (districts, total) = self.districts.list(&query, pagination).await?;
        Ok(Page::new(districts, total, pagination))
    }

    /// Look a district up by id or slug
    pub async fn get(&self, key: &str) -> Result<District> {
        let district = match IdOrSlug::parse(key) {
            IdOrSlug::Id(id) => self.districts.find_by_id(id).await?,
            IdOrSlug::Slug(slug) => self.districts.find_by_slug(&slug).await?,
        };

        district.ok_or_else(|| TourifyError::not_found("district", key))
    }

    pub async fn create(&self, ctx: &AuthContext, request: CreateDistrictRequest) -> Result<District> {
        ctx.require_admin()?;

        let name = require_text("name", &request.name, MAX_NAME_LEN)?;
        let header_image = optional_text(request.header_image);
        if let Some(ref url) = header_image {
            validate_url("headerImage", url)?;
        }

        let repo = &self.districts;
        let slug = unique_slug(&name, |candidate| async move { repo.slug_exists(&candidate).await }).await?;

        let now = Utc::now();
        let district = self
            .districts
            .create(&District {
                id: Uuid::new_v4(),
                name,
                slug,
                description: optional_text(request.description),
                headquarters: optional_text(request.headquarters),
                header_image,
                is_featured: request.is_featured,
                created_at: now,
                updated_at: now,
            })
            .await?;

        log_admin_action(ctx.admin_id, "create_district", Some(&district.slug), None);
        Ok(district)
    }

    pub async fn update(&self, ctx: &AuthContext, id: Uuid, request: UpdateDistrictRequest) -> Result<District> {
        ctx.require_admin()?;
        let mut district = self.load(id).await?;

        if let Some(name) = request.name {
            let name = require_text("name", &name, MAX_NAME_LEN)?;
            if name != district.name {
                let repo = &self.districts;
                district.slug = unique_slug(&name, |candidate| async move { repo.slug_exists(&candidate).await }).await?;
            }
            district.name = name;
        }
        if let Some(description) = request.description {
            district.description = optional_text(Some(description));
        }
        if let Some(headquarters) = request.headquarters {
            district.headquarters = optional_text(Some(headquarters));
        }
        if let Some(header_image) = request.header_image {
            district.header_image = optional_text(Some(header_image));
            if let Some(ref url) = district.header_image {
                validate_url("headerImage", url)?;
            }
        }
        if let Some(is_featured) = request.is_featured {
            district.is_featured = is_featured;
        }

        let district = self.districts.save(&district).await?;
        log_admin_action(ctx.admin_id, "update_district", Some(&district.slug), None);
        Ok(district)
    }

    /// Delete a district that no panchayat references any more
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<()> {
        ctx.require_admin()?;
        let district = self.load(id).await?;

        let panchayats = self.districts.count_panchayats(id).await?;
        if panchayats > 0 {
            return Err(TourifyError::Conflict(format!(
                "District {} still has {} gram panchayats",
                district.name, panchayats
            )));
        }

        self.districts.delete(id).await?;
        log_admin_action(ctx.admin_id, "delete_district", Some(&district.slug), None);
        info!(district_id = %id, "District deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<District> {
        self.districts
            .find_by_id(id)
            .await?
            .ok_or_else(|| TourifyError::not_found("district", id))
    }
}
