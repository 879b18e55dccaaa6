//! Admin account management service
//!
//! Only admins manage accounts. Two guards keep the panel reachable: an
//! admin cannot lock themself out, and the last active admin can be
//! neither removed, deactivated nor demoted.

use tracing::{debug, info};
use uuid::Uuid;
use crate::database::repositories::{AdminRepository, DistrictRepository};
use crate::models::admin::{
    AccountStatus, Admin, AdminListQuery, CreateAdminRequest, NewAdmin, Role, UpdateAdminRequest,
    UpdateAdminStatusRequest,
};
use crate::models::common::{Page, Pagination};
use crate::services::auth::{validate_password, AuthContext, AuthService};
use crate::utils::errors::{TourifyError, Result};
use crate::utils::helpers::{dedupe_ids, is_valid_email, normalize_email, require_text};
use crate::utils::logging::{log_admin_action, log_status_change};

const MAX_NAME_LEN: usize = 120;

/// Admin service for managing accounts
#[derive(Clone)]
pub struct AdminService {
    admins: AdminRepository,
    districts: DistrictRepository,
    auth: AuthService,
}

impl AdminService {
    /// Create a new AdminService instance
    pub fn new(admins: AdminRepository, districts: DistrictRepository, auth: AuthService) -> Self {
        Self { admins, districts, auth }
    }

    pub async fn list(&self, ctx: &AuthContext, query: AdminListQuery) -> Result<Page<Admin>> {
        ctx.require_admin()?;

        let pagination = Pagination::new(query.page, query.limit);
        let (admins, total) = self.admins.list(&query, pagination).await?;
        Ok(Page::new(admins, total, pagination))
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<Admin> {
        ctx.require_admin()?;
        self.load(id).await
    }

    /// Create a new account
    pub async fn create(&self, ctx: &AuthContext, request: CreateAdminRequest) -> Result<Admin> {
        ctx.require_admin()?;
        debug!(actor = %ctx.admin_id, "Creating admin account");

        let name = require_text("name", &request.name, MAX_NAME_LEN)?;
        let email = self.validate_new_email(&request.email, None).await?;
        validate_password(&request.password)?;

        let role = request.role.unwrap_or(Role::Rtc);
        let assigned_districts = self.resolve_assignments(role, request.assigned_districts).await?;

        let admin = self
            .admins
            .create(NewAdmin {
                name,
                email,
                password_hash: self.auth.hash_password(&request.password).await?,
                role,
                status: AccountStatus::Active,
                assigned_districts,
            })
            .await?;

        log_admin_action(ctx.admin_id, "create_admin", Some(&admin.id.to_string()), Some(admin.role.as_str()));
        Ok(admin)
    }

    /// Update profile, role, password or district assignments
    pub async fn update(&self, ctx: &AuthContext, id: Uuid, request: UpdateAdminRequest) -> Result<Admin> {
        ctx.require_admin()?;
        let mut admin = self.load(id).await?;

        if let Some(name) = request.name {
            admin.name = require_text("name", &name, MAX_NAME_LEN)?;
        }

        if let Some(email) = request.email {
            admin.email = self.validate_new_email(&email, Some(admin.id)).await?;
        }

        if let Some(password) = request.password {
            validate_password(&password)?;
            admin.password_hash = self.auth.hash_password(&password).await?;
        }

        if let Some(role) = request.role {
            if role != admin.role && admin.role == Role::Admin {
                guard_self(ctx, &admin, "demote")?;
            }
            admin.role = role;
        }

        let requested = request
            .assigned_districts
            .unwrap_or_else(|| admin.assigned_districts.clone());
        admin.assigned_districts = self.resolve_assignments(admin.role, requested).await?;

        let admin = self
            .admins
            .save_keeping_an_admin(&admin)
            .await?
            .ok_or_else(|| last_admin_conflict("demote"))?;
        log_admin_action(ctx.admin_id, "update_admin", Some(&admin.id.to_string()), None);
        Ok(admin)
    }

    /// Activate or deactivate an account
    pub async fn set_status(&self, ctx: &AuthContext, id: Uuid, request: UpdateAdminStatusRequest) -> Result<Admin> {
        ctx.require_admin()?;
        let mut admin = self.load(id).await?;

        if request.status == AccountStatus::Inactive && admin.status == AccountStatus::Active {
            guard_self(ctx, &admin, "deactivate")?;
        }

        let previous = admin.status;
        admin.status = request.status;
        let admin = self
            .admins
            .save_keeping_an_admin(&admin)
            .await?
            .ok_or_else(|| last_admin_conflict("deactivate"))?;

        log_status_change(
            "admin",
            admin.id,
            previous.as_str(),
            admin.status.as_str(),
            ctx.admin_id,
        );
        Ok(admin)
    }

    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<()> {
        ctx.require_admin()?;
        let admin = self.load(id).await?;

        guard_self(ctx, &admin, "delete")?;

        self.admins
            .delete_keeping_an_admin(id)
            .await?
            .ok_or_else(|| last_admin_conflict("delete"))?;
        log_admin_action(ctx.admin_id, "delete_admin", Some(&id.to_string()), Some(&admin.email));
        info!(admin_id = %id, "Admin account deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Admin> {
        self.admins
            .find_by_id(id)
            .await?
            .ok_or_else(|| TourifyError::not_found("admin", id))
    }

    async fn validate_new_email(&self, email: &str, current: Option<Uuid>) -> Result<String> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(TourifyError::InvalidInput("A valid email is required".to_string()));
        }

        if let Some(existing) = self.admins.find_by_email(&email).await? {
            if Some(existing.id) != current {
                return Err(TourifyError::Conflict(format!("Email {} is already in use", email)));
            }
        }

        Ok(email)
    }

    /// Admins carry no assignments; RTC assignments must name existing districts
    async fn resolve_assignments(&self, role: Role, districts: Vec<Uuid>) -> Result<Vec<Uuid>> {
        if role == Role::Admin {
            return Ok(vec![]);
        }

        let districts = dedupe_ids(districts);
        let missing = self.districts.find_missing(&districts).await?;
        if let Some(id) = missing.first() {
            return Err(TourifyError::InvalidInput(format!("District {} does not exist", id)));
        }

        Ok(districts)
    }
}

/// An admin cannot lock themself out
fn guard_self(ctx: &AuthContext, target: &Admin, action: &str) -> Result<()> {
    if target.id == ctx.admin_id {
        return Err(TourifyError::PermissionDenied(format!(
            "You cannot {} your own account",
            action
        )));
    }
    Ok(())
}

fn last_admin_conflict(action: &str) -> TourifyError {
    TourifyError::Conflict(format!("Cannot {} the last active admin", action))
}
