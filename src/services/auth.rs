//! Authentication service implementation
//!
//! This service handles admin sign-in, session tokens and password changes,
//! and defines the authorization context every other service consults:
//! role-based permissions and district scoping for RTC accounts.

use std::sync::Arc;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::config::settings::AuthConfig;
use crate::database::repositories::AdminRepository;
use crate::middleware::rate_limit::LoginRateLimiter;
use crate::models::admin::{
    AccountStatus, Admin, ChangePasswordRequest, LoginRequest, LoginResponse, NewAdmin, Role,
};
use crate::utils::errors::{TourifyError, Result};
use crate::utils::helpers::normalize_email;
use crate::utils::logging::log_auth_event;

/// Minimum password length for every account
pub const MIN_PASSWORD_LEN: usize = 8;

/// Permission levels for different operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Anonymous visitors of the public site
    Public,
    /// Rural Tourism Coordinator, limited to assigned districts
    Rtc,
    /// Full administrative access
    Admin,
}

impl Permission {
    /// Get permission hierarchy, lowest first
    pub fn hierarchy() -> [Permission; 3] {
        [Permission::Public, Permission::Rtc, Permission::Admin]
    }
}

impl From<Role> for Permission {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Permission::Admin,
            Role::Rtc => Permission::Rtc,
        }
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub admin_id: Uuid,
    pub name: String,
    pub role: Role,
    pub assigned_districts: Vec<Uuid>,
}

/// Row visibility derived from who is asking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Anonymous visitor: only published content
    Public,
    /// RTC account: rows in the assigned districts
    Districts { districts: Vec<Uuid>, admin_id: Uuid },
    /// Admin: everything
    All,
}

impl AuthContext {
    pub fn from_admin(admin: &Admin) -> Self {
        Self {
            admin_id: admin.id,
            name: admin.name.clone(),
            role: admin.role,
            assigned_districts: admin.assigned_districts.clone(),
        }
    }

    pub fn permission(&self) -> Permission {
        self.role.into()
    }

    pub fn has_permission(&self, required: Permission) -> bool {
        AuthService::permission_includes(self.permission(), required)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require the admin role or return error
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(TourifyError::PermissionDenied(
                "This action requires the admin role".to_string()
            ))
        }
    }

    /// Admins reach every district; RTC accounts only their assigned ones
    pub fn can_access_district(&self, district_id: Uuid) -> bool {
        self.is_admin() || self.assigned_districts.contains(&district_id)
    }

    pub fn require_district(&self, district_id: Uuid) -> Result<()> {
        if self.can_access_district(district_id) {
            Ok(())
        } else {
            Err(TourifyError::PermissionDenied(format!(
                "District {} is not assigned to this account",
                district_id
            )))
        }
    }

    pub fn scope(&self) -> Scope {
        match self.role {
            Role::Admin => Scope::All,
            Role::Rtc => Scope::Districts {
                districts: self.assigned_districts.clone(),
                admin_id: self.admin_id,
            },
        }
    }
}

impl Scope {
    pub fn for_viewer(viewer: Option<&AuthContext>) -> Self {
        viewer.map(AuthContext::scope).unwrap_or(Scope::Public)
    }

    /// District restriction to apply to list queries, `None` when unrestricted
    pub fn within_districts(&self) -> Option<Vec<Uuid>> {
        match self {
            Scope::Districts { districts, .. } => Some(districts.clone()),
            Scope::Public | Scope::All => None,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Scope::Public)
    }
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    admins: AdminRepository,
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    login_limiter: Arc<LoginRateLimiter>,
    /// Hash of a random secret, verified against when the email is unknown
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(admins: AdminRepository, config: AuthConfig) -> Result<Self> {
        let login_limiter = Arc::new(LoginRateLimiter::new(config.login_attempts_per_minute)?);
        let dummy_hash: Arc<str> = bcrypt::hash(Uuid::new_v4().to_string(), config.password_cost)?.into();

        Ok(Self {
            admins,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            config,
            login_limiter,
            dummy_hash,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn login_limiter(&self) -> Arc<LoginRateLimiter> {
        Arc::clone(&self.login_limiter)
    }

    /// Check if permission A includes permission B
    pub fn permission_includes(higher: Permission, lower: Permission) -> bool {
        let hierarchy = Permission::hierarchy();
        let higher_level = hierarchy.iter().position(|&p| p == higher).unwrap_or(0);
        let lower_level = hierarchy.iter().position(|&p| p == lower).unwrap_or(0);

        higher_level >= lower_level
    }

    /// Verify credentials and issue a session token
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let email = normalize_email(&request.email);
        self.login_limiter.check(&email)?;

        let invalid = || TourifyError::Authentication("Invalid email or password".to_string());

        let admin = self.admins.find_by_email(&email).await?;
        let valid = self.check_credentials(admin.as_ref(), &request.password).await?;

        let Some(mut admin) = admin else {
            log_auth_event(&email, "login", false, Some("unknown email"));
            return Err(invalid());
        };

        if !valid {
            log_auth_event(&email, "login", false, Some("wrong password"));
            return Err(invalid());
        }

        if admin.status != AccountStatus::Active {
            log_auth_event(&email, "login", false, Some("account inactive"));
            return Err(TourifyError::Authentication("Account is inactive".to_string()));
        }

        self.admins.touch_last_login(admin.id).await?;
        admin.last_login_at = Some(Utc::now());

        let token = self.issue_token(&admin)?;
        log_auth_event(&email, "login", true, None);

        Ok(LoginResponse { token, admin })
    }

    /// Resolve a session token into the caller's current context.
    ///
    /// The account is reloaded on every call, so role changes, deactivation
    /// and district reassignment take effect on the next request.
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext> {
        let claims = self.verify_token(token)?;

        let admin = self
            .admins
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| TourifyError::Authentication("Session is no longer valid".to_string()))?;

        if admin.status != AccountStatus::Active {
            warn!(admin_id = %admin.id, "Rejected token of inactive account");
            return Err(TourifyError::Authentication("Account is inactive".to_string()));
        }

        debug!(admin_id = %admin.id, role = admin.role.as_str(), "Authentication context created");
        Ok(AuthContext::from_admin(&admin))
    }

    /// Load the caller's full profile
    pub async fn current_admin(&self, ctx: &AuthContext) -> Result<Admin> {
        self.admins
            .find_by_id(ctx.admin_id)
            .await?
            .ok_or_else(|| TourifyError::not_found("admin", ctx.admin_id))
    }

    /// Change the caller's own password
    pub async fn change_password(&self, ctx: &AuthContext, request: ChangePasswordRequest) -> Result<()> {
        let mut admin = self.current_admin(ctx).await?;

        if !self.verify_password(&request.current_password, &admin.password_hash).await? {
            log_auth_event(&admin.email, "change_password", false, Some("wrong current password"));
            return Err(TourifyError::Authentication("Current password is incorrect".to_string()));
        }

        validate_password(&request.new_password)?;
        admin.password_hash = self.hash_password(&request.new_password).await?;
        self.admins.save(&admin).await?;

        log_auth_event(&admin.email, "change_password", true, None);
        Ok(())
    }

    /// Create the configured first admin when no account exists yet
    pub async fn bootstrap_admin(&self) -> Result<Option<Admin>> {
        let Some(bootstrap) = self.config.bootstrap_admin.clone() else {
            return Ok(None);
        };

        if self.admins.count().await? > 0 {
            debug!("Admin accounts exist, skipping bootstrap");
            return Ok(None);
        }

        validate_password(&bootstrap.password)?;
        let admin = self
            .admins
            .create(NewAdmin {
                name: bootstrap.name,
                email: normalize_email(&bootstrap.email),
                password_hash: self.hash_password(&bootstrap.password).await?,
                role: Role::Admin,
                status: AccountStatus::Active,
                assigned_districts: vec![],
            })
            .await?;

        info!(admin_id = %admin.id, email = %admin.email, "Bootstrap admin created");
        Ok(Some(admin))
    }

    /// Hash a password with bcrypt off the async runtime
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.config.password_cost;

        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| TourifyError::ServiceUnavailable(format!("Password hashing task failed: {}", e)))??;

        Ok(hash)
    }

    /// Verify `password` for `admin`. Unknown accounts are checked against
    /// the dummy hash so both paths cost one bcrypt verification.
    async fn check_credentials(&self, admin: Option<&Admin>, password: &str) -> Result<bool> {
        match admin {
            Some(admin) => self.verify_password(password, &admin.password_hash).await,
            None => {
                self.verify_password(password, &self.dummy_hash).await?;
                Ok(false)
            }
        }
    }

    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| TourifyError::ServiceUnavailable(format!("Password verification task failed: {}", e)))??;

        Ok(valid)
    }

    /// Sign a session token for an account
    pub fn issue_token(&self, admin: &Admin) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id,
            role: admin.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.token_ttl_hours)).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Check signature and expiry of a session token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                debug!(error = %e, "Rejected session token");
                TourifyError::Authentication("Invalid or expired session".to_string())
            })?;

        Ok(data.claims)
    }

    /// `Set-Cookie` value carrying a fresh session token
    pub fn session_cookie(&self, token: &str) -> String {
        let max_age = self.config.token_ttl_hours * 3600;
        let mut cookie = format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
            self.config.cookie_name, token, max_age
        );
        if self.config.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax",
            self.config.cookie_name
        );
        if self.config.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Reject passwords shorter than the minimum length
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(TourifyError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::config::Settings;
    use crate::database::connection::{create_lazy_pool, PoolConfig};

    fn rtc(districts: Vec<Uuid>) -> AuthContext {
        AuthContext {
            admin_id: Uuid::new_v4(),
            name: "Coordinator".to_string(),
            role: Role::Rtc,
            assigned_districts: districts,
        }
    }

    fn admin_ctx() -> AuthContext {
        AuthContext {
            admin_id: Uuid::new_v4(),
            name: "Admin".to_string(),
            role: Role::Admin,
            assigned_districts: vec![],
        }
    }

    fn test_service() -> AuthService {
        let mut config = Settings::default().auth;
        config.jwt_secret = "k".repeat(32);
        config.password_cost = 4;
        let pool = create_lazy_pool(&PoolConfig {
            url: "postgres://localhost/tourify_unused".to_string(),
            min_connections: 0,
            ..PoolConfig::default()
        })
        .unwrap();
        AuthService::new(AdminRepository::new(pool), config).unwrap()
    }

    fn sample_admin(role: Role) -> Admin {
        Admin {
            id: Uuid::new_v4(),
            name: "Sample".to_string(),
            email: "sample@mp.gov.in".to_string(),
            password_hash: String::new(),
            role,
            status: AccountStatus::Active,
            assigned_districts: vec![],
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unknown_account_costs_a_bcrypt_check() {
        let service = test_service();
        assert!(service.dummy_hash.starts_with("$2b$04$"));

        assert!(!service.check_credentials(None, "anything").await.unwrap());
        assert!(!service.check_credentials(None, &service.dummy_hash.to_string()).await.unwrap());

        let mut admin = sample_admin(Role::Admin);
        admin.password_hash = service.hash_password("Correct-horse-9").await.unwrap();
        assert!(service.check_credentials(Some(&admin), "Correct-horse-9").await.unwrap());
        assert!(!service.check_credentials(Some(&admin), "wrong").await.unwrap());
    }

    #[test]
    fn test_permission_hierarchy() {
        assert!(AuthService::permission_includes(Permission::Admin, Permission::Rtc));
        assert!(AuthService::permission_includes(Permission::Rtc, Permission::Public));
        assert!(AuthService::permission_includes(Permission::Rtc, Permission::Rtc));
        assert!(!AuthService::permission_includes(Permission::Public, Permission::Rtc));
        assert!(!AuthService::permission_includes(Permission::Rtc, Permission::Admin));
    }

    #[test]
    fn test_district_scoping() {
        let bhopal = Uuid::new_v4();
        let indore = Uuid::new_v4();
        let ctx = rtc(vec![bhopal]);

        assert!(ctx.can_access_district(bhopal));
        assert!(!ctx.can_access_district(indore));
        assert_matches!(ctx.require_district(indore), Err(TourifyError::PermissionDenied(_)));
        assert_matches!(ctx.require_admin(), Err(TourifyError::PermissionDenied(_)));

        let admin = admin_ctx();
        assert!(admin.can_access_district(indore));
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn test_scope_for_viewer() {
        let district = Uuid::new_v4();
        let ctx = rtc(vec![district]);

        assert_eq!(Scope::for_viewer(None), Scope::Public);
        assert_eq!(Scope::for_viewer(Some(&admin_ctx())), Scope::All);
        assert_eq!(Scope::for_viewer(Some(&ctx)).within_districts(), Some(vec![district]));
        assert_eq!(Scope::All.within_districts(), None);
    }

    #[test]
    fn test_rtc_without_districts_sees_nothing_scoped() {
        let ctx = rtc(vec![]);
        assert_eq!(ctx.scope().within_districts(), Some(vec![]));
        assert!(!ctx.can_access_district(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let service = test_service();
        let admin = sample_admin(Role::Rtc);

        let token = service.issue_token(&admin).unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.role, Role::Rtc);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let service = test_service();
        let token = service.issue_token(&sample_admin(Role::Admin)).unwrap();

        let mut other = Settings::default().auth;
        other.jwt_secret = "z".repeat(32);
        let foreign = AuthService::new(service.admins.clone(), other).unwrap();

        assert_matches!(foreign.verify_token(&token), Err(TourifyError::Authentication(_)));
        assert_matches!(service.verify_token("not.a.token"), Err(TourifyError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let service = test_service();
        let hash = service.hash_password("correct horse").await.unwrap();

        assert!(service.verify_password("correct horse", &hash).await.unwrap());
        assert!(!service.verify_password("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_session_cookie() {
        let mut service = test_service();
        assert_eq!(
            service.session_cookie("abc"),
            "token=abc; HttpOnly; Path=/; Max-Age=86400; SameSite=Lax"
        );

        service.config.secure_cookie = true;
        assert!(service.clear_cookie().ends_with("Max-Age=0; SameSite=Lax; Secure"));
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345678").is_ok());
        assert_matches!(validate_password("1234567"), Err(TourifyError::InvalidInput(_)));
    }
}
