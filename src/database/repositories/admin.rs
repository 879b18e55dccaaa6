//! Admin repository implementation

use sqlx::{Executor, PgPool, Postgres, QueryBuilder, Transaction};
use chrono::Utc;
use uuid::Uuid;
use crate::models::admin::{Admin, NewAdmin, AccountStatus, AdminListQuery, Role};
use crate::models::common::Pagination;
use crate::utils::errors::TourifyError;
use crate::utils::helpers::like_pattern;

#[derive(Clone, Debug)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new admin account
    pub async fn create(&self, admin: NewAdmin) -> Result<Admin, TourifyError> {
        let now = Utc::now();
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (id, name, email, password_hash, role, status, assigned_districts, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(admin.name)
        .bind(admin.email)
        .bind(admin.password_hash)
        .bind(admin.role)
        .bind(admin.status)
        .bind(admin.assigned_districts)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Find admin by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, TourifyError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(admin)
    }

    /// Find admin by normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, TourifyError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(admin)
    }

    /// Write every mutable column of an admin
    pub async fn save(&self, admin: &Admin) -> Result<Admin, TourifyError> {
        write_admin(&self.pool, admin).await
    }

    /// Save `admin` unless that would leave no active admin.
    /// Returns `None` without writing when it would.
    pub async fn save_keeping_an_admin(&self, admin: &Admin) -> Result<Option<Admin>, TourifyError> {
        let mut tx = self.pool.begin().await?;

        let stays_admin = admin.role == Role::Admin && admin.status == AccountStatus::Active;
        if !stays_admin && is_last_active_admin(&mut tx, admin.id).await? {
            return Ok(None);
        }

        let saved = write_admin(&mut *tx, admin).await?;
        tx.commit().await?;
        Ok(Some(saved))
    }

    /// Record a successful login
    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), TourifyError> {
        sqlx::query("UPDATE admins SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete admin unless it is the last active admin.
    /// Returns `None` without deleting in that case.
    pub async fn delete_keeping_an_admin(&self, id: Uuid) -> Result<Option<bool>, TourifyError> {
        let mut tx = self.pool.begin().await?;

        if is_last_active_admin(&mut tx, id).await? {
            return Ok(None);
        }

        let result = sqlx::query("DELETE FROM admins WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(result.rows_affected() > 0))
    }

    /// List admins with filters and pagination
    pub async fn list(&self, query: &AdminListQuery, pagination: Pagination) -> Result<(Vec<Admin>, i64), TourifyError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM admins WHERE 1 = 1");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM admins WHERE 1 = 1");
        push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let admins = select.build_query_as::<Admin>().fetch_all(&self.pool).await?;
        Ok((admins, total))
    }

    /// Total number of accounts
    pub async fn count(&self) -> Result<i64, TourifyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

async fn write_admin<'e, E>(executor: E, admin: &Admin) -> Result<Admin, TourifyError>
where
    E: Executor<'e, Database = Postgres>,
{
    let admin = sqlx::query_as::<_, Admin>(
        r#"
        UPDATE admins
        SET name = $2,
            email = $3,
            password_hash = $4,
            role = $5,
            status = $6,
            assigned_districts = $7,
            updated_at = $8
        WHERE id = $1
        RETURNING *
        "#
    )
    .bind(admin.id)
    .bind(&admin.name)
    .bind(&admin.email)
    .bind(&admin.password_hash)
    .bind(admin.role)
    .bind(admin.status)
    .bind(&admin.assigned_districts)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(admin)
}

/// Lock every active admin row, then report whether `id` is the only one.
/// Concurrent removals queue on the lock and see each other's writes.
async fn is_last_active_admin(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<bool, TourifyError> {
    let active: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM admins WHERE role = $1 AND status = $2 FOR UPDATE"
    )
    .bind(Role::Admin)
    .bind(AccountStatus::Active)
    .fetch_all(&mut **tx)
    .await?;

    Ok(matches!(active.as_slice(), [(only,)] if *only == id))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &AdminListQuery) {
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role) = query.role {
        builder.push(" AND role = ").push_bind(role);
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
}
