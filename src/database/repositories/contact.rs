//! Contact message repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::contact::{Contact, ContactListQuery, ContactStatus, CreateContactRequest};
use crate::models::common::Pagination;
use crate::utils::errors::TourifyError;
use crate::utils::helpers::like_pattern;

#[derive(Clone, Debug)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a validated contact message
    pub async fn create(&self, request: CreateContactRequest) -> Result<Contact, TourifyError> {
        let now = Utc::now();
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (id, name, email, phone, subject, message, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(request.name)
        .bind(request.email)
        .bind(request.phone)
        .bind(request.subject)
        .bind(request.message)
        .bind(ContactStatus::New)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(contact)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Contact>, TourifyError> {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contact)
    }

    /// Update status and resolution timestamp
    pub async fn set_status(&self, id: Uuid, status: ContactStatus, resolved_at: Option<DateTime<Utc>>) -> Result<Contact, TourifyError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET status = $2, resolved_at = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(status)
        .bind(resolved_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(contact)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, TourifyError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List messages, newest first
    pub async fn list(&self, query: &ContactListQuery, pagination: Pagination) -> Result<(Vec<Contact>, i64), TourifyError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contacts WHERE 1 = 1");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM contacts WHERE 1 = 1");
        push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let contacts = select.build_query_as::<Contact>().fetch_all(&self.pool).await?;
        Ok((contacts, total))
    }

    pub async fn count_by_status(&self) -> Result<Vec<(ContactStatus, i64)>, TourifyError> {
        let rows = sqlx::query_as::<_, (ContactStatus, i64)>("SELECT status, COUNT(*) FROM contacts GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ContactListQuery) {
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR subject ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
}
