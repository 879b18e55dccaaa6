//! Gram panchayat repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use chrono::Utc;
use uuid::Uuid;
use crate::models::panchayat::{GramPanchayat, NewPanchayat, PanchayatFilter, PanchayatStatus};
use crate::models::common::Pagination;
use crate::utils::errors::TourifyError;
use crate::utils::helpers::like_pattern;

#[derive(Clone, Debug)]
pub struct PanchayatRepository {
    pool: PgPool,
}

impl PanchayatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new panchayat and link its gallery media to it
    pub async fn create(&self, panchayat: NewPanchayat) -> Result<GramPanchayat, TourifyError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let panchayat = sqlx::query_as::<_, GramPanchayat>(
            r#"
            INSERT INTO gram_panchayats (id, name, slug, district_id, block, description, population, latitude, longitude, status, gallery, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(panchayat.name)
        .bind(panchayat.slug)
        .bind(panchayat.district_id)
        .bind(panchayat.block)
        .bind(panchayat.description)
        .bind(panchayat.population)
        .bind(panchayat.latitude)
        .bind(panchayat.longitude)
        .bind(panchayat.status)
        .bind(panchayat.gallery)
        .bind(panchayat.created_by)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sync_gallery(&mut tx, &panchayat).await?;
        tx.commit().await?;
        Ok(panchayat)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GramPanchayat>, TourifyError> {
        let panchayat = sqlx::query_as::<_, GramPanchayat>("SELECT * FROM gram_panchayats WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(panchayat)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<GramPanchayat>, TourifyError> {
        let panchayat = sqlx::query_as::<_, GramPanchayat>("SELECT * FROM gram_panchayats WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(panchayat)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, TourifyError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM gram_panchayats WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }

    /// Write every mutable column of a panchayat and bring the media links in line with its gallery
    pub async fn save(&self, panchayat: &GramPanchayat) -> Result<GramPanchayat, TourifyError> {
        let mut tx = self.pool.begin().await?;

        let saved = sqlx::query_as::<_, GramPanchayat>(
            r#"
            UPDATE gram_panchayats
            SET name = $2,
                slug = $3,
                district_id = $4,
                block = $5,
                description = $6,
                population = $7,
                latitude = $8,
                longitude = $9,
                status = $10,
                gallery = $11,
                rtc_report = $12,
                updated_at = $13
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(panchayat.id)
        .bind(&panchayat.name)
        .bind(&panchayat.slug)
        .bind(panchayat.district_id)
        .bind(&panchayat.block)
        .bind(&panchayat.description)
        .bind(panchayat.population)
        .bind(panchayat.latitude)
        .bind(panchayat.longitude)
        .bind(panchayat.status)
        .bind(&panchayat.gallery)
        .bind(&panchayat.rtc_report)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sync_gallery(&mut tx, &saved).await?;
        tx.commit().await?;
        Ok(saved)
    }

    /// Update only the workflow status
    pub async fn set_status(&self, id: Uuid, status: PanchayatStatus) -> Result<GramPanchayat, TourifyError> {
        let panchayat = sqlx::query_as::<_, GramPanchayat>(
            "UPDATE gram_panchayats SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(panchayat)
    }

    /// Delete panchayat; its media are detached by the foreign key
    pub async fn delete(&self, id: Uuid) -> Result<bool, TourifyError> {
        let result = sqlx::query("DELETE FROM gram_panchayats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List panchayats with filters and pagination
    pub async fn list(&self, filter: &PanchayatFilter, pagination: Pagination) -> Result<(Vec<GramPanchayat>, i64), TourifyError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM gram_panchayats WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM gram_panchayats WHERE 1 = 1");
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let panchayats = select.build_query_as::<GramPanchayat>().fetch_all(&self.pool).await?;
        Ok((panchayats, total))
    }

    /// Count panchayats per status, optionally limited to some districts
    pub async fn count_by_status(&self, within_districts: Option<&[Uuid]>) -> Result<Vec<(PanchayatStatus, i64)>, TourifyError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT status, COUNT(*) FROM gram_panchayats");
        if let Some(districts) = within_districts {
            builder.push(" WHERE district_id = ANY(").push_bind(districts.to_vec()).push(")");
        }
        builder.push(" GROUP BY status");

        let rows = builder
            .build_query_as::<(PanchayatStatus, i64)>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

/// Make `media.gram_panchayat_id` agree with `panchayat.gallery`: media
/// dropped from the gallery are detached, gallery media are taken out of
/// other galleries and follow the panchayat's district.
async fn sync_gallery(tx: &mut Transaction<'_, Postgres>, panchayat: &GramPanchayat) -> Result<(), TourifyError> {
    sqlx::query(
        r#"
        UPDATE media
        SET gram_panchayat_id = NULL, updated_at = NOW()
        WHERE gram_panchayat_id = $1 AND NOT (id = ANY($2))
        "#
    )
    .bind(panchayat.id)
    .bind(&panchayat.gallery)
    .execute(&mut **tx)
    .await?;

    if panchayat.gallery.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        UPDATE gram_panchayats
        SET gallery = ARRAY(
                SELECT g.media_id FROM unnest(gallery) WITH ORDINALITY AS g(media_id, position)
                WHERE NOT (g.media_id = ANY($2))
                ORDER BY g.position
            ),
            updated_at = NOW()
        WHERE id <> $1 AND gallery && $2
        "#
    )
    .bind(panchayat.id)
    .bind(&panchayat.gallery)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE media
        SET gram_panchayat_id = $1, district_id = $3, updated_at = NOW()
        WHERE id = ANY($2)
          AND (gram_panchayat_id IS DISTINCT FROM $1 OR district_id IS DISTINCT FROM $3)
        "#
    )
    .bind(panchayat.id)
    .bind(&panchayat.gallery)
    .bind(panchayat.district_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &PanchayatFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR block ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(district_id) = filter.district_id {
        builder.push(" AND district_id = ").push_bind(district_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(ref districts) = filter.within_districts {
        builder.push(" AND district_id = ANY(").push_bind(districts.clone()).push(")");
    }
}
