//! Media repository implementation
//!
//! Media rows are linked to panchayat galleries both ways: the media row
//! carries `gram_panchayat_id`, the panchayat carries the id in `gallery`.
//! Every write that changes the link keeps both sides in one transaction.

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use chrono::Utc;
use uuid::Uuid;
use crate::models::media::{Media, NewMedia, MediaFilter, MediaStatus};
use crate::models::common::Pagination;
use crate::utils::errors::TourifyError;
use crate::utils::helpers::like_pattern;

#[derive(Clone, Debug)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a media row and append it to its panchayat's gallery
    pub async fn create(&self, media: NewMedia) -> Result<Media, TourifyError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let media = sqlx::query_as::<_, Media>(
            r#"
            INSERT INTO media (id, title, description, file_url, file_type, district_id, gram_panchayat_id, tags, status, uploaded_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(media.title)
        .bind(media.description)
        .bind(media.file_url)
        .bind(media.file_type)
        .bind(media.district_id)
        .bind(media.gram_panchayat_id)
        .bind(media.tags)
        .bind(media.status)
        .bind(media.uploaded_by)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(panchayat_id) = media.gram_panchayat_id {
            add_to_gallery(&mut tx, panchayat_id, media.id).await?;
        }

        tx.commit().await?;
        Ok(media)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Media>, TourifyError> {
        let media = sqlx::query_as::<_, Media>("SELECT * FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(media)
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Media>, TourifyError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let media = sqlx::query_as::<_, Media>("SELECT * FROM media WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(media)
    }

    /// Write every mutable column, moving the gallery link if the panchayat changed
    pub async fn save(&self, media: &Media, previous_panchayat: Option<Uuid>) -> Result<Media, TourifyError> {
        let mut tx = self.pool.begin().await?;

        let saved = sqlx::query_as::<_, Media>(
            r#"
            UPDATE media
            SET title = $2,
                description = $3,
                file_url = $4,
                file_type = $5,
                district_id = $6,
                gram_panchayat_id = $7,
                tags = $8,
                status = $9,
                updated_at = $10
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(media.id)
        .bind(&media.title)
        .bind(&media.description)
        .bind(&media.file_url)
        .bind(media.file_type)
        .bind(media.district_id)
        .bind(media.gram_panchayat_id)
        .bind(&media.tags)
        .bind(media.status)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        if previous_panchayat != saved.gram_panchayat_id {
            if let Some(old) = previous_panchayat {
                remove_from_gallery(&mut tx, Some(old), saved.id).await?;
            }
            if let Some(new) = saved.gram_panchayat_id {
                add_to_gallery(&mut tx, new, saved.id).await?;
            }
        }

        tx.commit().await?;
        Ok(saved)
    }

    /// Update only the moderation status
    pub async fn set_status(&self, id: Uuid, status: MediaStatus) -> Result<Media, TourifyError> {
        let media = sqlx::query_as::<_, Media>(
            "UPDATE media SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(media)
    }

    /// Delete media and strip its id from every gallery
    pub async fn delete(&self, id: Uuid) -> Result<bool, TourifyError> {
        let mut tx = self.pool.begin().await?;

        remove_from_gallery(&mut tx, None, id).await?;

        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// List media with filters and pagination
    pub async fn list(&self, filter: &MediaFilter, pagination: Pagination) -> Result<(Vec<Media>, i64), TourifyError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM media WHERE 1 = 1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM media WHERE 1 = 1");
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let media = select.build_query_as::<Media>().fetch_all(&self.pool).await?;
        Ok((media, total))
    }

    /// Count media per status, optionally limited to some districts
    pub async fn count_by_status(&self, within_districts: Option<&[Uuid]>) -> Result<Vec<(MediaStatus, i64)>, TourifyError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT status, COUNT(*) FROM media");
        if let Some(districts) = within_districts {
            builder.push(" WHERE district_id = ANY(").push_bind(districts.to_vec()).push(")");
        }
        builder.push(" GROUP BY status");

        let rows = builder
            .build_query_as::<(MediaStatus, i64)>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

async fn add_to_gallery(tx: &mut Transaction<'_, Postgres>, panchayat_id: Uuid, media_id: Uuid) -> Result<(), TourifyError> {
    sqlx::query(
        r#"
        UPDATE gram_panchayats
        SET gallery = array_append(gallery, $2), updated_at = NOW()
        WHERE id = $1 AND NOT ($2 = ANY(gallery))
        "#
    )
    .bind(panchayat_id)
    .bind(media_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Remove a media id from one panchayat's gallery, or from all of them when `panchayat_id` is `None`
async fn remove_from_gallery(tx: &mut Transaction<'_, Postgres>, panchayat_id: Option<Uuid>, media_id: Uuid) -> Result<(), TourifyError> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "UPDATE gram_panchayats SET gallery = array_remove(gallery, "
    );
    builder
        .push_bind(media_id)
        .push("), updated_at = NOW() WHERE ")
        .push_bind(media_id)
        .push(" = ANY(gallery)");
    if let Some(id) = panchayat_id {
        builder.push(" AND id = ").push_bind(id);
    }

    builder.build().execute(&mut **tx).await?;
    Ok(())
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &MediaFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        builder.push(" AND title ILIKE ").push_bind(like_pattern(search));
    }
    if let Some(district_id) = filter.district_id {
        builder.push(" AND district_id = ").push_bind(district_id);
    }
    if let Some(panchayat_id) = filter.gram_panchayat_id {
        builder.push(" AND gram_panchayat_id = ").push_bind(panchayat_id);
    }
    if let Some(file_type) = filter.file_type {
        builder.push(" AND file_type = ").push_bind(file_type);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(ref districts) = filter.within_districts {
        builder.push(" AND (district_id = ANY(").push_bind(districts.clone()).push(")");
        if let Some(uploader) = filter.or_uploaded_by {
            builder.push(" OR uploaded_by = ").push_bind(uploader);
        }
        builder.push(")");
    }
}
