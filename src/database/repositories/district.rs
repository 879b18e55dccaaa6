//! District repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};
use chrono::Utc;
use uuid::Uuid;
use crate::models::district::{District, DistrictListQuery};
use crate::models::common::Pagination;
use crate::utils::errors::TourifyError;
use crate::utils::helpers::like_pattern;

#[derive(Clone, Debug)]
pub struct DistrictRepository {
    pool: PgPool,
}

impl DistrictRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a district row as built by the service
    pub async fn create(&self, district: &District) -> Result<District, TourifyError> {
        let district = sqlx::query_as::<_, District>(
            r#"
            INSERT INTO districts (id, name, slug, description, headquarters, header_image, is_featured, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#
        )
        .bind(district.id)
        .bind(&district.name)
        .bind(&district.slug)
        .bind(&district.description)
        .bind(&district.headquarters)
        .bind(&district.header_image)
        .bind(district.is_featured)
        .bind(district.created_at)
        .bind(district.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(district)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<District>, TourifyError> {
        let district = sqlx::query_as::<_, District>("SELECT * FROM districts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(district)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<District>, TourifyError> {
        let district = sqlx::query_as::<_, District>("SELECT * FROM districts WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(district)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, TourifyError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM districts WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }

    /// Ids from `ids` that have no district row
    pub async fn find_missing(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, TourifyError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let found: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM districts WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids
            .iter()
            .filter(|id| !found.iter().any(|(f,)| f == *id))
            .copied()
            .collect())
    }

    /// Write every mutable column of a district
    pub async fn save(&self, district: &District) -> Result<District, TourifyError> {
        let district = sqlx::query_as::<_, District>(
            r#"
            UPDATE districts
            SET name = $2,
                slug = $3,
                description = $4,
                headquarters = $5,
                header_image = $6,
                is_featured = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(district.id)
        .bind(&district.name)
        .bind(&district.slug)
        .bind(&district.description)
        .bind(&district.headquarters)
        .bind(&district.header_image)
        .bind(district.is_featured)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(district)
    }

    /// Delete a district and drop it from every admin's assignments
    pub async fn delete(&self, id: Uuid) -> Result<bool, TourifyError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE admins SET assigned_districts = array_remove(assigned_districts, $1), updated_at = NOW() WHERE $1 = ANY(assigned_districts)"
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM districts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of panchayats referencing the district
    pub async fn count_panchayats(&self, id: Uuid) -> Result<i64, TourifyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM gram_panchayats WHERE district_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// List districts with pagination, alphabetically
    pub async fn list(&self, query: &DistrictListQuery, pagination: Pagination) -> Result<(Vec<District>, i64), TourifyError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM districts WHERE 1 = 1");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM districts WHERE 1 = 1");
        push_filters(&mut select, query);
        select
            .push(" ORDER BY name ASC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let districts = select.build_query_as::<District>().fetch_all(&self.pool).await?;
        Ok((districts, total))
    }

    pub async fn count(&self) -> Result<i64, TourifyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM districts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &DistrictListQuery) {
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        builder.push(" AND name ILIKE ").push_bind(like_pattern(search));
    }
    if let Some(featured) = query.featured {
        builder.push(" AND is_featured = ").push_bind(featured);
    }
}
