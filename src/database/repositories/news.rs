//! News repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};
use chrono::Utc;
use uuid::Uuid;
use crate::models::news::{News, NewNews, NewsStatus};
use crate::models::common::Pagination;
use crate::utils::errors::TourifyError;
use crate::utils::helpers::like_pattern;

#[derive(Clone, Debug)]
pub struct NewsRepository {
    pool: PgPool,
}

impl NewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a news article
    pub async fn create(&self, news: NewNews) -> Result<News, TourifyError> {
        let now = Utc::now();
        let news = sqlx::query_as::<_, News>(
            r#"
            INSERT INTO news (id, title, slug, summary, content, cover_image, tags, status, published_at, author_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(news.title)
        .bind(news.slug)
        .bind(news.summary)
        .bind(news.content)
        .bind(news.cover_image)
        .bind(news.tags)
        .bind(news.status)
        .bind(news.published_at)
        .bind(news.author_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(news)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<News>, TourifyError> {
        let news = sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(news)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<News>, TourifyError> {
        let news = sqlx::query_as::<_, News>("SELECT * FROM news WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(news)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, TourifyError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM news WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }

    /// Write every mutable column of an article
    pub async fn save(&self, news: &News) -> Result<News, TourifyError> {
        let news = sqlx::query_as::<_, News>(
            r#"
            UPDATE news
            SET title = $2,
                slug = $3,
                summary = $4,
                content = $5,
                cover_image = $6,
                tags = $7,
                status = $8,
                published_at = $9,
                updated_at = $10
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(news.id)
        .bind(&news.title)
        .bind(&news.slug)
        .bind(&news.summary)
        .bind(&news.content)
        .bind(&news.cover_image)
        .bind(&news.tags)
        .bind(news.status)
        .bind(news.published_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(news)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, TourifyError> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List articles, newest publication first
    pub async fn list(&self, search: Option<&str>, status: Option<NewsStatus>, pagination: Pagination) -> Result<(Vec<News>, i64), TourifyError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM news WHERE 1 = 1");
        push_filters(&mut count, search, status);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM news WHERE 1 = 1");
        push_filters(&mut select, search, status);
        select
            .push(" ORDER BY COALESCE(published_at, created_at) DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let news = select.build_query_as::<News>().fetch_all(&self.pool).await?;
        Ok((news, total))
    }

    pub async fn count_by_status(&self) -> Result<Vec<(NewsStatus, i64)>, TourifyError> {
        let rows = sqlx::query_as::<_, (NewsStatus, i64)>("SELECT status, COUNT(*) FROM news GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&str>, status: Option<NewsStatus>) {
    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        builder.push(" AND title ILIKE ").push_bind(like_pattern(search));
    }
    if let Some(status) = status {
        builder.push(" AND status = ").push_bind(status);
    }
}
