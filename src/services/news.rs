//! News service implementation

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use crate::database::repositories::NewsRepository;
use crate::models::common::{Page, Pagination};
use crate::models::news::{
    CreateNewsRequest, NewNews, News, NewsListQuery, NewsStatus, UpdateNewsRequest, UpdateNewsStatusRequest,
};
use crate::services::auth::AuthContext;
use crate::services::{unique_slug, workflow};
use crate::utils::errors::{TourifyError, Result};
use crate::utils::helpers::{normalize_tags, optional_text, require_text, validate_url, IdOrSlug};
use crate::utils::logging::{log_admin_action, log_status_change};

const MAX_TITLE_LEN: usize = 200;
const MAX_SUMMARY_LEN: usize = 500;
const MAX_CONTENT_LEN: usize = 50_000;

#[derive(Clone)]
pub struct NewsService {
    news: NewsRepository,
}

impl NewsService {
    pub fn new(news: NewsRepository) -> Self {
        Self { news }
    }

    /// Admins list every article; everyone else sees published ones only
    pub async fn list(&self, viewer: Option<&AuthContext>, query: NewsListQuery) -> Result<Page<News>> {
        let pagination = Pagination::new(query.page, query.limit);
        let status = match viewer {
            Some(ctx) if ctx.is_admin() => query.status,
            _ => Some(NewsStatus::Published),
        };

        let (news, total) = self.news.list(query.search.as_deref(), status, pagination).await?;
        Ok(Page::new(news, total, pagination))
    }

    pub async fn get(&self, viewer: Option<&AuthContext>, key: &str) -> Result<News> {
        let news = match IdOrSlug::parse(key) {
            IdOrSlug::Id(id) => self.news.find_by_id(id).await?,
            IdOrSlug::Slug(slug) => self.news.find_by_slug(&slug).await?,
        }
        .ok_or_else(|| TourifyError::not_found("news", key))?;

        let is_admin = viewer.map(AuthContext::is_admin).unwrap_or(false);
        if !is_admin && news.status != NewsStatus::Published {
            return Err(TourifyError::not_found("news", key));
        }

        Ok(news)
    }

    pub async fn create(&self, ctx: &AuthContext, request: CreateNewsRequest) -> Result<News> {
        ctx.require_admin()?;

        let title = require_text("title", &request.title, MAX_TITLE_LEN)?;
        let content = require_text("content", &request.content, MAX_CONTENT_LEN)?;
        let summary = validate_summary(request.summary)?;
        let cover_image = optional_text(request.cover_image);
        if let Some(ref url) = cover_image {
            validate_url("coverImage", url)?;
        }

        let repo = &self.news;
        let slug = unique_slug(&title, |candidate| async move { repo.slug_exists(&candidate).await }).await?;

        let status = request.status.unwrap_or(NewsStatus::Draft);
        let news = self
            .news
            .create(NewNews {
                title,
                slug,
                summary,
                content,
                cover_image,
                tags: normalize_tags(request.tags),
                status,
                published_at: workflow::news_published_at(status, None, Utc::now()),
                author_id: ctx.admin_id,
            })
            .await?;

        log_admin_action(ctx.admin_id, "create_news", Some(&news.slug), Some(status.as_str()));
        Ok(news)
    }

    pub async fn update(&self, ctx: &AuthContext, id: Uuid, request: UpdateNewsRequest) -> Result<News> {
        ctx.require_admin()?;
        let mut news = self.load(id).await?;

        if let Some(title) = request.title {
            let title = require_text("title", &title, MAX_TITLE_LEN)?;
            if title != news.title {
                let repo = &self.news;
                news.slug = unique_slug(&title, |candidate| async move { repo.slug_exists(&candidate).await }).await?;
            }
            news.title = title;
        }
        if let Some(content) = request.content {
            news.content = require_text("content", &content, MAX_CONTENT_LEN)?;
        }
        if request.summary.is_some() {
            news.summary = validate_summary(request.summary)?;
        }
        if let Some(cover_image) = request.cover_image {
            news.cover_image = optional_text(Some(cover_image));
            if let Some(ref url) = news.cover_image {
                validate_url("coverImage", url)?;
            }
        }
        if let Some(tags) = request.tags {
            news.tags = normalize_tags(tags);
        }

        let news = self.news.save(&news).await?;
        log_admin_action(ctx.admin_id, "update_news", Some(&news.slug), None);
        Ok(news)
    }

    /// Publish or unpublish an article
    pub async fn set_status(&self, ctx: &AuthContext, id: Uuid, request: UpdateNewsStatusRequest) -> Result<News> {
        ctx.require_admin()?;
        let mut news = self.load(id).await?;
        let previous = news.status;

        news.status = request.status;
        news.published_at = workflow::news_published_at(request.status, news.published_at, Utc::now());

        let news = self.news.save(&news).await?;
        log_status_change("news", id, previous.as_str(), news.status.as_str(), ctx.admin_id);
        Ok(news)
    }

    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<()> {
        ctx.require_admin()?;

        if !self.news.delete(id).await? {
            return Err(TourifyError::not_found("news", id));
        }

        log_admin_action(ctx.admin_id, "delete_news", Some(&id.to_string()), None);
        info!(news_id = %id, "News article deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<News> {
        self.news
            .find_by_id(id)
            .await?
            .ok_or_else(|| TourifyError::not_found("news", id))
    }
}

fn validate_summary(summary: Option<String>) -> Result<Option<String>> {
    match optional_text(summary) {
        Some(s) if s.chars().count() > MAX_SUMMARY_LEN => Err(TourifyError::InvalidInput(format!(
            "summary must be at most {} characters",
            MAX_SUMMARY_LEN
        ))),
        other => Ok(other),
    }
}
