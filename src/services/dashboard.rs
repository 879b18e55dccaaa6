//! Dashboard statistics

use std::collections::BTreeMap;
use std::time::Instant;
use serde::Serialize;
use crate::database::DatabaseService;
use crate::services::auth::{AuthContext, Scope};
use crate::utils::errors::Result;
use crate::utils::logging::log_database_operation;

/// Count per status plus the total
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
}

impl StatusCounts {
    pub fn from_rows<S>(rows: Vec<(S, i64)>, label: impl Fn(&S) -> &'static str) -> Self {
        let mut counts = Self::default();
        for (status, count) in rows {
            counts.total += count;
            *counts.by_status.entry(label(&status).to_string()).or_default() += count;
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// `all` for admins, `districts` for RTC accounts
    pub scope: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub districts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admins: Option<i64>,
    pub panchayats: StatusCounts,
    pub media: StatusCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<StatusCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<StatusCounts>,
}

#[derive(Clone)]
pub struct DashboardService {
    database: DatabaseService,
}

impl DashboardService {
    pub fn new(database: DatabaseService) -> Self {
        Self { database }
    }

    /// Admins get totals for every entity, RTC accounts their districts only
    pub async fn stats(&self, ctx: &AuthContext) -> Result<DashboardStats> {
        let started = Instant::now();
        let scope = ctx.scope();
        let within = scope.within_districts();

        let panchayats = StatusCounts::from_rows(
            self.database.panchayats.count_by_status(within.as_deref()).await?,
            |s| s.as_str(),
        );
        let media = StatusCounts::from_rows(
            self.database.media.count_by_status(within.as_deref()).await?,
            |s| s.as_str(),
        );

        let stats = if scope == Scope::All {
            DashboardStats {
                scope: "all",
                districts: Some(self.database.districts.count().await?),
                admins: Some(self.database.admins.count().await?),
                panchayats,
                media,
                news: Some(StatusCounts::from_rows(self.database.news.count_by_status().await?, |s| s.as_str())),
                contacts: Some(StatusCounts::from_rows(
                    self.database.contacts.count_by_status().await?,
                    |s| s.as_str(),
                )),
            }
        } else {
            DashboardStats {
                scope: "districts",
                districts: Some(ctx.assigned_districts.len() as i64),
                admins: None,
                panchayats,
                media,
                news: None,
                contacts: None,
            }
        };

        log_database_operation("dashboard_stats", "*", started.elapsed().as_millis() as u64, true);
        Ok(stats)
    }
}
