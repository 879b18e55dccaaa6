//! Status lifecycles
//!
//! Pure rules deciding which status a record ends up in. Services call
//! these before writing; nothing here touches the database.

use chrono::{DateTime, Utc};
use crate::models::contact::ContactStatus;
use crate::models::media::MediaStatus;
use crate::models::news::NewsStatus;
use crate::models::panchayat::PanchayatStatus;
use crate::services::auth::AuthContext;
use crate::utils::errors::{TourifyError, Result};

/// Status of a newly created panchayat
pub fn initial_panchayat_status(ctx: &AuthContext, requested: Option<PanchayatStatus>) -> Result<PanchayatStatus> {
    if ctx.is_admin() {
        return Ok(requested.unwrap_or(PanchayatStatus::Draft));
    }

    match requested {
        None => Ok(PanchayatStatus::Pending),
        Some(PanchayatStatus::Verified) => Err(TourifyError::PermissionDenied(
            "Only admins can verify a panchayat".to_string()
        )),
        Some(status) => Ok(status),
    }
}

/// Explicit status change requested through the status route
pub fn panchayat_status_change(ctx: &AuthContext, requested: PanchayatStatus) -> Result<PanchayatStatus> {
    if ctx.is_admin() {
        return Ok(requested);
    }

    // RTC may set Draft or Pending from any status
    match requested {
        PanchayatStatus::Verified => Err(TourifyError::PermissionDenied(
            "Only admins can verify a panchayat".to_string()
        )),
        status => Ok(status),
    }
}

/// An RTC edit of verified content sends it back for review
pub fn panchayat_status_after_edit(ctx: &AuthContext, current: PanchayatStatus) -> PanchayatStatus {
    if !ctx.is_admin() && current == PanchayatStatus::Verified {
        PanchayatStatus::Pending
    } else {
        current
    }
}

/// Status of a new upload: RTC uploads always wait for moderation
pub fn initial_media_status(ctx: &AuthContext, requested: Option<MediaStatus>) -> MediaStatus {
    if ctx.is_admin() {
        requested.unwrap_or(MediaStatus::Approved)
    } else {
        MediaStatus::Pending
    }
}

pub fn media_status_after_edit(ctx: &AuthContext, current: MediaStatus) -> MediaStatus {
    if ctx.is_admin() {
        current
    } else {
        MediaStatus::Pending
    }
}

/// Moderation decision; any transition is open to admins
pub fn media_status_change(ctx: &AuthContext, requested: MediaStatus) -> Result<MediaStatus> {
    ctx.require_admin()?;
    Ok(requested)
}

/// Publication timestamp after moving to `status`. The first publish stamps
/// it; unpublishing keeps it.
pub fn news_published_at(
    status: NewsStatus,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match status {
        NewsStatus::Published => published_at.or(Some(now)),
        NewsStatus::Draft => published_at,
    }
}

/// Resolution timestamp after moving to `status`
pub fn contact_resolved_at(
    status: ContactStatus,
    resolved_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match status {
        ContactStatus::Resolved => resolved_at.or(Some(now)),
        ContactStatus::New => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use uuid::Uuid;
    use crate::models::admin::Role;

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            admin_id: Uuid::new_v4(),
            name: "Tester".to_string(),
            role,
            assigned_districts: vec![Uuid::new_v4()],
        }
    }

    #[test]
    fn test_initial_panchayat_status() {
        let admin = ctx(Role::Admin);
        let rtc = ctx(Role::Rtc);

        assert_eq!(initial_panchayat_status(&admin, None).unwrap(), PanchayatStatus::Draft);
        assert_eq!(
            initial_panchayat_status(&admin, Some(PanchayatStatus::Verified)).unwrap(),
            PanchayatStatus::Verified
        );
        assert_eq!(initial_panchayat_status(&rtc, None).unwrap(), PanchayatStatus::Pending);
        assert_eq!(
            initial_panchayat_status(&rtc, Some(PanchayatStatus::Draft)).unwrap(),
            PanchayatStatus::Draft
        );
        assert_matches!(
            initial_panchayat_status(&rtc, Some(PanchayatStatus::Verified)),
            Err(TourifyError::PermissionDenied(_))
        );
    }

    #[test]
    fn test_rtc_cannot_verify() {
        let rtc = ctx(Role::Rtc);

        assert_matches!(
            panchayat_status_change(&rtc, PanchayatStatus::Verified),
            Err(TourifyError::PermissionDenied(_))
        );
        assert_eq!(
            panchayat_status_change(&rtc, PanchayatStatus::Pending).unwrap(),
            PanchayatStatus::Pending
        );
        assert_eq!(
            panchayat_status_change(&rtc, PanchayatStatus::Draft).unwrap(),
            PanchayatStatus::Draft
        );
    }

    #[test]
    fn test_admin_sets_any_status() {
        let admin = ctx(Role::Admin);
        for requested in [PanchayatStatus::Draft, PanchayatStatus::Pending, PanchayatStatus::Verified] {
            assert_eq!(panchayat_status_change(&admin, requested).unwrap(), requested);
        }
    }

    #[test]
    fn test_rtc_edit_demotes_verified() {
        assert_eq!(
            panchayat_status_after_edit(&ctx(Role::Rtc), PanchayatStatus::Verified),
            PanchayatStatus::Pending
        );
        assert_eq!(
            panchayat_status_after_edit(&ctx(Role::Rtc), PanchayatStatus::Draft),
            PanchayatStatus::Draft
        );
        assert_eq!(
            panchayat_status_after_edit(&ctx(Role::Admin), PanchayatStatus::Verified),
            PanchayatStatus::Verified
        );
    }

    #[test]
    fn test_media_moderation() {
        let admin = ctx(Role::Admin);
        let rtc = ctx(Role::Rtc);

        assert_eq!(initial_media_status(&admin, None), MediaStatus::Approved);
        assert_eq!(initial_media_status(&admin, Some(MediaStatus::Pending)), MediaStatus::Pending);
        assert_eq!(initial_media_status(&rtc, Some(MediaStatus::Approved)), MediaStatus::Pending);
        assert_eq!(media_status_after_edit(&rtc, MediaStatus::Approved), MediaStatus::Pending);
        assert_eq!(media_status_after_edit(&admin, MediaStatus::Rejected), MediaStatus::Rejected);
        assert_matches!(
            media_status_change(&rtc, MediaStatus::Approved),
            Err(TourifyError::PermissionDenied(_))
        );
        assert_eq!(media_status_change(&admin, MediaStatus::Rejected).unwrap(), MediaStatus::Rejected);
    }

    #[test]
    fn test_news_publication_timestamp() {
        let first = Utc::now() - Duration::days(3);
        let now = Utc::now();

        assert_eq!(news_published_at(NewsStatus::Published, None, now), Some(now));
        assert_eq!(news_published_at(NewsStatus::Published, Some(first), now), Some(first));
        assert_eq!(news_published_at(NewsStatus::Draft, Some(first), now), Some(first));
        assert_eq!(news_published_at(NewsStatus::Draft, None, now), None);
    }

    #[test]
    fn test_contact_resolution_timestamp() {
        let earlier = Utc::now() - Duration::hours(1);
        let now = Utc::now();

        assert_eq!(contact_resolved_at(ContactStatus::Resolved, None, now), Some(now));
        assert_eq!(contact_resolved_at(ContactStatus::Resolved, Some(earlier), now), Some(earlier));
        assert_eq!(contact_resolved_at(ContactStatus::New, Some(earlier), now), None);
    }
}
