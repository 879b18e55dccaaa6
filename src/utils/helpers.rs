//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use uuid::Uuid;
use crate::utils::errors::{TourifyError, Result};

fn non_alnum() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"))
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9 \-]{7,15}$").expect("valid phone regex"))
}

/// Build a URL slug from a display name.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single hyphen and trims hyphens at both ends. Returns an empty string
/// when nothing usable is left.
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    non_alnum()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Append a short random suffix to a slug that already exists
pub fn slug_with_suffix(slug: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{}-{}", slug, suffix)
}

/// Check email syntax
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Normalize an email for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check phone number syntax
pub fn is_valid_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone)
}

/// Validate an absolute http(s) URL
pub fn validate_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|_| TourifyError::InvalidInput(format!("{} must be a valid URL", field)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(TourifyError::InvalidInput(format!("{} must be an http(s) URL", field))),
    }
}

/// Trim a required text field and reject empty or oversized values
pub fn require_text(field: &str, value: &str, max_length: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TourifyError::InvalidInput(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max_length {
        return Err(TourifyError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max_length
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping blank strings to `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim, lowercase and dedupe tags, dropping blanks
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Drop repeated ids, keeping first occurrences in order
pub fn dedupe_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Path segment that may be either an id or a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrSlug {
    Id(Uuid),
    Slug(String),
}

impl IdOrSlug {
    pub fn parse(value: &str) -> Self {
        match Uuid::parse_str(value) {
            Ok(id) => IdOrSlug::Id(id),
            Err(_) => IdOrSlug::Slug(value.to_lowercase()),
        }
    }
}

/// Escape `%`, `_` and `\` so user input can be embedded in an ILIKE pattern
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Indore"), "indore");
        assert_eq!(slugify("  Khajuraho Group of Monuments! "), "khajuraho-group-of-monuments");
        assert_eq!(slugify("Sanchi -- Stupa"), "sanchi-stupa");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slug_with_suffix() {
        let slug = slug_with_suffix("orchha");
        assert!(slug.starts_with("orchha-"));
        assert_eq!(slug.len(), "orchha-".len() + 6);
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("rtc.bhopal@mp.gov.in"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert_eq!(normalize_email("  Admin@Example.ORG "), "admin@example.org");
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+91 98765 43210"));
        assert!(!is_valid_phone("call me"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("file_url", "https://res.cloudinary.com/x/image.jpg").is_ok());
        assert!(validate_url("file_url", "ftp://example.org/a").is_err());
        assert!(validate_url("file_url", "nope").is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  Ujjain ", 50).unwrap(), "Ujjain");
        assert!(require_text("name", "   ", 50).is_err());
        assert!(require_text("name", "abcdef", 5).is_err());
        assert_eq!(optional_text(Some("  ".to_string())), None);
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![" Heritage ".to_string(), "heritage".to_string(), "".to_string(), "Fort".to_string()];
        assert_eq!(normalize_tags(tags), vec!["heritage", "fort"]);
    }

    #[test]
    fn test_dedupe_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedupe_ids(vec![a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_id_or_slug() {
        let id = Uuid::new_v4();
        assert_eq!(IdOrSlug::parse(&id.to_string()), IdOrSlug::Id(id));
        assert_eq!(IdOrSlug::parse("Mandu"), IdOrSlug::Slug("mandu".to_string()));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    proptest! {
        #[test]
        fn slug_is_url_safe(input in "\\PC{0,64}") {
            let slug = slugify(&input);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }
    }
}
