//! Rate limiting for login attempts
//!
//! Attempts are counted per normalized email with a keyed GCRA limiter, so
//! one account being hammered does not lock out the others.

use std::num::NonZeroU32;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};
use crate::utils::errors::{TourifyError, Result};

/// Per-key login attempt limiter
pub struct LoginRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    attempts_per_minute: u32,
}

impl LoginRateLimiter {
    /// Create a limiter allowing `attempts_per_minute` attempts per key
    pub fn new(attempts_per_minute: u32) -> Result<Self> {
        let per_minute = NonZeroU32::new(attempts_per_minute).ok_or_else(|| {
            TourifyError::Config("Login attempts per minute must be greater than 0".to_string())
        })?;

        Ok(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            attempts_per_minute,
        })
    }

    /// Record an attempt for `key`, failing once the quota is used up
    pub fn check(&self, key: &str) -> Result<()> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => {
                debug!(key = key, "Login rate limit check passed");
                Ok(())
            }
            Err(_) => {
                warn!(key = key, limit = self.attempts_per_minute, "Login rate limit exceeded");
                Err(TourifyError::RateLimitExceeded)
            }
        }
    }

    /// Drop keys whose quota has fully replenished
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(remaining_keys = self.limiter.len(), "Cleaned up login rate limit state");
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    pub fn attempts_per_minute(&self) -> u32 {
        self.attempts_per_minute
    }
}

impl std::fmt::Debug for LoginRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRateLimiter")
            .field("attempts_per_minute", &self.attempts_per_minute)
            .field("tracked_keys", &self.limiter.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_rate_limit_basic() {
        let limiter = LoginRateLimiter::new(3).unwrap();

        assert!(limiter.check("rtc@mp.gov.in").is_ok());
        assert!(limiter.check("rtc@mp.gov.in").is_ok());
        assert!(limiter.check("rtc@mp.gov.in").is_ok());
        assert_matches!(limiter.check("rtc@mp.gov.in"), Err(TourifyError::RateLimitExceeded));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = LoginRateLimiter::new(1).unwrap();

        assert!(limiter.check("a@mp.gov.in").is_ok());
        assert!(limiter.check("a@mp.gov.in").is_err());
        assert!(limiter.check("b@mp.gov.in").is_ok());
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_zero_quota_rejected() {
        assert_matches!(LoginRateLimiter::new(0), Err(TourifyError::Config(_)));
    }
}
