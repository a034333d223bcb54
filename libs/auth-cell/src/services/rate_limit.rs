use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::warn;

pub const OTP_MAX_REQUESTS: usize = 5;
pub const OTP_WINDOW_MINUTES: i64 = 15;

/// Sliding-log limiter for OTP requests, keyed by phone number (or client IP
/// when no phone was supplied).
pub struct OtpRateLimiter {
    max_requests: usize,
    window: Duration,
    hits: RwLock<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl OtpRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: RwLock::new(HashMap::new()),
        }
    }

    /// Records the attempt and returns whether it is allowed.
    pub async fn check(&self, key: &str) -> bool {
        self.check_at(key, Utc::now()).await
    }

    pub async fn check_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut hits = self.hits.write().await;

        if hits.len() > 1024 {
            let window = self.window;
            hits.retain(|_, log| log.back().map(|last| now - *last < window).unwrap_or(false));
        }

        let log = hits.entry(key.to_string()).or_default();
        while log.front().map(|first| now - *first >= self.window).unwrap_or(false) {
            log.pop_front();
        }

        if log.len() >= self.max_requests {
            warn!("OTP rate limit exceeded for {}", key);
            return false;
        }

        log.push_back(now);
        true
    }
}

impl Default for OtpRateLimiter {
    fn default() -> Self {
        Self::new(OTP_MAX_REQUESTS, Duration::minutes(OTP_WINDOW_MINUTES))
    }
}
