//! Fixed-window rate limiting for the write endpoints.
//!
//! The first hit on a key opens a window of `window` length with a count of
//! one. Later hits inside the window are admitted while the count is below
//! the limit; a hit after the window elapsed opens a fresh window. Counters
//! are process-local.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const IP_WINDOW: Duration = Duration::from_secs(60 * 60);
pub const EMAIL_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_PER_IP_PER_HOUR: u32 = 10;
pub const DEFAULT_PER_EMAIL_PER_DAY: u32 = 3;
pub const DEFAULT_RELAXED_MULTIPLIER: u32 = 10;

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u32,
    reset_at: Instant,
}

/// Outcome of a single counter hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateHit {
    pub allowed: bool,
    /// Count in the current window after this hit.
    pub count: u32,
    /// Time left until the window resets.
    pub retry_after: Duration,
}

/// Registration and cancellation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub per_ip_per_hour: u32,
    pub per_email_per_day: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            per_ip_per_hour: DEFAULT_PER_IP_PER_HOUR,
            per_email_per_day: DEFAULT_PER_EMAIL_PER_DAY,
        }
    }
}

impl RateLimitPolicy {
    /// Multiply both thresholds, for non-production use.
    pub fn relaxed(self, multiplier: u32) -> Self {
        Self {
            per_ip_per_hour: self.per_ip_per_hour.saturating_mul(multiplier),
            per_email_per_day: self.per_email_per_day.saturating_mul(multiplier),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitReason {
    TooManyFromIp,
    TooManyForEmail,
}

impl RateLimitReason {
    pub fn message(&self) -> &'static str {
        match self {
            RateLimitReason::TooManyFromIp => {
                "Too many requests from this address. Please try again later."
            }
            RateLimitReason::TooManyForEmail => {
                "Too many registration attempts for this email. Please try again later."
            }
        }
    }
}

impl std::fmt::Display for RateLimitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub reason: Option<RateLimitReason>,
    pub retry_after: Option<Duration>,
}

impl RateDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            retry_after: None,
        }
    }

    fn reject(reason: RateLimitReason, retry_after: Duration) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            retry_after: Some(retry_after),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    counters: Arc<DashMap<String, Counter>>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            counters: Arc::new(DashMap::new()),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    pub fn check(&self, identifier: &str, limit: u32, window: Duration) -> bool {
        self.check_at(identifier, limit, window, Instant::now())
    }

    pub fn check_at(&self, identifier: &str, limit: u32, window: Duration, now: Instant) -> bool {
        self.hit_at(identifier, limit, window, now).allowed
    }

    /// Record a hit on `identifier` and report whether it is admitted.
    pub fn hit_at(&self, identifier: &str, limit: u32, window: Duration, now: Instant) -> RateHit {
        let mut counter = self
            .counters
            .entry(identifier.to_string())
            .or_insert(Counter {
                count: 0,
                reset_at: now + window,
            });

        if now > counter.reset_at {
            counter.count = 0;
            counter.reset_at = now + window;
        }

        let retry_after = counter.reset_at.saturating_duration_since(now);
        if counter.count < limit {
            counter.count += 1;
            RateHit {
                allowed: true,
                count: counter.count,
                retry_after,
            }
        } else {
            RateHit {
                allowed: false,
                count: counter.count,
                retry_after,
            }
        }
    }

    pub fn check_registration(&self, ip: &str, email: &str) -> RateDecision {
        self.check_registration_at(ip, email, Instant::now())
    }

    /// Per-IP policy first, then per-email; stops at the first rejection.
    pub fn check_registration_at(&self, ip: &str, email: &str, now: Instant) -> RateDecision {
        let by_ip = self.hit_at(
            &format!("ip:{ip}"),
            self.policy.per_ip_per_hour,
            IP_WINDOW,
            now,
        );
        if !by_ip.allowed {
            return RateDecision::reject(RateLimitReason::TooManyFromIp, by_ip.retry_after);
        }

        let email = email.trim().to_lowercase();
        let by_email = self.hit_at(
            &format!("email:{email}"),
            self.policy.per_email_per_day,
            EMAIL_WINDOW,
            now,
        );
        if !by_email.allowed {
            return RateDecision::reject(RateLimitReason::TooManyForEmail, by_email.retry_after);
        }

        RateDecision::allow()
    }

    pub fn check_cancellation(&self, ip: &str) -> RateDecision {
        self.check_cancellation_at(ip, Instant::now())
    }

    /// Per-IP policy on its own key space, so cancellations do not eat into
    /// the registration budget.
    pub fn check_cancellation_at(&self, ip: &str, now: Instant) -> RateDecision {
        let hit = self.hit_at(
            &format!("cancel-ip:{ip}"),
            self.policy.per_ip_per_hour,
            IP_WINDOW,
            now,
        );
        if hit.allowed {
            RateDecision::allow()
        } else {
            RateDecision::reject(RateLimitReason::TooManyFromIp, hit.retry_after)
        }
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Drop counters whose window has elapsed. Returns how many were dropped.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.counters.len();
        self.counters.retain(|_, counter| now <= counter.reset_at);
        before.saturating_sub(self.counters.len())
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
