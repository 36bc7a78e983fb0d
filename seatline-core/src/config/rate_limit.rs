//! Rate limit configuration.

use super::Environment;
use crate::rate_limit::{
    DEFAULT_PER_EMAIL_PER_DAY, DEFAULT_PER_IP_PER_HOUR, DEFAULT_RELAXED_MULTIPLIER,
    RateLimitPolicy,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_ip_per_hour: u32,
    pub per_email_per_day: u32,
    /// Force relaxed limits even in production.
    pub relaxed: bool,
    pub relaxed_multiplier: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_ip_per_hour: DEFAULT_PER_IP_PER_HOUR,
            per_email_per_day: DEFAULT_PER_EMAIL_PER_DAY,
            relaxed: false,
            relaxed_multiplier: DEFAULT_RELAXED_MULTIPLIER,
        }
    }
}

impl RateLimitConfig {
    /// Relaxed mode applies when set explicitly or in development.
    pub fn policy(&self, environment: Environment) -> RateLimitPolicy {
        let base = RateLimitPolicy {
            per_ip_per_hour: self.per_ip_per_hour,
            per_email_per_day: self.per_email_per_day,
        };
        if self.relaxed || environment == Environment::Development {
            base.relaxed(self.relaxed_multiplier)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_relaxes_limits() {
        let config = RateLimitConfig::default();
        assert_eq!(
            config.policy(Environment::Production),
            RateLimitPolicy::default()
        );
        assert_eq!(config.policy(Environment::Development).per_ip_per_hour, 100);

        let forced = RateLimitConfig {
            relaxed: true,
            relaxed_multiplier: 2,
            ..RateLimitConfig::default()
        };
        assert_eq!(forced.policy(Environment::Production).per_email_per_day, 6);
    }
}
