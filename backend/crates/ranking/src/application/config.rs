//! Application Configuration
//!
//! Configuration for the ranking application layer.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::domain::value_object::Period;
use crate::error::{RankingError, RankingResult};

/// Ranking application configuration
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Page size when the caller does not pass one
    pub default_limit: u32,
    /// Larger requested limits are clamped to this
    pub max_limit: u32,
    /// Upper bound on users written per snapshot batch
    pub snapshot_cap: u32,
    /// Period the global leaderboard compares against for trends
    pub trend_period: Period,
    /// Half-window of the lesson leaderboard returned after a completion
    pub completion_leaderboard_limit: u32,
    /// Offset in which day, week and month boundaries are drawn
    pub utc_offset: FixedOffset,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            snapshot_cap: 1000,
            trend_period: Period::Weekly,
            completion_leaderboard_limit: 10,
            utc_offset: Utc.fix(),
        }
    }
}

impl RankingConfig {
    /// Create config for development (host-local period boundaries)
    pub fn development() -> Self {
        Self {
            utc_offset: *chrono::Local::now().offset(),
            ..Default::default()
        }
    }

    /// Resolve a caller supplied limit: absent means default, zero is
    /// rejected, anything above `max_limit` is clamped.
    pub fn resolve_limit(&self, requested: Option<u32>) -> RankingResult<u32> {
        match requested {
            None => Ok(self.default_limit.min(self.max_limit)),
            Some(0) => Err(RankingError::invalid_argument("limit must be positive")),
            Some(limit) => Ok(limit.min(self.max_limit)),
        }
    }

    /// Current instant in the configured offset
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.utc_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_limit() {
        let config = RankingConfig::default();
        assert_eq!(config.resolve_limit(None).unwrap(), 10);
        assert_eq!(config.resolve_limit(Some(3)).unwrap(), 3);
        assert_eq!(config.resolve_limit(Some(5000)).unwrap(), 100);
        assert!(matches!(
            config.resolve_limit(Some(0)),
            Err(RankingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_now_uses_offset() {
        let config = RankingConfig {
            utc_offset: FixedOffset::east_opt(9 * 3600).unwrap(),
            ..Default::default()
        };
        assert_eq!(config.now().offset().local_minus_utc(), 9 * 3600);
    }
}
