//! Ebbinghaus forgetting-curve retention model.
//!
//! Pure with respect to storage: callers persist the returned strengths and
//! timestamps themselves and decide when to reinforce (typically on every
//! successful recall) or sweep for archival.

use chrono::{DateTime, Duration, Utc};

/// Default archival threshold used when the caller passes the 0.0 sentinel.
pub const DEFAULT_ARCHIVE_THRESHOLD: f64 = 0.2;

/// Retention scoring and review scheduling.
#[derive(Debug, Clone, Copy)]
pub struct EbbinghausManager {
    decay_rate: f64,
    reinforcement_factor: f64,
}

impl EbbinghausManager {
    /// Create a manager. Both rates are expected to be positive; config
    /// validation enforces that before a manager is built.
    pub fn new(decay_rate: f64, reinforcement_factor: f64) -> Self {
        Self {
            decay_rate,
            reinforcement_factor,
        }
    }

    /// Current retention strength: `exp(-decay_rate * hours_elapsed / 24)`.
    ///
    /// Elapsed time is anchored at `last_accessed_at` when present, else at
    /// `created_at`. 1.0 at zero elapsed time, asymptotically 0 as time grows.
    pub fn calculate_retention(
        &self,
        created_at: DateTime<Utc>,
        last_accessed_at: Option<DateTime<Utc>>,
    ) -> f64 {
        self.retention_at(Utc::now(), created_at, last_accessed_at)
    }

    /// [`calculate_retention`](Self::calculate_retention) with an explicit
    /// clock, for sweeps over many records and deterministic tests.
    pub fn retention_at(
        &self,
        now: DateTime<Utc>,
        created_at: DateTime<Utc>,
        last_accessed_at: Option<DateTime<Utc>>,
    ) -> f64 {
        let anchor = last_accessed_at.unwrap_or(created_at);
        let hours_elapsed = (now - anchor).num_milliseconds() as f64 / 3_600_000.0;
        // Clamp guards an anchor slightly in the future (clock skew)
        (-self.decay_rate * hours_elapsed / 24.0).exp().clamp(0.0, 1.0)
    }

    /// Boost strength on access: `current + factor * (1 - current)`, capped
    /// at 1.0. A memory already at full strength stays there.
    pub fn reinforce(&self, current_strength: f64) -> f64 {
        let boosted = current_strength + self.reinforcement_factor * (1.0 - current_strength);
        boosted.min(1.0)
    }

    /// Whether a memory has decayed below the archival threshold. A 0.0
    /// threshold is the "use the default" sentinel.
    pub fn should_archive(&self, retention_strength: f64, threshold: f64) -> bool {
        let threshold = if threshold == 0.0 {
            DEFAULT_ARCHIVE_THRESHOLD
        } else {
            threshold
        };
        retention_strength < threshold
    }

    /// When to next review a memory: `now + 24h * (1 + strength * 10)`.
    /// Stronger memories wait longer; weak ones come up for review sooner.
    pub fn next_review(&self, retention_strength: f64) -> DateTime<Utc> {
        self.next_review_at(Utc::now(), retention_strength)
    }

    /// [`next_review`](Self::next_review) with an explicit clock.
    pub fn next_review_at(&self, now: DateTime<Utc>, retention_strength: f64) -> DateTime<Utc> {
        let hours_until_review = 24.0 * (1.0 + retention_strength * 10.0);
        now + Duration::milliseconds((hours_until_review * 3_600_000.0) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> EbbinghausManager {
        EbbinghausManager::new(0.1, 0.3)
    }

    #[test]
    fn retention_after_one_day_matches_curve() {
        let m = manager();
        let now = Utc::now();
        let created = now - Duration::hours(24);

        let strength = m.retention_at(now, created, None);
        // exp(-0.1 * 24 / 24) = exp(-0.1)
        assert!((strength - (-0.1f64).exp()).abs() < 1e-9);
        assert!((strength - 0.9048).abs() < 1e-3);
    }

    #[test]
    fn retention_is_one_at_zero_elapsed() {
        let m = manager();
        let now = Utc::now();
        assert_eq!(m.retention_at(now, now, None), 1.0);
    }

    #[test]
    fn retention_anchors_at_last_access_when_present() {
        let m = manager();
        let now = Utc::now();
        let created = now - Duration::days(30);
        let accessed = now - Duration::hours(1);

        let with_access = m.retention_at(now, created, Some(accessed));
        let without_access = m.retention_at(now, created, None);
        assert!(with_access > without_access);
        assert!(with_access > 0.99);
    }

    #[test]
    fn retention_is_monotonically_non_increasing_in_time() {
        let m = manager();
        let now = Utc::now();
        let created = now - Duration::days(365);

        let mut previous = f64::INFINITY;
        for hours in [0i64, 1, 6, 24, 72, 24 * 30, 24 * 365] {
            let strength = m.retention_at(created + Duration::hours(hours), created, None);
            assert!(strength <= previous);
            assert!(strength >= 0.0);
            previous = strength;
        }
    }

    #[test]
    fn retention_clamps_future_anchor() {
        let m = manager();
        let now = Utc::now();
        // Anchor ahead of the clock must not produce a strength above 1.0
        let strength = m.retention_at(now, now + Duration::hours(2), None);
        assert_eq!(strength, 1.0);
    }

    #[test]
    fn reinforce_is_monotonic_and_bounded() {
        let m = manager();
        for current in [0.0, 0.1, 0.5, 0.9, 0.99] {
            let boosted = m.reinforce(current);
            assert!(boosted > current);
            assert!(boosted <= 1.0);
        }
        assert_eq!(m.reinforce(1.0), 1.0);
    }

    #[test]
    fn reinforce_applies_configured_factor() {
        let m = manager();
        // 0.5 + 0.3 * (1 - 0.5) = 0.65
        assert!((m.reinforce(0.5) - 0.65).abs() < 1e-9);
    }

    #[test]
    fn should_archive_compares_against_threshold() {
        let m = manager();
        assert!(m.should_archive(0.15, 0.2));
        assert!(!m.should_archive(0.25, 0.2));
        assert!(!m.should_archive(0.2, 0.2));
    }

    #[test]
    fn should_archive_zero_threshold_uses_default() {
        let m = manager();
        assert!(m.should_archive(0.15, 0.0));
        assert!(!m.should_archive(0.25, 0.0));
    }

    #[test]
    fn next_review_interval_grows_with_strength() {
        let m = manager();
        let now = Utc::now();

        let weak = m.next_review_at(now, 0.0);
        let strong = m.next_review_at(now, 1.0);
        assert_eq!(weak - now, Duration::hours(24));
        assert_eq!(strong - now, Duration::hours(24 * 11));
        assert!(strong > weak);
    }
}
