use std::fmt;

use serde::{Deserialize, Serialize};

pub const MILLIS_PER_SECOND: u64 = 1_000;
pub const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

/// Host-relative simulation time in milliseconds.
///
/// The engine never reads the wall clock directly; every timestamp comes from
/// a [`Clock`](crate::sim::Clock), so tests can single-step time.
/// Natural `u64` ordering equals chronological ordering.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime(u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs * MILLIS_PER_SECOND)
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self(minutes * MILLIS_PER_MINUTE)
    }

    pub fn millis(self) -> u64 {
        self.0
    }

    pub fn plus_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Start of a look-back window of `ms` ending at `self`, floored at zero.
    pub fn minus_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_sub(ms))
    }

    /// Milliseconds elapsed since `earlier`; zero if `earlier` is in the future.
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0 / MILLIS_PER_SECOND;
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            total_secs / 3600,
            (total_secs / 60) % 60,
            total_secs % 60,
            self.0 % MILLIS_PER_SECOND
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_agree() {
        assert_eq!(SimTime::from_secs(60), SimTime::from_minutes(1));
        assert_eq!(SimTime::from_minutes(5).millis(), 300_000);
    }

    #[test]
    fn since_saturates() {
        let early = SimTime::from_secs(10);
        let late = SimTime::from_secs(25);
        assert_eq!(late.since(early), 15_000);
        assert_eq!(early.since(late), 0);
        assert_eq!(early.minus_millis(60_000), SimTime::ZERO);
    }

    #[test]
    fn display_is_clock_like() {
        let t = SimTime::from_millis(3 * MILLIS_PER_HOUR + 2 * MILLIS_PER_MINUTE + 5_042);
        assert_eq!(t.to_string(), "03:02:05.042");
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&SimTime::from_millis(1234)).unwrap();
        assert_eq!(json, "1234");
    }
}
