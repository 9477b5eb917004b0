// SPDX-License-Identifier: Apache-2.0

use chrono::{SecondsFormat, Utc};

/// Source of the timestamps stamped into lifecycle and harvest fields.
pub trait Clock {
    /// UTC instant in RFC 3339 form with second precision and a `+00:00` offset.
    fn now_rfc3339(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock(String);

impl FixedClock {
    #[must_use]
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }
}

impl Clock for FixedClock {
    fn now_rfc3339(&self) -> String {
        self.0.clone()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_rfc3339(&self) -> String {
        (**self).now_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, SystemClock};

    #[test]
    fn system_clock_uses_utc_offset_and_whole_seconds() {
        let now = SystemClock.now_rfc3339();
        assert!(now.ends_with("+00:00"), "unexpected timestamp {now}");
        assert_eq!(now.len(), "2026-01-01T00:00:00+00:00".len());
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }

    #[test]
    fn fixed_clock_repeats_its_instant() {
        let clock = FixedClock::new("2026-03-01T12:00:00+00:00");
        assert_eq!(clock.now_rfc3339(), clock.now_rfc3339());
    }
}
