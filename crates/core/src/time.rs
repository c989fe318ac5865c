use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};

/// Wall clock used when stamping archived results files.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Local wall time for file names. A fixed clock is reported as-is so
    /// tests do not depend on the host time zone.
    #[must_use]
    pub fn local_now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local(),
            Clock::Fixed(t) => t.naive_utc(),
        }
    }

    /// Timestamp suffix for archived results, `yyyyMMdd_HHmmss`.
    #[must_use]
    pub fn archive_stamp(&self) -> String {
        self.local_now().format("%Y%m%d_%H%M%S").to_string()
    }

    /// Move a fixed clock forward. No effect on the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_stamp_uses_compact_layout() {
        let mut clock = fixed_clock();
        assert_eq!(clock.archive_stamp(), "20231114_221320");
        clock.advance(Duration::seconds(45));
        assert_eq!(clock.archive_stamp(), "20231114_221405");
        assert!(clock.is_fixed());
        assert!(!Clock::default().is_fixed());
    }
}
