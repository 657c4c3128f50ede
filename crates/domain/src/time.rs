//! Time and timestamp helpers.

use chrono::{DateTime, Datelike, Utc};

/// UTC timestamp used for readings, windows and decisions.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Align `ts` down to the start of its `window_secs` bucket (epoch aligned).
///
/// A zero window returns `ts` unchanged.
#[must_use]
pub fn floor_to_window(ts: Timestamp, window_secs: u32) -> Timestamp {
    if window_secs == 0 {
        return ts;
    }
    let secs = ts.timestamp();
    let floored = secs - secs.rem_euclid(i64::from(window_secs));
    DateTime::from_timestamp(floored, 0).unwrap_or(ts)
}

/// Meteorological season of the northern hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season for the month of `ts`.
    #[must_use]
    pub fn of(ts: Timestamp) -> Self {
        match ts.month() {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }
}
