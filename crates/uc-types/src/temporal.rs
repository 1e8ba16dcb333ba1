use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock instant in milliseconds since the UNIX epoch.
///
/// Ledger channels stamp records with [`Timestamp::after`], which never goes
/// backwards relative to the previous record even if the system clock does.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch itself.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Create from explicit milliseconds.
    pub const fn from_millis(unix_ms: u64) -> Self {
        Self(unix_ms)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(ms)
    }

    /// The current time, clamped so it is never earlier than `previous`.
    pub fn after(previous: Option<Self>) -> Self {
        let now = Self::now();
        match previous {
            Some(prev) if prev > now => prev,
            _ => now,
        }
    }

    /// Milliseconds since the epoch.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Signed difference `self - earlier` in milliseconds.
    pub fn millis_since(&self, earlier: Self) -> i64 {
        self.0 as i64 - earlier.0 as i64
    }

    /// RFC 3339 rendering in UTC with millisecond precision.
    pub fn to_rfc3339(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.0 as i64)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_produces_reasonable_timestamp() {
        // After 2020-01-01.
        assert!(Timestamp::now().as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn after_never_regresses() {
        let future = Timestamp::from_millis(u64::MAX / 2);
        assert_eq!(Timestamp::after(Some(future)), future);

        let past = Timestamp::from_millis(1_000);
        assert!(Timestamp::after(Some(past)) > past);
        assert!(Timestamp::after(None) > Timestamp::zero());
    }

    #[test]
    fn rfc3339_rendering() {
        let ts = Timestamp::from_millis(1_700_000_000_123);
        assert_eq!(ts.to_rfc3339(), "2023-11-14T22:13:20.123Z");
        assert_eq!(format!("{ts}"), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn millis_since_is_signed() {
        let a = Timestamp::from_millis(5_000);
        let b = Timestamp::from_millis(2_000);
        assert_eq!(a.millis_since(b), 3_000);
        assert_eq!(b.millis_since(a), -3_000);
    }

    #[test]
    fn serializes_as_plain_millis() {
        let ts = Timestamp::from_millis(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
    }
}
