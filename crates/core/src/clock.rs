//! Trigger time stamping in a fixed timezone

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::error::OffsetError;

/// `YYYY-MM-DD HH:mm:ss`
pub const TRIGGER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// UTC+08:00 (Asia/Shanghai, no DST).
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 8 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerClock {
    offset: FixedOffset,
}

impl Default for TriggerClock {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl TriggerClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse `+HH:MM`, `-HH:MM` or `Z`.
    pub fn from_offset_str(value: &str) -> Result<Self, OffsetError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
            return Ok(Self::new(Utc.fix()));
        }
        let err = || OffsetError(value.to_string());

        let (sign, rest) = match value.as_bytes().first() {
            Some(b'+') => (1, &value[1..]),
            Some(b'-') => (-1, &value[1..]),
            _ => return Err(err()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(err)?;
        let hours: i32 = hours.parse().map_err(|_| err())?;
        let minutes: i32 = minutes.parse().map_err(|_| err())?;
        if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
            return Err(err());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::new)
            .ok_or_else(err)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Trigger time for a beacon arriving now.
    pub fn now(&self) -> String {
        self.format(Utc::now())
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(TRIGGER_TIME_FORMAT)
            .to_string()
    }
}
