//! Timestamp formatting for handler output

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format options used by the bundled handlers
///
/// # Examples
///
/// ```
/// use rust_logger_tree::core::TimestampFormat;
/// use chrono::Utc;
///
/// let timestamp = TimestampFormat::Console.format(&Utc::now());
/// assert_eq!(timestamp.len(), "2025/01/08 10:30:45".len());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 with the shortest exact sub-second precision and `Z`:
    /// `2025-01-08T10:30:45.123Z`
    ///
    /// Used by the JSON handler.
    #[default]
    Rfc3339,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// Compact terminal format: `2025/01/08 10:30:45`
    Console,

    /// Unix timestamp in seconds
    Unix,

    /// Unix timestamp in milliseconds
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Console => datetime.format("%Y/%m/%d %H:%M:%S").to_string(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}
