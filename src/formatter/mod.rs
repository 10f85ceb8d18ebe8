pub mod bookmark;
pub mod catalog;
pub mod classification;
pub mod language;
pub mod spotlight;
pub mod user;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use serde::{Deserialize, Serialize};

pub use bookmark::*;
pub use catalog::*;
pub use classification::*;
pub use language::*;
pub use spotlight::*;
pub use user::*;

/// Maximum number of characters of a description shown in light format
pub(crate) const MAX_DESCRIPTION_LENGTH: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MarkdownContent(pub String);

/// Truncates to [`MAX_DESCRIPTION_LENGTH`] characters, appending `...`
pub(crate) fn truncate_description(description: &str) -> String {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        let truncated: String = description.chars().take(MAX_DESCRIPTION_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        description.to_string()
    }
}

/// Fixed timezone offset used to render timestamps.
///
/// Supports a few common abbreviations (UTC, GMT, JST, EST, PST, PDT, BST)
/// and `+HH:MM` / `-HH:MM` strings. Daylight saving time is not tracked; pick
/// the abbreviation that matches the period being displayed.
///
/// # Example
/// ```
/// use repo_catalog::formatter::TimezoneOffset;
///
/// let jst = TimezoneOffset::parse("JST").unwrap();
/// let custom = TimezoneOffset::parse("+09:00").unwrap();
/// assert_eq!(jst.offset_seconds, custom.offset_seconds);
/// ```
#[derive(Debug, Clone)]
pub struct TimezoneOffset {
    /// Offset from UTC in seconds (positive for east, negative for west)
    pub offset_seconds: i32,
    /// Human-readable timezone name or offset string
    pub name: String,
}

impl TimezoneOffset {
    /// Create a new timezone offset from hours and minutes
    pub fn new(hours: i32, minutes: i32, name: String) -> Self {
        Self {
            offset_seconds: hours * 3600 + minutes * 60,
            name,
        }
    }

    /// Create a timezone offset from the local system timezone
    pub fn from_local() -> Self {
        let local_offset = Local::now().offset().local_minus_utc();
        let hours = local_offset / 3600;
        let minutes = (local_offset % 3600) / 60;

        let name = if local_offset >= 0 {
            format!("+{:02}:{:02}", hours, minutes)
        } else {
            format!("-{:02}:{:02}", hours.abs(), minutes.abs())
        };

        Self {
            offset_seconds: local_offset,
            name,
        }
    }

    /// Parse timezone offset from string (e.g., "+09:00", "-05:30", "UTC")
    pub fn parse(tz_str: &str) -> Option<Self> {
        match tz_str {
            "UTC" | "GMT" => Some(Self::new(0, 0, "UTC".to_string())),
            "JST" => Some(Self::new(9, 0, "JST".to_string())),
            "EST" => Some(Self::new(-5, 0, "EST".to_string())),
            "PST" => Some(Self::new(-8, 0, "PST".to_string())),
            "PDT" => Some(Self::new(-7, 0, "PDT".to_string())),
            "BST" => Some(Self::new(1, 0, "BST".to_string())),
            s if s.starts_with('+') || s.starts_with('-') => {
                let sign = if s.starts_with('-') { -1 } else { 1 };
                let parts: Vec<&str> = s[1..].split(':').collect();
                if parts.len() == 2 {
                    if let (Ok(hours), Ok(minutes)) =
                        (parts[0].parse::<i32>(), parts[1].parse::<i32>())
                    {
                        Some(Self::new(sign * hours, sign * minutes, s.to_string()))
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Convert to chrono FixedOffset
    pub fn to_fixed_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_seconds).unwrap_or_else(|| Utc.fix())
    }
}

impl std::fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Format a UTC datetime with the specified timezone offset.
/// If timezone is None, defaults to UTC.
pub fn format_datetime_with_timezone_offset(
    dt: DateTime<Utc>,
    timezone: Option<&TimezoneOffset>,
) -> String {
    match timezone {
        Some(tz) => {
            let local_dt = dt.with_timezone(&tz.to_fixed_offset());
            local_dt
                .format(&format!("%Y-%m-%d %H:%M:%S {}", tz.name))
                .to_string()
        }
        None => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    }
}

/// Format a UTC date with the specified timezone offset (date only, no time).
/// If timezone is None, defaults to UTC.
pub fn format_date_with_timezone_offset(
    dt: DateTime<Utc>,
    timezone: Option<&TimezoneOffset>,
) -> String {
    match timezone {
        Some(tz) => {
            let local_dt = dt.with_timezone(&tz.to_fixed_offset());
            local_dt
                .format(&format!("%Y-%m-%d {}", tz.name))
                .to_string()
        }
        None => dt.format("%Y-%m-%d UTC").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timezone_offset_parse() {
        assert_eq!(TimezoneOffset::parse("UTC").unwrap().offset_seconds, 0);
        assert_eq!(TimezoneOffset::parse("JST").unwrap().offset_seconds, 9 * 3600);
        assert_eq!(
            TimezoneOffset::parse("-05:30").unwrap().offset_seconds,
            -(5 * 3600 + 30 * 60)
        );
        assert!(TimezoneOffset::parse("Mars/Olympus").is_none());
        assert!(TimezoneOffset::parse("+9").is_none());
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let offset = TimezoneOffset::new(30, 0, "+30:00".to_string());
        assert_eq!(offset.to_fixed_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_format_datetime_with_timezone_offset() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();
        assert_eq!(
            format_datetime_with_timezone_offset(dt, None),
            "2024-03-01 18:30:00 UTC"
        );
        let jst = TimezoneOffset::parse("JST").unwrap();
        assert_eq!(
            format_datetime_with_timezone_offset(dt, Some(&jst)),
            "2024-03-02 03:30:00 JST"
        );
        assert_eq!(format_date_with_timezone_offset(dt, Some(&jst)), "2024-03-02 JST");
    }

    #[test]
    fn test_truncate_description() {
        assert_eq!(truncate_description("short"), "short");
        let long = "x".repeat(150);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), MAX_DESCRIPTION_LENGTH + 3);
        assert!(truncated.ends_with("..."));
    }
}
