// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Timestamp field parsing.
//!
//! Each CSV line-processor declares how its time column is encoded:
//! epoch milliseconds, or a chrono date-time pattern. Either way the
//! canonical numeric time is floating seconds since the Unix epoch.

use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;

/// Error parsing a timestamp field value.
#[derive(Debug, Clone, Error)]
#[error("cannot parse timestamp '{value}' as {expected}")]
pub struct TimeParseError {
    /// Offending field value
    pub value: String,
    /// What the parser expected
    pub expected: String,
}

/// Parser for a row/attribute timestamp string.
#[derive(Debug, Clone)]
pub enum TimeFieldParser {
    /// The value is milliseconds since the Unix epoch.
    EpochMillis,
    /// The value matches a chrono format pattern.
    ///
    /// Patterns without a timezone specifier are interpreted as UTC.
    DateTime {
        /// chrono strftime pattern, e.g. `"%Y-%m-%d %H:%M:%S%.f"`
        pattern: String,
    },
}

impl TimeFieldParser {
    /// Parser for epoch-millisecond values.
    pub fn epoch_millis() -> Self {
        TimeFieldParser::EpochMillis
    }

    /// Parser for values matching a chrono pattern.
    pub fn date_time(pattern: impl Into<String>) -> Self {
        TimeFieldParser::DateTime {
            pattern: pattern.into(),
        }
    }

    /// Parse a field value into seconds since the Unix epoch.
    pub fn parse(&self, value: &str) -> Result<f64, TimeParseError> {
        let value = value.trim();
        match self {
            TimeFieldParser::EpochMillis => value
                .parse::<f64>()
                .map(|millis| millis / 1000.0)
                .map_err(|_| TimeParseError {
                    value: value.to_string(),
                    expected: "epoch milliseconds".to_string(),
                }),
            TimeFieldParser::DateTime { pattern } => {
                // A pattern carrying a zone specifier parses to an
                // offset-aware instant; otherwise the value is UTC.
                if let Ok(instant) = DateTime::parse_from_str(value, pattern) {
                    return Ok(instant.timestamp_millis() as f64 / 1000.0);
                }
                NaiveDateTime::parse_from_str(value, pattern)
                    .map(|naive| naive.and_utc().timestamp_millis() as f64 / 1000.0)
                    .map_err(|_| TimeParseError {
                        value: value.to_string(),
                        expected: format!("pattern '{pattern}'"),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_millis() {
        let parser = TimeFieldParser::epoch_millis();
        assert_eq!(parser.parse("1500000000000").unwrap(), 1_500_000_000.0);
        assert_eq!(parser.parse(" 2500 ").unwrap(), 2.5);
        assert!(parser.parse("not-a-number").is_err());
    }

    #[test]
    fn test_date_time_pattern_utc() {
        let parser = TimeFieldParser::date_time("%Y-%m-%d %H:%M:%S%.f");
        let seconds = parser.parse("2017-07-14 02:40:00.500").unwrap();
        assert_eq!(seconds, 1_500_000_000.5);
    }

    #[test]
    fn test_date_time_pattern_with_zone() {
        let parser = TimeFieldParser::date_time("%Y-%m-%d %H:%M:%S %z");
        let seconds = parser.parse("2017-07-14 04:40:00 +0200").unwrap();
        assert_eq!(seconds, 1_500_000_000.0);
    }

    #[test]
    fn test_date_time_mismatch() {
        let parser = TimeFieldParser::date_time("%Y-%m-%d");
        let err = parser.parse("14/07/2017").unwrap_err();
        assert!(err.to_string().contains("14/07/2017"));
    }
}
