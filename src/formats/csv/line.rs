// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Line-processor contract for the CSV decode engine.
//!
//! A line-processor factory declares the upper-cased header it expects,
//! the file-name suffixes it applies to, whether an empty file is
//! acceptable, whether the header must match exactly or merely be a
//! superset, and how its time column is encoded. Its processor converts
//! one validated row into zero, one, or many records.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::context::{ContentsContext, TopicData};
use crate::core::time::{TimeFieldParser, TimeParseError};

/// How a declared header is compared against the parsed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    /// The parsed header must contain exactly the declared columns.
    Exact,
    /// The parsed header must contain at least the declared columns.
    Superset,
}

/// Row-level conversion error.
///
/// Never fatal: the engine logs it and skips the row.
#[derive(Debug, Clone)]
pub struct LineError(pub String);

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TimeParseError> for LineError {
    fn from(err: TimeParseError) -> Self {
        LineError(err.to_string())
    }
}

/// Result of converting one row.
pub type LineResult = std::result::Result<Vec<TopicData>, LineError>;

/// One validated CSV row, keyed by upper-cased header column.
#[derive(Debug, Clone)]
pub struct CsvLine {
    values: BTreeMap<String, String>,
}

impl CsvLine {
    /// Build a row from (column, value) pairs.
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Look up a column value.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Look up a column value, failing the row if absent.
    pub fn require(&self, column: &str) -> Result<&str, LineError> {
        self.get(column)
            .ok_or_else(|| LineError(format!("missing column '{column}'")))
    }

    /// Parse a column as a float, failing the row on bad values.
    pub fn float(&self, column: &str) -> Result<f64, LineError> {
        let raw = self.require(column)?;
        raw.parse::<f64>()
            .map_err(|_| LineError(format!("column '{column}' has non-numeric value '{raw}'")))
    }

    /// Parse a column as a canonical timestamp using the given parser.
    pub fn time(&self, column: &str, parser: &TimeFieldParser) -> Result<f64, LineError> {
        Ok(parser.parse(self.require(column)?)?)
    }
}

/// Factory for one kind of CSV line conversion.
pub trait CsvLineProcessorFactory: Send + Sync {
    /// The upper-cased header columns this factory expects.
    fn header(&self) -> &[&str];

    /// File-name suffixes this factory applies to.
    fn file_name_suffixes(&self) -> &[&str] {
        &[".csv"]
    }

    /// Whether an empty or missing file is acceptable.
    fn optional(&self) -> bool {
        false
    }

    /// How the declared header is compared against the parsed one.
    fn header_match(&self) -> HeaderMatch {
        HeaderMatch::Exact
    }

    /// How this factory's time column is encoded.
    fn time_parser(&self) -> TimeFieldParser {
        TimeFieldParser::epoch_millis()
    }

    /// Whether this factory applies to the content item.
    fn matches(&self, context: &ContentsContext) -> bool {
        self.file_name_suffixes()
            .iter()
            .any(|suffix| context.has_suffix(suffix))
    }

    /// Whether the parsed header satisfies this factory's declaration.
    fn matches_header(&self, header: &[String]) -> bool {
        let declared = self.header();
        match self.header_match() {
            HeaderMatch::Exact => {
                declared.len() == header.len()
                    && declared.iter().all(|c| header.iter().any(|h| h == c))
            }
            HeaderMatch::Superset => declared.iter().all(|c| header.iter().any(|h| h == c)),
        }
    }

    /// Create a line processor for this record.
    fn create_line_processor(&self, context: &ContentsContext) -> Box<dyn CsvLineProcessor>;
}

/// Converts validated rows into records.
///
/// Instances are per-(record, matched-factory) and hold no state beyond
/// what their factory gave them.
pub trait CsvLineProcessor {
    /// Convert one row into zero, one, or many records.
    fn convert_line(&mut self, line: &CsvLine) -> LineResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_accessors() {
        let mut values = BTreeMap::new();
        values.insert("TIMESTAMP".to_string(), "1000".to_string());
        values.insert("X".to_string(), "0.5".to_string());
        let line = CsvLine::new(values);

        assert_eq!(line.get("X"), Some("0.5"));
        assert_eq!(line.float("X").unwrap(), 0.5);
        assert!(line.require("Y").is_err());
        assert!(line.float("TIMESTAMP").is_ok());

        let time = line
            .time("TIMESTAMP", &TimeFieldParser::epoch_millis())
            .unwrap();
        assert_eq!(time, 1.0);
    }
}
