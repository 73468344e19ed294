// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared metadata types for content conversion.
//!
//! [`ContentsContext`] is the immutable view of one content item (a
//! top-level upload or an archive entry) that every decoder receives.
//! [`TopicData`] is the common currency the leaf decoders emit, and
//! [`TransportRecord`] is the wrapped form the caller's sink receives,
//! carrying the end-of-record marker.

use crate::core::value::RecordValue;

/// One topic-addressed record produced by a leaf decoder.
///
/// No back-references; cheap to move.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicData {
    /// Destination topic name
    pub topic: String,
    /// Typed record payload
    pub value: RecordValue,
}

impl TopicData {
    /// Create a new record for a topic.
    pub fn new(topic: impl Into<String>, value: RecordValue) -> Self {
        Self {
            topic: topic.into(),
            value,
        }
    }
}

/// A [`TopicData`] wrapped with the offset metadata the publishing layer
/// needs.
///
/// The converter guarantees `end_of_record == true` on exactly the last
/// record it emits per top-level content item and `false` on all others.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRecord {
    /// Record the content item belongs to
    pub record_id: i64,
    /// Record revision
    pub revision: i32,
    /// Whether this is the last record for the content item
    pub end_of_record: bool,
    /// The decoded record
    pub data: TopicData,
}

/// Logger handle scoped to one record.
///
/// Threaded through [`ContentsContext`] so decoders never reach for
/// global per-module loggers; every event carries the record id and the
/// file or entry name it concerns.
#[derive(Debug, Clone)]
pub struct RecordLogger {
    record_id: i64,
    file_name: String,
}

impl RecordLogger {
    /// Create a logger for one record and content item.
    pub fn new(record_id: i64, file_name: impl Into<String>) -> Self {
        Self {
            record_id,
            file_name: file_name.into(),
        }
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        tracing::debug!(
            record_id = self.record_id,
            file = %self.file_name,
            "{message}"
        );
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        tracing::info!(
            record_id = self.record_id,
            file = %self.file_name,
            "{message}"
        );
    }

    /// Log at warn level. Used for skipped rows/elements.
    pub fn warn(&self, message: &str) {
        tracing::warn!(
            record_id = self.record_id,
            file = %self.file_name,
            "{message}"
        );
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        tracing::error!(
            record_id = self.record_id,
            file = %self.file_name,
            "{message}"
        );
    }
}

/// Immutable view of one content item supplied for conversion.
///
/// Owned by the caller; the pipeline borrows it read-only and
/// copies-with-override when recursing into archive entries.
#[derive(Debug, Clone)]
pub struct ContentsContext {
    /// Logical record id supplied by the record-management layer
    pub record_id: i64,
    /// Record revision
    pub revision: i32,
    /// File or entry name
    pub file_name: String,
    /// Content size in bytes, if known
    pub size: Option<u64>,
    /// Declared content type (e.g. "text/csv"), if any
    pub content_type: Option<String>,
    /// When the upload was received, seconds since the Unix epoch
    pub time_received: f64,
    /// Record-scoped logger
    pub logger: RecordLogger,
}

impl ContentsContext {
    /// Create a context for a top-level content item.
    pub fn new(
        record_id: i64,
        revision: i32,
        file_name: impl Into<String>,
        size: Option<u64>,
        content_type: Option<String>,
        time_received: f64,
    ) -> Self {
        let file_name = file_name.into();
        let logger = RecordLogger::new(record_id, file_name.clone());
        Self {
            record_id,
            revision,
            file_name,
            size,
            content_type,
            time_received,
            logger,
        }
    }

    /// Derive a context for an archive entry.
    ///
    /// The entry name and size replace the outer file's; record identity
    /// and time-received are inherited.
    pub fn with_entry(&self, entry_name: impl Into<String>, size: Option<u64>) -> Self {
        let entry_name = entry_name.into();
        Self {
            record_id: self.record_id,
            revision: self.revision,
            logger: RecordLogger::new(self.record_id, entry_name.clone()),
            file_name: entry_name,
            size,
            content_type: None,
            time_received: self.time_received,
        }
    }

    /// Case-insensitive file-name suffix check, the primary matching
    /// predicate for processor factories.
    pub fn has_suffix(&self, suffix: &str) -> bool {
        let name = self.file_name.to_ascii_lowercase();
        name.ends_with(&suffix.to_ascii_lowercase())
    }

    /// Whether the declared content type equals the given one.
    pub fn has_content_type(&self, content_type: &str) -> bool {
        self.content_type
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(content_type))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ContentsContext {
        ContentsContext::new(11, 2, "Upload.Csv", Some(64), Some("text/csv".into()), 1.0)
    }

    #[test]
    fn test_suffix_match_is_case_insensitive() {
        let ctx = context();
        assert!(ctx.has_suffix(".csv"));
        assert!(ctx.has_suffix(".CSV"));
        assert!(!ctx.has_suffix(".xml"));
    }

    #[test]
    fn test_entry_context_overrides_name_and_size() {
        let ctx = context();
        let entry = ctx.with_entry("inner/data.xml", Some(12));
        assert_eq!(entry.record_id, 11);
        assert_eq!(entry.revision, 2);
        assert_eq!(entry.file_name, "inner/data.xml");
        assert_eq!(entry.size, Some(12));
        assert_eq!(entry.content_type, None);
        assert_eq!(entry.time_received, 1.0);
    }

    #[test]
    fn test_content_type_match() {
        let ctx = context();
        assert!(ctx.has_content_type("text/CSV"));
        assert!(!ctx.has_content_type("application/zip"));
    }
}
