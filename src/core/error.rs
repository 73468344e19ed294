// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for uploadcodec.
//!
//! Provides the error taxonomy for content conversion:
//! - No matching processor for a content item
//! - Structural format mismatch (header, schema, unparseable binary header)
//! - Permanent conversion failure
//! - Transient I/O failure, retryable by the caller
//!
//! Row- and element-level problems are not errors at this level: they are
//! logged through the record logger and the offending row/element is
//! skipped. Only structural problems abort a whole file.

use std::fmt;

/// Result type alias using [`ConvertError`].
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting a content item.
///
/// Every variant carries the record id and the file or entry name that
/// failed, so callers can diagnose failures without re-deriving context.
#[derive(Debug, Clone)]
pub enum ConvertError {
    /// No registered factory matched a content item, archive entry, or node.
    ProcessorNotFound {
        /// Record the content item belongs to
        record_id: i64,
        /// File or entry name that matched nothing
        file_name: String,
    },

    /// Header/schema mismatch, fatal for the whole file.
    InvalidFormat {
        /// Record the content item belongs to
        record_id: i64,
        /// File or entry name
        file_name: String,
        /// What was wrong with the content
        reason: String,
    },

    /// Unrecoverable decode error, surfaced to the caller as permanent.
    ConversionFailed {
        /// Record the content item belongs to
        record_id: i64,
        /// File or entry name
        file_name: String,
        /// What failed
        reason: String,
        /// Underlying cause, if one was wrapped
        cause: Option<String>,
    },

    /// I/O or other transient error, surfaced to the caller as retryable.
    TemporarilyFailed {
        /// Record the content item belongs to
        record_id: i64,
        /// File or entry name
        file_name: String,
        /// What failed
        reason: String,
        /// Underlying cause, if one was wrapped
        cause: Option<String>,
    },
}

impl ConvertError {
    /// Create a "no matching processor" error.
    pub fn processor_not_found(record_id: i64, file_name: impl Into<String>) -> Self {
        ConvertError::ProcessorNotFound {
            record_id,
            file_name: file_name.into(),
        }
    }

    /// Create an invalid format error.
    pub fn invalid_format(
        record_id: i64,
        file_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConvertError::InvalidFormat {
            record_id,
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a permanent conversion failure.
    pub fn failed(
        record_id: i64,
        file_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConvertError::ConversionFailed {
            record_id,
            file_name: file_name.into(),
            reason: reason.into(),
            cause: None,
        }
    }

    /// Create a permanent conversion failure wrapping a lower-level cause.
    pub fn failed_with(
        record_id: i64,
        file_name: impl Into<String>,
        reason: impl Into<String>,
        cause: &dyn fmt::Display,
    ) -> Self {
        ConvertError::ConversionFailed {
            record_id,
            file_name: file_name.into(),
            reason: reason.into(),
            cause: Some(cause.to_string()),
        }
    }

    /// Create a retryable failure.
    pub fn temporary(
        record_id: i64,
        file_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConvertError::TemporarilyFailed {
            record_id,
            file_name: file_name.into(),
            reason: reason.into(),
            cause: None,
        }
    }

    /// Create a retryable failure wrapping an I/O error.
    ///
    /// The delegating and archive layers use this to rethrow stream errors
    /// without swallowing the original cause.
    pub fn io(
        record_id: i64,
        file_name: impl Into<String>,
        operation: impl Into<String>,
        err: &std::io::Error,
    ) -> Self {
        ConvertError::TemporarilyFailed {
            record_id,
            file_name: file_name.into(),
            reason: operation.into(),
            cause: Some(err.to_string()),
        }
    }

    /// Whether the caller may retry the whole conversion.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConvertError::TemporarilyFailed { .. })
    }

    /// Record id this error belongs to.
    pub fn record_id(&self) -> i64 {
        match self {
            ConvertError::ProcessorNotFound { record_id, .. }
            | ConvertError::InvalidFormat { record_id, .. }
            | ConvertError::ConversionFailed { record_id, .. }
            | ConvertError::TemporarilyFailed { record_id, .. } => *record_id,
        }
    }

    /// File or entry name this error belongs to.
    pub fn file_name(&self) -> &str {
        match self {
            ConvertError::ProcessorNotFound { file_name, .. }
            | ConvertError::InvalidFormat { file_name, .. }
            | ConvertError::ConversionFailed { file_name, .. }
            | ConvertError::TemporarilyFailed { file_name, .. } => file_name,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ConvertError::ProcessorNotFound {
                record_id,
                file_name,
            } => vec![
                ("record_id", record_id.to_string()),
                ("file", file_name.clone()),
            ],
            ConvertError::InvalidFormat {
                record_id,
                file_name,
                reason,
            } => vec![
                ("record_id", record_id.to_string()),
                ("file", file_name.clone()),
                ("reason", reason.clone()),
            ],
            ConvertError::ConversionFailed {
                record_id,
                file_name,
                reason,
                cause,
            }
            | ConvertError::TemporarilyFailed {
                record_id,
                file_name,
                reason,
                cause,
            } => {
                let mut fields = vec![
                    ("record_id", record_id.to_string()),
                    ("file", file_name.clone()),
                    ("reason", reason.clone()),
                ];
                if let Some(cause) = cause {
                    fields.push(("cause", cause.clone()));
                }
                fields
            }
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::ProcessorNotFound {
                record_id,
                file_name,
            } => {
                write!(
                    f,
                    "No processor matches '{file_name}' (record {record_id})"
                )
            }
            ConvertError::InvalidFormat {
                record_id,
                file_name,
                reason,
            } => {
                write!(
                    f,
                    "Invalid format in '{file_name}' (record {record_id}): {reason}"
                )
            }
            ConvertError::ConversionFailed {
                record_id,
                file_name,
                reason,
                cause,
            } => {
                write!(
                    f,
                    "Conversion of '{file_name}' failed (record {record_id}): {reason}"
                )?;
                if let Some(cause) = cause {
                    write!(f, ": {cause}")?;
                }
                Ok(())
            }
            ConvertError::TemporarilyFailed {
                record_id,
                file_name,
                reason,
                cause,
            } => {
                write!(
                    f,
                    "Conversion of '{file_name}' temporarily failed (record {record_id}): {reason}"
                )?;
                if let Some(cause) = cause {
                    write!(f, ": {cause}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConvertError {}
