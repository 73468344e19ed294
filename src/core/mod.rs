// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout uploadcodec.
//!
//! This module provides the foundational types for the library:
//! - [`ConvertError`] - the conversion error taxonomy
//! - [`RecordValue`] - unified typed-payload representation
//! - [`ContentsContext`] / [`TopicData`] - the common currency of the pipeline
//! - [`TimeFieldParser`] - canonical timestamp parsing
//! - [`SourceTypeConfig`] - the configuration surface the core consumes

pub mod config;
pub mod context;
pub mod error;
pub mod time;
pub mod value;

pub use config::{ConfigError, SourceTypeConfig, SourceTypesFile};
pub use context::{ContentsContext, RecordLogger, TopicData, TransportRecord};
pub use error::{ConvertError, Result};
pub use time::{TimeFieldParser, TimeParseError};
pub use value::{record_struct, RecordFields, RecordValue};
