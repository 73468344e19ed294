// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Uploadcodec
//!
//! Decode pipeline library for heterogeneous uploaded files.
//!
//! Converts line-delimited CSV exports, XML assessment dumps, ZIP/7z
//! archives containing any of these, and the Axivity CWA binary
//! sensor-log format into a stream of typed, topic-addressed records
//! for downstream publication.
//!
//! ## Architecture
//!
//! The library is organized around one matching abstraction:
//! - `core/` - error taxonomy, typed values, content context, time and
//!   configuration surfaces
//! - `convert/` - factory matching, pre-processor chaining, fan-out with
//!   transparent re-materialization, temp-file staging
//! - `formats/` - the CSV, XML, archive, and CWA decode engines
//! - `sources/` - thin concrete source types wiring engines to topics
//! - `registry` - the compile-time source-type table
//!
//! ## Example: Converting a CSV Upload
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use uploadcodec::convert::TempFileCache;
//! use uploadcodec::core::{ContentsContext, SourceTypeConfig};
//! use uploadcodec::registry::converter_for;
//!
//! let config = SourceTypeConfig::named("phone-acceleration");
//! let converter = converter_for(&config, TempFileCache::system_default())
//!     .expect("registered source type");
//!
//! let context = ContentsContext::new(1, 1, "acc.csv", None, None, 0.0);
//! let mut file = std::fs::File::open("acc.csv")?;
//! converter.convert(&context, &mut file, |record| {
//!     println!("{} end={}", record.data.topic, record.end_of_record);
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use crate::core::{
    ContentsContext, ConvertError, RecordValue, Result, SourceTypeConfig, TimeFieldParser,
    TopicData, TransportRecord,
};

// Matching, delegation, and staging
pub mod convert;

pub use convert::{
    ContentPipeline, ConvertStats, DelegatingProcessor, FilePreProcessor,
    FilePreProcessorFactory, FileProcessor, FileProcessorFactory, RecordConverter, RecordSink,
    TempFileCache,
};

// Format decode engines
pub mod formats;

// Concrete source types
pub mod sources;

// Static source-type registry
pub mod registry;
