// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core traits for the matching processor abstraction.
//!
//! This module defines the seam between the dispatch machinery and the
//! competing format decoders. A factory answers "does this apply to this
//! content item?" and creates a per-record processor; a pre-processor
//! factory answers the same question for stream-repair steps that run
//! before any decoder parses the content.

use std::io::Read;

use crate::core::context::{ContentsContext, TopicData};
use crate::core::error::Result;

/// Sink receiving the records a processor emits.
///
/// Implemented for any `FnMut(TopicData) -> Result<()>` closure.
pub trait RecordSink {
    /// Accept one record.
    fn produce(&mut self, data: TopicData) -> Result<()>;
}

impl<F> RecordSink for F
where
    F: FnMut(TopicData) -> Result<()>,
{
    fn produce(&mut self, data: TopicData) -> Result<()> {
        self(data)
    }
}

/// Recursion handle into the matching/delegating machinery.
///
/// Archive processors use this to hand each entry back to the same
/// pipeline that dispatched the archive itself; leaf processors ignore
/// it.
pub trait ContentPipeline {
    /// Convert one content item, emitting records into the sink.
    fn process_content(
        &self,
        context: &ContentsContext,
        input: &mut dyn Read,
        sink: &mut dyn RecordSink,
    ) -> Result<()>;
}

/// Factory for one kind of file decoder.
///
/// Matching is by file-name suffix and, optionally, declared content
/// type. Factories are registered once per converter and shared across
/// records; processors are created per record.
pub trait FileProcessorFactory: Send + Sync {
    /// Whether this factory applies to the content item.
    fn matches(&self, context: &ContentsContext) -> bool;

    /// Create a processor instance for this record.
    fn create_processor(&self, context: &ContentsContext) -> Box<dyn FileProcessor>;
}

/// A decoder for one content item.
pub trait FileProcessor {
    /// Fully consume the input stream, emitting zero or more records.
    fn process(
        &mut self,
        context: &ContentsContext,
        input: &mut dyn Read,
        sink: &mut dyn RecordSink,
        pipeline: &dyn ContentPipeline,
    ) -> Result<()>;
}

/// Factory for a stream-repair step.
pub trait FilePreProcessorFactory: Send + Sync {
    /// Whether this pre-processor applies to the content item.
    fn matches(&self, context: &ContentsContext) -> bool;

    /// Create a pre-processor instance for this record.
    fn create_pre_processor(&self, context: &ContentsContext) -> Box<dyn FilePreProcessor>;
}

/// A stream-repair step, e.g. rewriting a garbled CSV header row before
/// any decoder parses it.
///
/// Pre-processors chain in registration order; each receives the
/// previous one's output stream.
pub trait FilePreProcessor {
    /// Wrap or replace the input stream.
    fn preprocess<'a>(
        &mut self,
        context: &ContentsContext,
        input: Box<dyn Read + 'a>,
    ) -> Result<Box<dyn Read + 'a>>;
}
