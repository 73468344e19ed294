// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Content conversion pipeline.
//!
//! [`RecordConverter`] is the entry point: the caller supplies a
//! [`ContentsContext`], a single-consumption byte stream, and a sink,
//! and receives zero or more [`TransportRecord`]s. Internally the
//! converter resolves matching decoder factories, fans the stream out
//! through the [`DelegatingProcessor`], and marks the final record of
//! each content item as end-of-record.

pub mod delegating;
pub mod processor;
pub mod staging;

pub use delegating::DelegatingProcessor;
pub use processor::{
    ContentPipeline, FilePreProcessor, FilePreProcessorFactory, FileProcessor,
    FileProcessorFactory, RecordSink,
};
pub use staging::{StagedContent, TempFileCache};

use std::io::Read;

use crate::core::context::{ContentsContext, TopicData, TransportRecord};
use crate::core::error::Result;

/// Statistics from converting one content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Number of records emitted
    pub records: u64,
}

/// Top-level converter for one source type.
///
/// Holds the registered decoder factories and pre-processors; one
/// converter serves many records, one `convert` call per content item.
/// Calls are synchronous and share no mutable state, so a converter may
/// be used from several threads at once.
pub struct RecordConverter {
    delegating: DelegatingProcessor,
}

impl RecordConverter {
    /// Create a converter staging re-materialized content into the given
    /// cache.
    pub fn new(staging: TempFileCache) -> Self {
        Self {
            delegating: DelegatingProcessor::new(staging),
        }
    }

    /// Register a decoder factory.
    pub fn add_factory(&mut self, factory: Box<dyn FileProcessorFactory>) {
        self.delegating.add_factory(factory);
    }

    /// Register a stream-repair step.
    pub fn add_pre_processor(&mut self, factory: Box<dyn FilePreProcessorFactory>) {
        self.delegating.add_pre_processor(factory);
    }

    /// Skip unmapped content items instead of failing.
    pub fn set_allow_unmapped(&mut self, allow: bool) {
        self.delegating.set_allow_unmapped(allow);
    }

    /// Access the inner dispatcher.
    pub fn delegating(&self) -> &DelegatingProcessor {
        &self.delegating
    }

    /// Convert one content item.
    ///
    /// Fully consumes `input` and calls `sink` once per emitted record
    /// before returning. Exactly the last record per content item has
    /// `end_of_record == true`; an item producing no records emits
    /// nothing.
    pub fn convert<F>(
        &self,
        context: &ContentsContext,
        input: &mut dyn Read,
        mut sink: F,
    ) -> Result<ConvertStats>
    where
        F: FnMut(TransportRecord) -> Result<()>,
    {
        let mut pending: Option<TopicData> = None;
        let mut records = 0u64;
        {
            // Hold one record back so the final one can be flagged.
            let mut marking = |data: TopicData| -> Result<()> {
                if let Some(previous) = pending.take() {
                    sink(TransportRecord {
                        record_id: context.record_id,
                        revision: context.revision,
                        end_of_record: false,
                        data: previous,
                    })?;
                }
                pending = Some(data);
                records += 1;
                Ok(())
            };
            self.delegating
                .process_content(context, input, &mut marking)?;
        }
        if let Some(last) = pending {
            sink(TransportRecord {
                record_id: context.record_id,
                revision: context.revision,
                end_of_record: true,
                data: last,
            })?;
        }
        Ok(ConvertStats { records })
    }
}
