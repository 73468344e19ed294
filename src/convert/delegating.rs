// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Delegating fan-out processor.
//!
//! Runs every matching decoder over one content stream. With a single
//! match the (pre-processed) stream is passed straight through: one
//! pass, no extra I/O. With several matches the stream is copied once
//! into a staged temp file and every decoder gets an independent fresh
//! read handle, so no decoder ever observes a partially-consumed stream
//! left by a sibling.
//!
//! Decoders run sequentially in registration order; that order carries
//! no semantic significance across decoders.

use std::io::Read;

use crate::convert::processor::{
    ContentPipeline, FilePreProcessorFactory, FileProcessorFactory, RecordSink,
};
use crate::convert::staging::TempFileCache;
use crate::core::context::ContentsContext;
use crate::core::error::{ConvertError, Result};

/// Dispatcher from content items to the registered decoders.
pub struct DelegatingProcessor {
    factories: Vec<Box<dyn FileProcessorFactory>>,
    pre_processors: Vec<Box<dyn FilePreProcessorFactory>>,
    staging: TempFileCache,
    allow_unmapped: bool,
}

impl DelegatingProcessor {
    /// Create an empty dispatcher staging into the given cache.
    pub fn new(staging: TempFileCache) -> Self {
        Self {
            factories: Vec::new(),
            pre_processors: Vec::new(),
            staging,
            allow_unmapped: false,
        }
    }

    /// Register a decoder factory. Factories are consulted in
    /// registration order.
    pub fn add_factory(&mut self, factory: Box<dyn FileProcessorFactory>) {
        self.factories.push(factory);
    }

    /// Register a stream-repair step. Pre-processors chain in
    /// registration order.
    pub fn add_pre_processor(&mut self, factory: Box<dyn FilePreProcessorFactory>) {
        self.pre_processors.push(factory);
    }

    /// Skip content items no factory matches instead of failing.
    pub fn set_allow_unmapped(&mut self, allow: bool) {
        self.allow_unmapped = allow;
    }

    /// Whether unmapped content is skipped silently.
    pub fn allow_unmapped(&self) -> bool {
        self.allow_unmapped
    }

    /// Number of registered decoder factories.
    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    /// Whether any registered factory applies to the content item.
    pub fn matches(&self, context: &ContentsContext) -> bool {
        self.factories.iter().any(|f| f.matches(context))
    }

    /// The staging cache used for re-materialization.
    pub fn staging(&self) -> &TempFileCache {
        &self.staging
    }

    fn dispatch(
        &self,
        context: &ContentsContext,
        input: &mut dyn Read,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        let matched: Vec<&dyn FileProcessorFactory> = self
            .factories
            .iter()
            .map(|f| &**f)
            .filter(|f| f.matches(context))
            .collect();

        if matched.is_empty() {
            if self.allow_unmapped {
                context.logger.debug("no processor matches; skipping unmapped content");
                return Ok(());
            }
            return Err(ConvertError::processor_not_found(
                context.record_id,
                &context.file_name,
            ));
        }

        // The repair chain runs exactly once, whatever the fan-out.
        let mut stream: Box<dyn Read + '_> = Box::new(input);
        for factory in self.pre_processors.iter().filter(|f| f.matches(context)) {
            stream = factory
                .create_pre_processor(context)
                .preprocess(context, stream)?;
        }

        if matched.len() == 1 {
            let mut processor = matched[0].create_processor(context);
            return processor.process(context, &mut *stream, sink, self);
        }

        // Several decoders need these bytes; re-materialize once and give
        // each its own read handle. The staged file is removed on drop,
        // error paths included.
        let staged = self.staging.stage(context, &mut *stream)?;
        for factory in matched {
            let mut handle = staged.reopen(context)?;
            let mut processor = factory.create_processor(context);
            processor.process(context, &mut handle, sink, self)?;
        }
        Ok(())
    }
}

impl ContentPipeline for DelegatingProcessor {
    fn process_content(
        &self,
        context: &ContentsContext,
        input: &mut dyn Read,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        self.dispatch(context, input, sink)
    }
}
