// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Archive decode engine.
//!
//! Iterates ZIP and 7z archives as a uniform sequence of (entry
//! metadata, entry stream) pairs, filters entries, and recurses the
//! matching/delegating machinery over each entry as if it were a
//! top-level content item, so an archive containing CSV, XML, and
//! further archives needs no special-casing.
//!
//! Both readers require seekable storage and the inbound stream is not
//! assumed seekable, so the archive is staged to a temp file first; the
//! staged copy lives for the whole archive and is removed on drop.

pub mod sevenz;
pub mod zip;

use std::io::Read;

use crate::convert::processor::{
    ContentPipeline, FileProcessor, FileProcessorFactory, RecordSink,
};
use crate::convert::staging::TempFileCache;
use crate::core::context::ContentsContext;
use crate::core::error::{ConvertError, Result};

/// Uniform projection of one archive entry.
///
/// Valid only for one visitor invocation, like the entry stream it
/// accompanies.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    /// Entry path inside the archive
    pub name: String,
    /// Uncompressed size, if the archive records one
    pub size: Option<u64>,
    /// Whether the entry is a directory
    pub is_directory: bool,
    /// Modification time, seconds since the Unix epoch, if recorded
    pub last_modified: Option<f64>,
}

/// Visitor over (entry metadata, entry stream) pairs.
pub type EntryVisitor<'a> = dyn FnMut(&ArchiveEntry, &mut dyn Read) -> Result<()> + 'a;

/// Archive container kind, detected by file-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Zip,
    SevenZ,
}

impl ArchiveKind {
    fn detect(context: &ContentsContext) -> Option<Self> {
        if context.has_suffix(".zip") {
            Some(ArchiveKind::Zip)
        } else if context.has_suffix(".7z") {
            Some(ArchiveKind::SevenZ)
        } else {
            None
        }
    }
}

/// Factory for the archive decoder.
pub struct ArchiveProcessorFactory {
    staging: TempFileCache,
    excluded_paths: Vec<String>,
}

impl ArchiveProcessorFactory {
    /// Create a factory staging archives into the given cache.
    ///
    /// macOS resource-fork folders are excluded by default.
    pub fn new(staging: TempFileCache) -> Self {
        Self {
            staging,
            excluded_paths: vec!["__MACOSX/".to_string()],
        }
    }

    /// Also exclude entries whose path contains the given fragment
    /// (e.g. a thumbnail subfolder).
    pub fn exclude_path(mut self, fragment: impl Into<String>) -> Self {
        self.excluded_paths.push(fragment.into());
        self
    }
}

impl FileProcessorFactory for ArchiveProcessorFactory {
    fn matches(&self, context: &ContentsContext) -> bool {
        ArchiveKind::detect(context).is_some()
    }

    fn create_processor(&self, _context: &ContentsContext) -> Box<dyn FileProcessor> {
        Box::new(ArchiveFileProcessor {
            staging: self.staging.clone(),
            excluded_paths: self.excluded_paths.clone(),
        })
    }
}

/// Decoder for one archive content item.
pub struct ArchiveFileProcessor {
    staging: TempFileCache,
    excluded_paths: Vec<String>,
}

impl ArchiveFileProcessor {
    fn excluded(&self, entry_name: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|fragment| entry_name.contains(fragment))
    }
}

impl FileProcessor for ArchiveFileProcessor {
    fn process(
        &mut self,
        context: &ContentsContext,
        input: &mut dyn Read,
        sink: &mut dyn RecordSink,
        pipeline: &dyn ContentPipeline,
    ) -> Result<()> {
        let kind = ArchiveKind::detect(context).ok_or_else(|| {
            ConvertError::invalid_format(
                context.record_id,
                &context.file_name,
                "content is not a supported archive",
            )
        })?;

        let staged = self.staging.stage(context, input)?;

        let mut entries_processed = 0usize;
        let mut visitor = |entry: &ArchiveEntry, reader: &mut dyn Read| -> Result<()> {
            if entry.is_directory {
                return Ok(());
            }
            if self.excluded(&entry.name) {
                context
                    .logger
                    .debug(&format!("skipping excluded archive entry '{}'", entry.name));
                return Ok(());
            }
            entries_processed += 1;
            let entry_context = context.with_entry(&entry.name, entry.size);
            pipeline.process_content(&entry_context, reader, sink)
        };

        match kind {
            ArchiveKind::Zip => self::zip::visit_entries(context, staged.path(), &mut visitor)?,
            ArchiveKind::SevenZ => self::sevenz::visit_entries(context, staged.path(), &mut visitor)?,
        }

        if entries_processed == 0 {
            return Err(ConvertError::failed(
                context.record_id,
                &context.file_name,
                "archive contains no entries after filtering",
            ));
        }
        Ok(())
    }
}
