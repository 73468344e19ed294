// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Temp-file staging for single-consumption streams.
//!
//! Re-materialization copies a stream into an anonymous file under a
//! process-wide cache directory so that multiple independent readers can
//! each consume it fully, or so that seek-requiring readers (ZIP, 7z)
//! can work over a non-seekable inbound stream. Staged files are deleted
//! when the handle drops, on every exit path.
//!
//! The cache directory may be shared across concurrently-running
//! conversions: file names derive from the record id and sanitized entry
//! name plus an OS-random suffix, so distinct records cannot collide.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::context::ContentsContext;
use crate::core::error::{ConvertError, Result};

/// Factory for staged temp files under one cache directory.
#[derive(Debug, Clone)]
pub struct TempFileCache {
    dir: PathBuf,
}

impl TempFileCache {
    /// Use the given cache directory, creating it if absent.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Use the system temp directory.
    pub fn system_default() -> Self {
        Self {
            dir: std::env::temp_dir(),
        }
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy the stream fully into a new staged file.
    ///
    /// Bounded by available disk, not memory. I/O failures surface as
    /// retryable errors carrying the record context.
    pub fn stage(&self, context: &ContentsContext, input: &mut dyn Read) -> Result<StagedContent> {
        let prefix = format!(
            "{}_{}_{}-",
            context.record_id,
            context.revision,
            sanitize_name(&context.file_name)
        );
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(&self.dir)
            .map_err(|e| ConvertError::io(context.record_id, &context.file_name, "creating staging file", &e))?;
        let size = io::copy(input, file.as_file_mut()).map_err(|e| {
            ConvertError::io(context.record_id, &context.file_name, "staging content", &e)
        })?;
        Ok(StagedContent { file, size })
    }
}

/// A fully-staged copy of one content item.
///
/// The backing file is deleted when this value drops.
pub struct StagedContent {
    file: NamedTempFile,
    size: u64,
}

impl StagedContent {
    /// Open an independent fresh read handle over the staged bytes.
    pub fn reopen(&self, context: &ContentsContext) -> Result<File> {
        self.file.reopen().map_err(|e| {
            ConvertError::io(context.record_id, &context.file_name, "reopening staged content", &e)
        })
    }

    /// Path of the staged file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of staged bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Replace path separators and other non-portable characters so entry
/// names can appear in temp file names.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
