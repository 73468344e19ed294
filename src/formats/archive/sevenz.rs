// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! 7z entry iteration.
//!
//! Reads 7z archives through `sevenz-rust`, which requires seekable
//! storage; callers hand in the path of an already-staged file.

use std::path::Path;

use sevenz_rust::{Password, SevenZReader};

use super::{ArchiveEntry, EntryVisitor};
use crate::core::context::ContentsContext;
use crate::core::error::{ConvertError, Result};

/// Visit every entry of a 7z archive in stored order.
///
/// The entry reader passed to the visitor is only valid for that call;
/// the underlying sequential reader advances when the visitor returns.
pub fn visit_entries(
    context: &ContentsContext,
    path: &Path,
    visit: &mut EntryVisitor<'_>,
) -> Result<()> {
    let mut archive = SevenZReader::open(path, Password::empty()).map_err(|e| {
        ConvertError::invalid_format(
            context.record_id,
            &context.file_name,
            format!("not a readable 7z archive: {e}"),
        )
    })?;

    // The sevenz visitor can only carry its own error type, so pipeline
    // errors are parked here and iteration stops early.
    let mut pipeline_error: Option<ConvertError> = None;
    archive
        .for_each_entries(|entry, reader| {
            let metadata = ArchiveEntry {
                name: entry.name().to_string(),
                size: Some(entry.size()),
                is_directory: entry.is_directory(),
                last_modified: None,
            };
            match visit(&metadata, reader) {
                Ok(()) => Ok(true),
                Err(e) => {
                    pipeline_error = Some(e);
                    Ok(false)
                }
            }
        })
        .map_err(|e| {
            ConvertError::failed_with(
                context.record_id,
                &context.file_name,
                "cannot read 7z entries",
                &e,
            )
        })?;

    match pipeline_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
