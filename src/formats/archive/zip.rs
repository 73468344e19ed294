// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ZIP entry iteration.
//!
//! Reads PKZIP archives through the central directory, which requires
//! seekable storage; callers hand in the path of an already-staged file.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;

use super::{ArchiveEntry, EntryVisitor};
use crate::core::context::ContentsContext;
use crate::core::error::{ConvertError, Result};

/// Visit every entry of a ZIP archive in central-directory order.
///
/// The entry reader passed to the visitor is only valid for that call;
/// dropping it advances the archive, which is what the format requires
/// before the next entry is opened.
pub fn visit_entries(
    context: &ContentsContext,
    path: &Path,
    visit: &mut EntryVisitor<'_>,
) -> Result<()> {
    let file = File::open(path).map_err(|e| {
        ConvertError::io(context.record_id, &context.file_name, "opening staged archive", &e)
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| match e {
        zip::result::ZipError::Io(io) => {
            ConvertError::io(context.record_id, &context.file_name, "reading ZIP directory", &io)
        }
        other => ConvertError::invalid_format(
            context.record_id,
            &context.file_name,
            format!("not a readable ZIP archive: {other}"),
        ),
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| {
            ConvertError::failed_with(
                context.record_id,
                &context.file_name,
                format!("cannot open ZIP entry {index}"),
                &e,
            )
        })?;
        let metadata = ArchiveEntry {
            name: entry.name().to_string(),
            size: Some(entry.size()),
            is_directory: entry.is_dir(),
            last_modified: entry.last_modified().and_then(last_modified_seconds),
        };
        visit(&metadata, &mut entry)?;
    }
    Ok(())
}

/// Convert a ZIP DOS timestamp to seconds since the Unix epoch.
fn last_modified_seconds(stamp: zip::DateTime) -> Option<f64> {
    let date = NaiveDate::from_ymd_opt(
        stamp.year() as i32,
        stamp.month() as u32,
        stamp.day() as u32,
    )?;
    let time = date.and_hms_opt(
        stamp.hour() as u32,
        stamp.minute() as u32,
        stamp.second() as u32,
    )?;
    Some(time.and_utc().timestamp() as f64)
}
