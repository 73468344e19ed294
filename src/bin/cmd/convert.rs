// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Convert command - run the decode pipeline over a local file.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Args;

use uploadcodec::convert::TempFileCache;
use uploadcodec::core::{ContentsContext, SourceTypeConfig, SourceTypesFile};
use uploadcodec::registry::{converter_for, source_type_names};

/// Convert one file into JSON-line records.
#[derive(Args, Clone, Debug)]
pub struct ConvertCmd {
    /// Source type to convert as
    #[arg(value_name = "SOURCE_TYPE")]
    source_type: String,

    /// Input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Source-type configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip content no processor matches instead of failing
    #[arg(long)]
    allow_unmapped: bool,

    /// Record id to stamp on emitted records
    #[arg(long, default_value_t = 1)]
    record_id: i64,
}

impl ConvertCmd {
    pub fn run(self) -> anyhow::Result<()> {
        let mut source_config = match &self.config {
            Some(path) => {
                let file = SourceTypesFile::load(path)?;
                file.source_type(&self.source_type)
                    .cloned()
                    .unwrap_or_else(|| SourceTypeConfig::named(&self.source_type))
            }
            None => SourceTypeConfig::named(&self.source_type),
        };
        if self.allow_unmapped {
            source_config = source_config.with("allow_unmapped", "true");
        }

        let converter = converter_for(&source_config, TempFileCache::system_default())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown source type '{}', expected one of: {}",
                    self.source_type,
                    source_type_names().join(", ")
                )
            })?;

        let file_name = self
            .input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| anyhow::anyhow!("input path has no file name"))?;
        let size = std::fs::metadata(&self.input).ok().map(|m| m.len());
        let time_received = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let context = ContentsContext::new(
            self.record_id,
            1,
            file_name,
            size,
            None,
            time_received,
        );

        let mut input = std::fs::File::open(&self.input)?;
        let stats = converter
            .convert(&context, &mut input, |record| {
                let line = serde_json::json!({
                    "topic": record.data.topic,
                    "recordId": record.record_id,
                    "revision": record.revision,
                    "endOfRecord": record.end_of_record,
                    "value": record.data.value.to_json(),
                });
                println!("{line}");
                Ok(())
            })
            .map_err(|e| {
                if e.is_retryable() {
                    anyhow::anyhow!("{e} (retryable)")
                } else {
                    anyhow::anyhow!("{e}")
                }
            })?;

        eprintln!("{} records", stats.records);
        Ok(())
    }
}
