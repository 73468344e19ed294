// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show which source types would match a file.

use std::path::PathBuf;

use clap::Args;

use uploadcodec::convert::TempFileCache;
use uploadcodec::core::{ContentsContext, SourceTypeConfig};
use uploadcodec::registry::{converter_for, source_type_names};

/// Show content metadata and matching source types.
#[derive(Args, Clone, Debug)]
pub struct InspectCmd {
    /// File to inspect
    #[arg(value_name = "INPUT")]
    input: PathBuf,
}

impl InspectCmd {
    pub fn run(self) -> anyhow::Result<()> {
        let file_name = self
            .input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| anyhow::anyhow!("input path has no file name"))?;
        let size = std::fs::metadata(&self.input).ok().map(|m| m.len());

        println!("File:  {file_name}");
        match size {
            Some(size) => println!("Size:  {size} bytes"),
            None => println!("Size:  unknown"),
        }
        println!("Matching source types:");

        let context = ContentsContext::new(0, 1, file_name, size, None, 0.0);
        let mut any = false;
        for name in source_type_names() {
            let config = SourceTypeConfig::named(name);
            let Some(converter) = converter_for(&config, TempFileCache::system_default()) else {
                continue;
            };
            if converter.delegating().matches(&context) {
                println!("  {name}");
                any = true;
            }
        }
        if !any {
            println!("  (none)");
        }
        Ok(())
    }
}
