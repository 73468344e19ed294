// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Uploadcodec CLI
//!
//! Command-line tool for running the upload decode pipeline over local
//! files.
//!
//! ## Usage
//!
//! ```sh
//! # Convert a file, one JSON line per record
//! uploadcodec convert phone-acceleration acc.csv
//!
//! # Convert with a source-type configuration file
//! uploadcodec convert axivity upload.zip --config sources.toml
//!
//! # Show which source types would match a file
//! uploadcodec inspect upload.zip
//! ```

mod cmd;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{ConvertCmd, InspectCmd};

/// Uploadcodec - upload decode toolkit
///
/// Convert CSV, XML, ZIP/7z, and Axivity CWA uploads into typed,
/// topic-addressed records.
#[derive(Parser, Clone)]
#[command(name = "uploadcodec")]
#[command(about = "Decode pipeline for CSV, XML, archive, and CWA uploads", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Convert a file, printing each record as one JSON line
    Convert(ConvertCmd),

    /// Show which registered source types match a file
    Inspect(InspectCmd),
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(cmd) => cmd.run(),
        Commands::Inspect(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
