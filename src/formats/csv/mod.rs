// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CSV decode engine.
//!
//! Parses one CSV content item using the registered line-processor
//! factories. The first row is the header, upper-cased and trimmed;
//! factories are selected by file-name suffix and header predicate.
//! Data rows are validated (same column count as the header, no empty
//! fields); invalid rows are logged and skipped, never fatal, and fed
//! to every selected line processor, each of which may emit zero, one,
//! or many records per row.

pub mod line;

pub use line::{
    CsvLine, CsvLineProcessor, CsvLineProcessorFactory, HeaderMatch, LineError, LineResult,
};

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use crate::convert::processor::{
    ContentPipeline, FileProcessor, FileProcessorFactory, RecordSink,
};
use crate::core::context::ContentsContext;
use crate::core::error::{ConvertError, Result};

/// File-level factory wrapping a set of CSV line-processor factories.
pub struct CsvFileProcessorFactory {
    line_factories: Vec<Arc<dyn CsvLineProcessorFactory>>,
}

impl CsvFileProcessorFactory {
    /// Create a factory over the given line-processor factories.
    pub fn new(line_factories: Vec<Arc<dyn CsvLineProcessorFactory>>) -> Self {
        Self { line_factories }
    }
}

impl FileProcessorFactory for CsvFileProcessorFactory {
    fn matches(&self, context: &ContentsContext) -> bool {
        self.line_factories.iter().any(|f| f.matches(context))
    }

    fn create_processor(&self, context: &ContentsContext) -> Box<dyn FileProcessor> {
        let candidates = self
            .line_factories
            .iter()
            .filter(|f| f.matches(context))
            .cloned()
            .collect();
        Box::new(CsvFileProcessor { candidates })
    }
}

/// Decoder for one CSV content item.
pub struct CsvFileProcessor {
    candidates: Vec<Arc<dyn CsvLineProcessorFactory>>,
}

impl CsvFileProcessor {
    fn read_header(
        &self,
        context: &ContentsContext,
        reader: &mut csv::Reader<&mut dyn Read>,
    ) -> Result<Vec<String>> {
        let headers = reader.headers().map_err(|e| match e.kind() {
            csv::ErrorKind::Io(io) => {
                ConvertError::io(context.record_id, &context.file_name, "reading CSV header", io)
            }
            _ => ConvertError::invalid_format(
                context.record_id,
                &context.file_name,
                format!("unreadable CSV header: {e}"),
            ),
        })?;
        Ok(headers
            .iter()
            .map(|h| h.trim().to_ascii_uppercase())
            .collect())
    }
}

impl FileProcessor for CsvFileProcessor {
    fn process(
        &mut self,
        context: &ContentsContext,
        input: &mut dyn Read,
        sink: &mut dyn RecordSink,
        _pipeline: &dyn ContentPipeline,
    ) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let header = self.read_header(context, &mut reader)?;

        // Emptiness is decided after the header read: a file without a
        // header row is empty, acceptable only if every candidate is
        // optional.
        if header.is_empty() || (header.len() == 1 && header[0].is_empty()) {
            if self.candidates.iter().all(|f| f.optional()) {
                context.logger.debug("optional CSV file is empty; emitting nothing");
                return Ok(());
            }
            return Err(ConvertError::invalid_format(
                context.record_id,
                &context.file_name,
                "file is empty but a required CSV processor matches it",
            ));
        }

        let selected: Vec<&Arc<dyn CsvLineProcessorFactory>> = self
            .candidates
            .iter()
            .filter(|f| f.matches_header(&header))
            .collect();
        if selected.is_empty() {
            return Err(ConvertError::invalid_format(
                context.record_id,
                &context.file_name,
                format!("no CSV processor accepts header [{}]", header.join(",")),
            ));
        }

        let mut processors: Vec<Box<dyn CsvLineProcessor>> = selected
            .iter()
            .map(|f| f.create_line_processor(context))
            .collect();

        for (index, row) in reader.records().enumerate() {
            // Header is row 1; data starts at row 2.
            let row_number = index + 2;
            let row = match row {
                Ok(row) => row,
                Err(e) => match e.kind() {
                    csv::ErrorKind::Io(io) => {
                        return Err(ConvertError::io(
                            context.record_id,
                            &context.file_name,
                            format!("reading CSV row {row_number}"),
                            io,
                        ))
                    }
                    _ => {
                        context
                            .logger
                            .warn(&format!("skipping unreadable row {row_number}: {e}"));
                        continue;
                    }
                },
            };

            if row.len() != header.len() {
                context.logger.warn(&format!(
                    "skipping row {row_number}: {} fields where header has {}",
                    row.len(),
                    header.len()
                ));
                continue;
            }
            if row.iter().any(|field| field.trim().is_empty()) {
                context
                    .logger
                    .warn(&format!("skipping row {row_number}: empty field"));
                continue;
            }

            let values: BTreeMap<String, String> = header
                .iter()
                .cloned()
                .zip(row.iter().map(|field| field.trim().to_string()))
                .collect();
            let line = CsvLine::new(values);

            for processor in &mut processors {
                match processor.convert_line(&line) {
                    Ok(records) => {
                        for record in records {
                            sink.produce(record)?;
                        }
                    }
                    Err(e) => {
                        context
                            .logger
                            .warn(&format!("skipping row {row_number}: {e}"));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ContentsContext;

    struct HeaderOnlyFactory {
        header: &'static [&'static str],
        mode: HeaderMatch,
    }

    impl CsvLineProcessorFactory for HeaderOnlyFactory {
        fn header(&self) -> &[&str] {
            self.header
        }

        fn header_match(&self) -> HeaderMatch {
            self.mode
        }

        fn create_line_processor(&self, _context: &ContentsContext) -> Box<dyn CsvLineProcessor> {
            unimplemented!("header predicate tests never convert rows")
        }
    }

    fn header(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_exact_header_match() {
        let factory = HeaderOnlyFactory {
            header: &["TIMESTAMP", "X", "Y", "Z"],
            mode: HeaderMatch::Exact,
        };
        assert!(factory.matches_header(&header(&["Z", "Y", "X", "TIMESTAMP"])));
        assert!(!factory.matches_header(&header(&["TIMESTAMP", "X", "Y"])));
        assert!(!factory.matches_header(&header(&["TIMESTAMP", "X", "Y", "Z", "EXTRA"])));
    }

    #[test]
    fn test_superset_header_match() {
        let factory = HeaderOnlyFactory {
            header: &["TIMESTAMP", "X"],
            mode: HeaderMatch::Superset,
        };
        assert!(factory.matches_header(&header(&["TIMESTAMP", "X", "EXTRA"])));
        assert!(!factory.matches_header(&header(&["TIMESTAMP", "EXTRA"])));
    }
}
