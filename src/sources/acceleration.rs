// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Accelerometer CSV line processor.
//!
//! Converts `TIMESTAMP,X,Y,Z` rows into acceleration records, one per
//! row. When a usage-event topic is configured the same row also emits
//! a derived usage event, the one-to-many case of the CSV engine.

use crate::core::context::{ContentsContext, TopicData};
use crate::core::time::TimeFieldParser;
use crate::core::value::{record_struct, RecordValue};
use crate::formats::csv::line::{
    CsvLine, CsvLineProcessor, CsvLineProcessorFactory, LineResult,
};

/// Factory for accelerometer CSV rows.
pub struct AccelerationCsvFactory {
    topic: String,
    usage_event_topic: Option<String>,
    optional: bool,
}

impl AccelerationCsvFactory {
    /// Create a factory publishing to the given topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            usage_event_topic: None,
            optional: false,
        }
    }

    /// Also emit a derived usage event per row.
    pub fn with_usage_events(mut self, topic: impl Into<String>) -> Self {
        self.usage_event_topic = Some(topic.into());
        self
    }

    /// Treat an empty file as acceptable.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl CsvLineProcessorFactory for AccelerationCsvFactory {
    fn header(&self) -> &[&str] {
        &["TIMESTAMP", "X", "Y", "Z"]
    }

    fn optional(&self) -> bool {
        self.optional
    }

    fn create_line_processor(&self, context: &ContentsContext) -> Box<dyn CsvLineProcessor> {
        Box::new(AccelerationLineProcessor {
            topic: self.topic.clone(),
            usage_event_topic: self.usage_event_topic.clone(),
            time_parser: self.time_parser(),
            time_received: context.time_received,
        })
    }
}

struct AccelerationLineProcessor {
    topic: String,
    usage_event_topic: Option<String>,
    time_parser: TimeFieldParser,
    time_received: f64,
}

impl CsvLineProcessor for AccelerationLineProcessor {
    fn convert_line(&mut self, line: &CsvLine) -> LineResult {
        let time = line.time("TIMESTAMP", &self.time_parser)?;
        let mut records = vec![TopicData::new(
            &self.topic,
            record_struct([
                ("time", RecordValue::Timestamp(time)),
                ("time_received", RecordValue::Timestamp(self.time_received)),
                ("x", RecordValue::Float(line.float("X")?)),
                ("y", RecordValue::Float(line.float("Y")?)),
                ("z", RecordValue::Float(line.float("Z")?)),
            ]),
        )];
        if let Some(usage_topic) = &self.usage_event_topic {
            records.push(TopicData::new(
                usage_topic,
                record_struct([
                    ("time", RecordValue::Timestamp(time)),
                    ("time_received", RecordValue::Timestamp(self.time_received)),
                    ("event", RecordValue::String("SENSOR_ACTIVE".to_string())),
                ]),
            ));
        }
        Ok(records)
    }
}
