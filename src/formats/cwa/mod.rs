// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Axivity CWA binary decoder.
//!
//! Reads 512-byte blocks sequentially. Metadata blocks accumulate
//! device/session/annotation metadata and emit no sample records; data
//! blocks are fanned out to the enabled block processors (acceleration,
//! light, battery, temperature, events), each an independent strategy
//! plugged into one block-iteration loop. Which processors run is a
//! per-source-type configuration choice, not a code change.
//!
//! After the whole file is consumed, metadata records are emitted using
//! the first data sample's timestamp as their nominal time, so metadata
//! sorts alongside the data it describes.

pub mod block;

pub use block::{
    checksum_word, pack_timestamp, parse_block, CwaBlock, CwaDataBlock, CwaError,
    CwaMetadataBlock, CWA_BLOCK_SIZE, NUM_AXES_PER_SAMPLE,
};

use std::collections::BTreeMap;
use std::io::Read;

use crate::convert::processor::{
    ContentPipeline, FileProcessor, FileProcessorFactory, RecordSink,
};
use crate::core::config::SourceTypeConfig;
use crate::core::context::{ContentsContext, TopicData};
use crate::core::error::{ConvertError, Result};
use crate::core::value::{record_struct, RecordValue};

/// Topic names the CWA decoder publishes to.
#[derive(Debug, Clone)]
pub struct CwaTopics {
    /// Per-sample acceleration records
    pub acceleration: String,
    /// Per-block light records
    pub light: String,
    /// Per-block battery records
    pub battery: String,
    /// Per-block temperature records
    pub temperature: String,
    /// Per-event records
    pub event: String,
    /// Device/session/annotation metadata records
    pub metadata: String,
}

impl Default for CwaTopics {
    fn default() -> Self {
        Self {
            acceleration: "wearable_axivity_acceleration".to_string(),
            light: "wearable_axivity_light".to_string(),
            battery: "wearable_axivity_battery_level".to_string(),
            temperature: "wearable_axivity_temperature".to_string(),
            event: "wearable_axivity_event".to_string(),
            metadata: "wearable_axivity_metadata".to_string(),
        }
    }
}

/// Device event kinds decoded from the data-block bit-flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CwaEvent {
    /// Logging resumed
    Resume,
    /// Single tap detected
    SingleTap,
    /// Double tap detected
    DoubleTap,
    /// Hardware FIFO overflow
    FifoOverflow,
    /// Software buffer overflow
    BufferOverflow,
    /// Unhandled interrupt
    UnhandledInterrupt,
    /// A bit with no assigned meaning
    Unknown,
}

impl CwaEvent {
    /// Decode the bit-flags into the events they name.
    ///
    /// Unrecognized bits map to [`CwaEvent::Unknown`] rather than being
    /// dropped.
    pub fn from_bits(bits: u8) -> Vec<CwaEvent> {
        const KNOWN: &[(u8, CwaEvent)] = &[
            (0x01, CwaEvent::Resume),
            (0x02, CwaEvent::SingleTap),
            (0x04, CwaEvent::DoubleTap),
            (0x10, CwaEvent::FifoOverflow),
            (0x20, CwaEvent::BufferOverflow),
            (0x40, CwaEvent::UnhandledInterrupt),
        ];
        let mut events = Vec::new();
        let mut remaining = bits;
        for &(bit, event) in KNOWN {
            if bits & bit != 0 {
                events.push(event);
                remaining &= !bit;
            }
        }
        if remaining != 0 {
            events.push(CwaEvent::Unknown);
        }
        events
    }

    /// Event name as emitted in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            CwaEvent::Resume => "RESUME",
            CwaEvent::SingleTap => "SINGLE_TAP",
            CwaEvent::DoubleTap => "DOUBLE_TAP",
            CwaEvent::FifoOverflow => "FIFO_OVERFLOW",
            CwaEvent::BufferOverflow => "BUFFER_OVERFLOW",
            CwaEvent::UnhandledInterrupt => "UNHANDLED_INTERRUPT",
            CwaEvent::Unknown => "UNKNOWN",
        }
    }
}

/// Strategy converting one data block into records for one topic.
trait CwaBlockProcessor {
    fn process_block(
        &self,
        context: &ContentsContext,
        data: &CwaDataBlock,
        sink: &mut dyn RecordSink,
    ) -> Result<()>;
}

struct AccelerationBlockProcessor {
    topic: String,
}

impl CwaBlockProcessor for AccelerationBlockProcessor {
    fn process_block(
        &self,
        context: &ContentsContext,
        data: &CwaDataBlock,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        for (index, sample) in data.samples.iter().enumerate() {
            sink.produce(TopicData::new(
                &self.topic,
                record_struct([
                    ("time", RecordValue::Timestamp(data.sample_time(index))),
                    ("time_received", RecordValue::Timestamp(context.time_received)),
                    ("x", RecordValue::Float(sample[0] as f64 / 256.0)),
                    ("y", RecordValue::Float(sample[1] as f64 / 256.0)),
                    ("z", RecordValue::Float(sample[2] as f64 / 256.0)),
                ]),
            ))?;
        }
        Ok(())
    }
}

struct LightBlockProcessor {
    topic: String,
}

impl CwaBlockProcessor for LightBlockProcessor {
    fn process_block(
        &self,
        context: &ContentsContext,
        data: &CwaDataBlock,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        let lux = 10f64.powf((data.light as f64 + 512.0) * 3.0 / 512.0);
        sink.produce(TopicData::new(
            &self.topic,
            record_struct([
                ("time", RecordValue::Timestamp(data.start_time)),
                ("time_received", RecordValue::Timestamp(context.time_received)),
                ("light", RecordValue::Float(lux)),
            ]),
        ))
    }
}

struct BatteryBlockProcessor {
    topic: String,
}

impl CwaBlockProcessor for BatteryBlockProcessor {
    fn process_block(
        &self,
        context: &ContentsContext,
        data: &CwaDataBlock,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        let volts = (data.battery as f64 + 512.0) * 3.0 / 512.0;
        sink.produce(TopicData::new(
            &self.topic,
            record_struct([
                ("time", RecordValue::Timestamp(data.start_time)),
                ("time_received", RecordValue::Timestamp(context.time_received)),
                ("battery", RecordValue::Float(volts)),
            ]),
        ))
    }
}

struct TemperatureBlockProcessor {
    topic: String,
}

impl CwaBlockProcessor for TemperatureBlockProcessor {
    fn process_block(
        &self,
        context: &ContentsContext,
        data: &CwaDataBlock,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        let celsius = (data.temperature as f64 * 150.0 - 20500.0) / 1000.0;
        sink.produce(TopicData::new(
            &self.topic,
            record_struct([
                ("time", RecordValue::Timestamp(data.start_time)),
                ("time_received", RecordValue::Timestamp(context.time_received)),
                ("temperature", RecordValue::Float(celsius)),
            ]),
        ))
    }
}

struct EventsBlockProcessor {
    topic: String,
}

impl CwaBlockProcessor for EventsBlockProcessor {
    fn process_block(
        &self,
        context: &ContentsContext,
        data: &CwaDataBlock,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        for event in CwaEvent::from_bits(data.event_bits) {
            sink.produce(TopicData::new(
                &self.topic,
                record_struct([
                    ("time", RecordValue::Timestamp(data.start_time)),
                    ("time_received", RecordValue::Timestamp(context.time_received)),
                    ("event", RecordValue::String(event.as_str().to_string())),
                ]),
            ))?;
        }
        Ok(())
    }
}

/// Factory for the CWA decoder.
pub struct CwaProcessorFactory {
    topics: CwaTopics,
    acceleration: bool,
    light: bool,
    battery: bool,
    temperature: bool,
    events: bool,
}

impl CwaProcessorFactory {
    /// Create a factory with every block processor enabled.
    pub fn new() -> Self {
        Self {
            topics: CwaTopics::default(),
            acceleration: true,
            light: true,
            battery: true,
            temperature: true,
            events: true,
        }
    }

    /// Enable block processors from a source-type configuration.
    ///
    /// Keys `acceleration`, `light`, `battery`, `temperature`, and
    /// `events` each default to enabled.
    pub fn from_config(config: &SourceTypeConfig) -> Self {
        Self {
            topics: CwaTopics::default(),
            acceleration: config.flag("acceleration", true),
            light: config.flag("light", true),
            battery: config.flag("battery", true),
            temperature: config.flag("temperature", true),
            events: config.flag("events", true),
        }
    }

    /// Override the published topic names.
    pub fn with_topics(mut self, topics: CwaTopics) -> Self {
        self.topics = topics;
        self
    }
}

impl Default for CwaProcessorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProcessorFactory for CwaProcessorFactory {
    fn matches(&self, context: &ContentsContext) -> bool {
        context.has_suffix(".cwa") || context.has_content_type("application/cwa")
    }

    fn create_processor(&self, _context: &ContentsContext) -> Box<dyn FileProcessor> {
        let mut strategies: Vec<Box<dyn CwaBlockProcessor>> = Vec::new();
        if self.acceleration {
            strategies.push(Box::new(AccelerationBlockProcessor {
                topic: self.topics.acceleration.clone(),
            }));
        }
        if self.light {
            strategies.push(Box::new(LightBlockProcessor {
                topic: self.topics.light.clone(),
            }));
        }
        if self.battery {
            strategies.push(Box::new(BatteryBlockProcessor {
                topic: self.topics.battery.clone(),
            }));
        }
        if self.temperature {
            strategies.push(Box::new(TemperatureBlockProcessor {
                topic: self.topics.temperature.clone(),
            }));
        }
        if self.events {
            strategies.push(Box::new(EventsBlockProcessor {
                topic: self.topics.event.clone(),
            }));
        }
        Box::new(CwaFileProcessor {
            strategies,
            metadata_topic: self.topics.metadata.clone(),
        })
    }
}

/// Decoder for one CWA content item.
pub struct CwaFileProcessor {
    strategies: Vec<Box<dyn CwaBlockProcessor>>,
    metadata_topic: String,
}

impl CwaFileProcessor {
    fn emit_metadata(
        &self,
        context: &ContentsContext,
        sink: &mut dyn RecordSink,
        time: f64,
        name: &str,
        value: String,
    ) -> Result<()> {
        sink.produce(TopicData::new(
            &self.metadata_topic,
            record_struct([
                ("time", RecordValue::Timestamp(time)),
                ("time_received", RecordValue::Timestamp(context.time_received)),
                ("name", RecordValue::String(name.to_string())),
                ("value", RecordValue::String(value)),
            ]),
        ))
    }
}

impl FileProcessor for CwaFileProcessor {
    fn process(
        &mut self,
        context: &ContentsContext,
        input: &mut dyn Read,
        sink: &mut dyn RecordSink,
        _pipeline: &dyn ContentPipeline,
    ) -> Result<()> {
        let first = read_block(context, input)?.ok_or_else(|| {
            ConvertError::invalid_format(
                context.record_id,
                &context.file_name,
                "file is shorter than one CWA block",
            )
        })?;
        let header = match parse_block(&first) {
            Ok(CwaBlock::Metadata(metadata)) => metadata,
            _ => {
                return Err(ConvertError::invalid_format(
                    context.record_id,
                    &context.file_name,
                    "first block is not a CWA metadata header",
                ))
            }
        };

        let mut device_id = header.device_id;
        let mut session_id = header.session_id;
        let mut annotations: BTreeMap<String, String> = header.annotations.into_iter().collect();
        let mut first_sample_time: Option<f64> = None;
        let mut skipped_blocks = 0usize;

        while let Some(raw) = read_block(context, input)? {
            match parse_block(&raw) {
                Ok(CwaBlock::Metadata(metadata)) => {
                    device_id = metadata.device_id;
                    session_id = metadata.session_id;
                    annotations.extend(metadata.annotations);
                }
                Ok(CwaBlock::Data(data)) => {
                    if first_sample_time.is_none() && data.num_samples() > 0 {
                        first_sample_time = Some(data.sample_time(0));
                    }
                    for strategy in &self.strategies {
                        strategy.process_block(context, &data, sink)?;
                    }
                }
                Ok(CwaBlock::Other { block_type }) => {
                    skipped_blocks += 1;
                    context.logger.debug(&format!(
                        "skipping block type {:?}",
                        String::from_utf8_lossy(&block_type)
                    ));
                }
                Err(e) => {
                    skipped_blocks += 1;
                    context.logger.warn(&format!("skipping block: {e}"));
                }
            }
        }
        if skipped_blocks > 0 {
            context
                .logger
                .info(&format!("skipped {skipped_blocks} blocks"));
        }

        // Metadata takes the first data sample's time so it sorts
        // alongside the data it describes.
        let metadata_time = first_sample_time.unwrap_or(context.time_received);
        self.emit_metadata(context, sink, metadata_time, "deviceId", device_id.to_string())?;
        self.emit_metadata(context, sink, metadata_time, "sessionId", session_id.to_string())?;
        for (key, value) in annotations {
            self.emit_metadata(context, sink, metadata_time, &key, value)?;
        }
        Ok(())
    }
}

/// Read one full block, or nothing at a clean end of file.
///
/// A truncated trailing block is logged and dropped.
fn read_block(
    context: &ContentsContext,
    input: &mut dyn Read,
) -> Result<Option<[u8; CWA_BLOCK_SIZE]>> {
    let mut block = [0u8; CWA_BLOCK_SIZE];
    let mut filled = 0usize;
    while filled < CWA_BLOCK_SIZE {
        let n = input.read(&mut block[filled..]).map_err(|e| {
            ConvertError::io(context.record_id, &context.file_name, "reading CWA block", &e)
        })?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    match filled {
        0 => Ok(None),
        CWA_BLOCK_SIZE => Ok(Some(block)),
        _ => {
            context
                .logger
                .warn(&format!("dropping truncated trailing block of {filled} bytes"));
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bits_decode() {
        assert_eq!(CwaEvent::from_bits(0x01), vec![CwaEvent::Resume]);
        assert_eq!(
            CwaEvent::from_bits(0x22),
            vec![CwaEvent::SingleTap, CwaEvent::BufferOverflow]
        );
        assert_eq!(CwaEvent::from_bits(0x80), vec![CwaEvent::Unknown]);
        assert_eq!(
            CwaEvent::from_bits(0x41 | 0x08),
            vec![CwaEvent::Resume, CwaEvent::UnhandledInterrupt, CwaEvent::Unknown]
        );
        assert!(CwaEvent::from_bits(0).is_empty());
    }

    #[test]
    fn test_config_disables_processors() {
        let config = crate::core::config::SourceTypeConfig::named("axivity")
            .with("light", "false")
            .with("events", "false");
        let factory = CwaProcessorFactory::from_config(&config);
        assert!(factory.acceleration);
        assert!(!factory.light);
        assert!(!factory.events);
    }
}
