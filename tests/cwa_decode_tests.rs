// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tests for the Axivity CWA binary decoder.
//!
//! Run with: cargo test --test cwa_decode_tests

mod common;

use common::{assert_end_marker, convert_err, convert_ok, cwa_data_block, cwa_metadata_block, zip_bytes};

use uploadcodec::convert::TempFileCache;
use uploadcodec::core::{ConvertError, RecordValue, SourceTypeConfig, TransportRecord};
use uploadcodec::registry::converter_for;

const SAMPLES: [[i16; 3]; 4] = [[256, -512, 0], [128, 0, 256], [0, 0, 256], [-256, 256, 0]];

fn acceleration_only_config() -> SourceTypeConfig {
    SourceTypeConfig::named("axivity")
        .with("light", "false")
        .with("battery", "false")
        .with("temperature", "false")
        .with("events", "false")
}

fn converter(config: &SourceTypeConfig) -> uploadcodec::convert::RecordConverter {
    converter_for(config, TempFileCache::system_default()).unwrap()
}

/// Metadata header plus `blocks` data blocks of four samples each.
fn cwa_file(blocks: u32, event_bits: u8) -> Vec<u8> {
    let mut bytes = cwa_metadata_block(42, 9001, "subject=A12&site=wrist");
    for sequence in 0..blocks {
        bytes.extend(cwa_data_block(9001, sequence, &SAMPLES, event_bits));
    }
    bytes
}

fn topic_count(records: &[TransportRecord], topic: &str) -> usize {
    records.iter().filter(|r| r.data.topic == topic).count()
}

#[test]
fn test_acceleration_records_per_sample() {
    let records = convert_ok(
        &converter(&acceleration_only_config()),
        "log.cwa",
        &cwa_file(3, 0),
    );
    // 3 blocks x 4 samples, plus deviceId, sessionId, and two annotations.
    assert_eq!(records.len(), 16);
    assert_end_marker(&records);
    assert_eq!(topic_count(&records, "wearable_axivity_acceleration"), 12);
    assert_eq!(topic_count(&records, "wearable_axivity_metadata"), 4);

    let first = records[0].data.value.as_struct().unwrap();
    assert_eq!(first["x"], RecordValue::Float(1.0));
    assert_eq!(first["y"], RecordValue::Float(-2.0));
    assert_eq!(first["z"], RecordValue::Float(0.0));
}

#[test]
fn test_sample_times_distributed_across_block() {
    let records = convert_ok(
        &converter(&acceleration_only_config()),
        "log.cwa",
        &cwa_file(1, 0),
    );
    let times: Vec<f64> = records
        .iter()
        .filter(|r| r.data.topic == "wearable_axivity_acceleration")
        .map(|r| {
            r.data.value.as_struct().unwrap()["time"]
                .as_f64()
                .unwrap()
        })
        .collect();
    assert_eq!(times.len(), 4);
    // 400 Hz spacing from the block start.
    for pair in times.windows(2) {
        assert!((pair[1] - pair[0] - 0.0025).abs() < 1e-9);
    }
}

#[test]
fn test_metadata_uses_first_sample_time() {
    let records = convert_ok(
        &converter(&acceleration_only_config()),
        "log.cwa",
        &cwa_file(2, 0),
    );
    let first_sample_time = records[0].data.value.as_struct().unwrap()["time"]
        .as_f64()
        .unwrap();
    for record in records.iter().filter(|r| r.data.topic == "wearable_axivity_metadata") {
        let fields = record.data.value.as_struct().unwrap();
        assert_eq!(fields["time"], RecordValue::Timestamp(first_sample_time));
    }
    let names: Vec<&str> = records
        .iter()
        .filter(|r| r.data.topic == "wearable_axivity_metadata")
        .map(|r| r.data.value.as_struct().unwrap()["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["deviceId", "sessionId", "site", "subject"]);
}

#[test]
fn test_all_block_processors_enabled() {
    let records = convert_ok(
        &converter(&SourceTypeConfig::named("axivity")),
        "log.cwa",
        &cwa_file(3, 0),
    );
    assert_eq!(topic_count(&records, "wearable_axivity_acceleration"), 12);
    assert_eq!(topic_count(&records, "wearable_axivity_light"), 3);
    assert_eq!(topic_count(&records, "wearable_axivity_battery_level"), 3);
    assert_eq!(topic_count(&records, "wearable_axivity_temperature"), 3);
    assert_eq!(topic_count(&records, "wearable_axivity_event"), 0);
    assert_eq!(topic_count(&records, "wearable_axivity_metadata"), 4);
}

#[test]
fn test_event_bits_emit_named_events() {
    // Resume plus an unassigned bit.
    let records = convert_ok(
        &converter(&SourceTypeConfig::named("axivity")),
        "log.cwa",
        &cwa_file(1, 0x81),
    );
    let events: Vec<&str> = records
        .iter()
        .filter(|r| r.data.topic == "wearable_axivity_event")
        .map(|r| r.data.value.as_struct().unwrap()["event"].as_str().unwrap())
        .collect();
    assert_eq!(events, ["RESUME", "UNKNOWN"]);
}

#[test]
fn test_corrupt_block_skipped_not_fatal() {
    let mut bytes = cwa_file(3, 0);
    // Flip a byte inside the second data block's sample area.
    let corrupt_at = 512 + 512 + 100;
    bytes[corrupt_at] ^= 0xFF;
    let records = convert_ok(&converter(&acceleration_only_config()), "log.cwa", &bytes);
    assert_eq!(topic_count(&records, "wearable_axivity_acceleration"), 8);
    assert_end_marker(&records);
}

#[test]
fn test_missing_metadata_header_is_invalid_format() {
    let bytes = cwa_data_block(9001, 0, &SAMPLES, 0);
    let (err, _) = convert_err(&converter(&acceleration_only_config()), "log.cwa", &bytes);
    assert!(matches!(err, ConvertError::InvalidFormat { .. }));
}

#[test]
fn test_short_file_is_invalid_format() {
    let (err, _) = convert_err(
        &converter(&acceleration_only_config()),
        "log.cwa",
        &[0u8; 100],
    );
    assert!(matches!(err, ConvertError::InvalidFormat { .. }));
}

#[test]
fn test_cwa_inside_zip_through_registry() {
    let archive = zip_bytes(&[("log.cwa", &cwa_file(2, 0))]);
    let records = convert_ok(
        &converter(&acceleration_only_config()),
        "upload.zip",
        &archive,
    );
    assert_eq!(topic_count(&records, "wearable_axivity_acceleration"), 8);
    assert_eq!(topic_count(&records, "wearable_axivity_metadata"), 4);
    assert_end_marker(&records);
}

#[test]
fn test_rerun_is_idempotent() {
    let converter = converter(&SourceTypeConfig::named("axivity"));
    let bytes = cwa_file(2, 0x02);
    let first = convert_ok(&converter, "log.cwa", &bytes);
    let second = convert_ok(&converter, "log.cwa", &bytes);
    assert_eq!(first, second);
}
