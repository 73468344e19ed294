// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tests for the CSV decode engine.
//!
//! Run with: cargo test --test csv_decode_tests

mod common;

use common::{assert_end_marker, convert_err, convert_ok, TIME_RECEIVED};

use uploadcodec::convert::TempFileCache;
use uploadcodec::core::{ConvertError, RecordValue, SourceTypeConfig};
use uploadcodec::registry::converter_for;

fn converter(config: SourceTypeConfig) -> uploadcodec::convert::RecordConverter {
    converter_for(&config, TempFileCache::system_default()).unwrap()
}

fn acceleration_converter() -> uploadcodec::convert::RecordConverter {
    converter(SourceTypeConfig::named("phone-acceleration"))
}

const FOUR_ROWS: &str = "\
timestamp,x,y,z
1000,0.1,0.2,9.8
2000,0.2,0.3,9.7
3000,0.3,0.4,9.6
4000,0.4,0.5,9.5
";

#[test]
fn test_four_rows_yield_four_records() {
    let records = convert_ok(&acceleration_converter(), "acc.csv", FOUR_ROWS.as_bytes());
    assert_eq!(records.len(), 4);
    assert_end_marker(&records);
    for record in &records {
        assert_eq!(record.data.topic, "phone_acceleration");
        assert_eq!(record.record_id, 1);
    }
    let first = records[0].data.value.as_struct().unwrap();
    assert_eq!(first["time"], RecordValue::Timestamp(1.0));
    assert_eq!(first["time_received"], RecordValue::Timestamp(TIME_RECEIVED));
    assert_eq!(first["x"], RecordValue::Float(0.1));
}

#[test]
fn test_wrong_header_is_invalid_format() {
    let contents = "TIMESTAMP,NOTX,Y,Z\n1000,0.1,0.2,9.8\n";
    let (err, records) = convert_err(&acceleration_converter(), "acc.csv", contents.as_bytes());
    assert!(matches!(err, ConvertError::InvalidFormat { .. }));
    assert!(records.is_empty());
}

#[test]
fn test_invalid_rows_are_skipped_not_fatal() {
    let contents = "\
TIMESTAMP,X,Y,Z
1000,0.1,0.2,9.8
2000,0.2,0.3
3000,,0.4,9.6
not-a-time,0.3,0.4,9.6
4000,0.4,0.5,9.5
";
    let records = convert_ok(&acceleration_converter(), "acc.csv", contents.as_bytes());
    // Short row, empty field, and unparseable timestamp all drop.
    assert_eq!(records.len(), 2);
    assert_end_marker(&records);
}

#[test]
fn test_suffix_mismatch_is_processor_not_found() {
    let (err, _) = convert_err(&acceleration_converter(), "acc.dat", FOUR_ROWS.as_bytes());
    assert!(matches!(err, ConvertError::ProcessorNotFound { .. }));
}

#[test]
fn test_empty_required_file_is_invalid_format() {
    let (err, _) = convert_err(&acceleration_converter(), "acc.csv", b"");
    assert!(matches!(err, ConvertError::InvalidFormat { .. }));
}

#[test]
fn test_empty_optional_file_emits_nothing() {
    let config = SourceTypeConfig::named("phone-acceleration").with("optional", "true");
    let records = convert_ok(&converter(config), "acc.csv", b"");
    assert!(records.is_empty());
}

#[test]
fn test_one_to_many_usage_events() {
    let config =
        SourceTypeConfig::named("phone-acceleration").with("usage_event_topic", "phone_usage");
    let records = convert_ok(&converter(config), "acc.csv", FOUR_ROWS.as_bytes());
    assert_eq!(records.len(), 8);
    assert_end_marker(&records);
    let usage: Vec<_> = records
        .iter()
        .filter(|r| r.data.topic == "phone_usage")
        .collect();
    assert_eq!(usage.len(), 4);
    assert!(records.last().unwrap().data.topic == "phone_usage");
}

#[test]
fn test_rerun_is_idempotent() {
    let converter = acceleration_converter();
    let first = convert_ok(&converter, "acc.csv", FOUR_ROWS.as_bytes());
    let second = convert_ok(&converter, "acc.csv", FOUR_ROWS.as_bytes());
    assert_eq!(first, second);
}
