// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use uploadcodec::convert::RecordConverter;
use uploadcodec::core::{ContentsContext, ConvertError, TransportRecord};
use uploadcodec::formats::cwa::{checksum_word, pack_timestamp, CWA_BLOCK_SIZE};

/// Nominal time-received used by all test contexts.
pub const TIME_RECEIVED: f64 = 100.0;

/// Context for a top-level content item.
pub fn context(file_name: &str) -> ContentsContext {
    ContentsContext::new(1, 1, file_name, None, None, TIME_RECEIVED)
}

/// Convert bytes, expecting success; returns the emitted records.
pub fn convert_ok(
    converter: &RecordConverter,
    file_name: &str,
    bytes: &[u8],
) -> Vec<TransportRecord> {
    let mut records = Vec::new();
    converter
        .convert(&context(file_name), &mut &bytes[..], |record| {
            records.push(record);
            Ok(())
        })
        .unwrap_or_else(|e| panic!("conversion of {file_name} failed: {e}"));
    records
}

/// Convert bytes, expecting failure; returns the error and whatever was
/// emitted before it.
pub fn convert_err(
    converter: &RecordConverter,
    file_name: &str,
    bytes: &[u8],
) -> (ConvertError, Vec<TransportRecord>) {
    let mut records = Vec::new();
    let err = converter
        .convert(&context(file_name), &mut &bytes[..], |record| {
            records.push(record);
            Ok(())
        })
        .expect_err("conversion unexpectedly succeeded");
    (err, records)
}

/// Assert the end-of-record marker sits on exactly the last record.
pub fn assert_end_marker(records: &[TransportRecord]) {
    assert!(!records.is_empty(), "no records to check markers on");
    let (last, rest) = records.split_last().unwrap();
    assert!(last.end_of_record, "last record must be end-of-record");
    for record in rest {
        assert!(!record.end_of_record, "only the last record may be end-of-record");
    }
}

// ============================================================================
// Fixture Builders
// ============================================================================

/// Build an in-memory ZIP archive from (entry name, content) pairs.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(name.to_string(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Build a CWA metadata block.
pub fn cwa_metadata_block(device_id: u16, session_id: u32, annotations: &str) -> Vec<u8> {
    let mut block = vec![0u8; CWA_BLOCK_SIZE];
    block[0] = b'M';
    block[1] = b'D';
    block[5..7].copy_from_slice(&device_id.to_le_bytes());
    block[7..11].copy_from_slice(&session_id.to_le_bytes());
    block[64..64 + annotations.len()].copy_from_slice(annotations.as_bytes());
    block
}

/// Build a checksummed CWA data block.
///
/// Rate code 12 decodes to 400 Hz.
pub fn cwa_data_block(
    session_id: u32,
    sequence_id: u32,
    samples: &[[i16; 3]],
    event_bits: u8,
) -> Vec<u8> {
    let mut block = vec![0u8; CWA_BLOCK_SIZE];
    block[0] = b'A';
    block[1] = b'X';
    block[6..10].copy_from_slice(&session_id.to_le_bytes());
    block[10..14].copy_from_slice(&sequence_id.to_le_bytes());
    let timestamp = pack_timestamp(2018, 6, 1, 12, 0, sequence_id.min(59));
    block[14..18].copy_from_slice(&timestamp.to_le_bytes());
    block[18..20].copy_from_slice(&600u16.to_le_bytes()); // light
    block[20..22].copy_from_slice(&300u16.to_le_bytes()); // temperature
    block[22] = event_bits;
    block[23] = 128; // battery
    block[24] = 12; // rate code
    block[25] = 0x32; // 3 axes, 2 bytes per axis
    block[28..30].copy_from_slice(&(samples.len() as u16).to_le_bytes());
    let mut offset = 30;
    for sample in samples {
        for axis in sample {
            block[offset..offset + 2].copy_from_slice(&axis.to_le_bytes());
            offset += 2;
        }
    }
    let checksum = checksum_word(&block[..510]);
    block[510..512].copy_from_slice(&checksum.to_le_bytes());
    block
}
