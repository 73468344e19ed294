// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CWA block parsing.
//!
//! An Axivity CWA file is a sequence of fixed 512-byte blocks, the type
//! identified by the first two ASCII bytes:
//!
//! - `MD`: metadata block with device id, session id, free-form annotations
//! - `AX`: data block with timestamp, sample rate, packed tri-axis samples,
//!   battery/light/temperature readings, event bit-flags
//!
//! # Data Block Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 2    | block type `AX` |
//! | 2      | 2    | packet length |
//! | 6      | 4    | session id |
//! | 10     | 4    | sequence id |
//! | 14     | 4    | packed timestamp |
//! | 18     | 2    | light (lower 10 bits) |
//! | 20     | 2    | temperature (lower 10 bits) |
//! | 22     | 1    | event bit-flags |
//! | 23     | 1    | battery |
//! | 24     | 1    | coded sample rate |
//! | 25     | 1    | axes / bytes-per-sample code |
//! | 28     | 2    | sample count |
//! | 30     | 480  | packed int16 samples, 3 axes per sample |
//! | 510    | 2    | checksum |
//!
//! The checksum is a 16-bit word sum over the whole block that must come
//! out to zero. Each parse produces an owned block value; nothing is
//! reused across reads.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::NaiveDate;
use thiserror::Error;

/// Fixed size of every CWA block.
pub const CWA_BLOCK_SIZE: usize = 512;

/// Axes per packed sample.
pub const NUM_AXES_PER_SAMPLE: usize = 3;

/// Offset of the annotation region in a metadata block.
const ANNOTATION_OFFSET: usize = 64;

/// Error parsing one CWA block.
#[derive(Debug, Clone, Error)]
pub enum CwaError {
    /// The block failed its word-sum checksum.
    #[error("data block {sequence_id} failed checksum")]
    BadChecksum {
        /// Sequence id of the failing block
        sequence_id: u32,
    },
    /// The packed timestamp does not denote a valid date-time.
    #[error("data block {sequence_id} has invalid packed timestamp")]
    BadTimestamp {
        /// Sequence id of the failing block
        sequence_id: u32,
    },
    /// The coded sample rate is zero.
    #[error("data block {sequence_id} declares a zero sample rate")]
    ZeroSampleRate {
        /// Sequence id of the failing block
        sequence_id: u32,
    },
    /// The declared sample count exceeds what a block can hold.
    #[error("data block {sequence_id} declares {declared} samples, more than fit in a block")]
    TooManySamples {
        /// Sequence id of the failing block
        sequence_id: u32,
        /// Declared sample count
        declared: usize,
    },
}

/// One decoded 512-byte block.
#[derive(Debug, Clone, PartialEq)]
pub enum CwaBlock {
    /// Device/session/annotation metadata; emits no sample records.
    Metadata(CwaMetadataBlock),
    /// Packed samples plus sensor readings.
    Data(CwaDataBlock),
    /// Any other block type, skipped.
    Other {
        /// The first two bytes of the block
        block_type: [u8; 2],
    },
}

/// Metadata accumulated from an `MD` block.
#[derive(Debug, Clone, PartialEq)]
pub struct CwaMetadataBlock {
    /// Device hardware id
    pub device_id: u16,
    /// Recording session id
    pub session_id: u32,
    /// Free-form key/value annotations
    pub annotations: Vec<(String, String)>,
}

/// Samples and readings from an `AX` block.
#[derive(Debug, Clone, PartialEq)]
pub struct CwaDataBlock {
    /// Recording session id
    pub session_id: u32,
    /// Monotonic block sequence id
    pub sequence_id: u32,
    /// Block start, seconds since the Unix epoch
    pub start_time: f64,
    /// Samples per second
    pub sample_rate: f64,
    /// Raw tri-axis samples, 1/256 g units
    pub samples: Vec<[i16; NUM_AXES_PER_SAMPLE]>,
    /// Raw light reading (10 bits)
    pub light: u16,
    /// Raw temperature reading (10 bits)
    pub temperature: u16,
    /// Raw battery level
    pub battery: u8,
    /// Event bit-flags
    pub event_bits: u8,
}

impl CwaDataBlock {
    /// Declared number of samples in this block.
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Absolute timestamp of one sample, distributing samples at
    /// `1/rate` spacing from the block start.
    pub fn sample_time(&self, index: usize) -> f64 {
        self.start_time + index as f64 / self.sample_rate
    }
}

/// Parse one block. The caller hands in exactly [`CWA_BLOCK_SIZE`] bytes.
pub fn parse_block(block: &[u8; CWA_BLOCK_SIZE]) -> Result<CwaBlock, CwaError> {
    match &block[0..2] {
        b"MD" => Ok(CwaBlock::Metadata(parse_metadata(block))),
        b"AX" => parse_data(block).map(CwaBlock::Data),
        other => Ok(CwaBlock::Other {
            block_type: [other[0], other[1]],
        }),
    }
}

fn parse_metadata(block: &[u8; CWA_BLOCK_SIZE]) -> CwaMetadataBlock {
    let mut cursor = Cursor::new(&block[5..11]);
    // Reads over an in-bounds slice cannot fail.
    let device_id = cursor.read_u16::<LittleEndian>().unwrap_or(0);
    let session_id = cursor.read_u32::<LittleEndian>().unwrap_or(0);
    CwaMetadataBlock {
        device_id,
        session_id,
        annotations: parse_annotations(&block[ANNOTATION_OFFSET..]),
    }
}

/// Split the annotation region into `key=value` pairs.
///
/// Pairs are `&`-separated; `0xFF` and space padding is trimmed. Keys
/// are kept verbatim.
fn parse_annotations(region: &[u8]) -> Vec<(String, String)> {
    let text: String = region
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if b == 0xFF { ' ' } else { b as char })
        .collect();
    text.split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

fn parse_data(block: &[u8; CWA_BLOCK_SIZE]) -> Result<CwaDataBlock, CwaError> {
    let mut cursor = Cursor::new(&block[..]);
    cursor.set_position(6);
    let session_id = cursor.read_u32::<LittleEndian>().unwrap_or(0);
    let sequence_id = cursor.read_u32::<LittleEndian>().unwrap_or(0);

    if word_sum(block) != 0 {
        return Err(CwaError::BadChecksum { sequence_id });
    }

    let packed_timestamp = cursor.read_u32::<LittleEndian>().unwrap_or(0);
    let light = cursor.read_u16::<LittleEndian>().unwrap_or(0) & 0x03FF;
    let temperature = cursor.read_u16::<LittleEndian>().unwrap_or(0) & 0x03FF;
    let event_bits = cursor.read_u8().unwrap_or(0);
    let battery = cursor.read_u8().unwrap_or(0);
    let rate_code = cursor.read_u8().unwrap_or(0);
    let _axes_bps = cursor.read_u8().unwrap_or(0);
    cursor.set_position(28);
    let sample_count = cursor.read_u16::<LittleEndian>().unwrap_or(0) as usize;

    let start_time =
        unpack_timestamp(packed_timestamp).ok_or(CwaError::BadTimestamp { sequence_id })?;
    let sample_rate = decode_sample_rate(rate_code);
    if sample_rate == 0.0 {
        return Err(CwaError::ZeroSampleRate { sequence_id });
    }

    let max_samples = (CWA_BLOCK_SIZE - 32) / (2 * NUM_AXES_PER_SAMPLE);
    if sample_count > max_samples {
        return Err(CwaError::TooManySamples {
            sequence_id,
            declared: sample_count,
        });
    }

    cursor.set_position(30);
    let mut samples = Vec::with_capacity(sample_count);
    for _ in 0..sample_count {
        let mut sample = [0i16; NUM_AXES_PER_SAMPLE];
        for axis in &mut sample {
            *axis = cursor.read_i16::<LittleEndian>().unwrap_or(0);
        }
        samples.push(sample);
    }

    Ok(CwaDataBlock {
        session_id,
        sequence_id,
        start_time,
        sample_rate,
        samples,
        light,
        temperature,
        battery,
        event_bits,
    })
}

/// 16-bit word sum over the whole block; a valid block sums to zero.
fn word_sum(block: &[u8; CWA_BLOCK_SIZE]) -> u16 {
    block
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .fold(0u16, |sum, word| sum.wrapping_add(word))
}

/// Compute the checksum word that makes a block sum to zero.
///
/// Fixture helper for tests and the inverse of [`word_sum`].
pub fn checksum_word(block_without_checksum: &[u8]) -> u16 {
    let sum = block_without_checksum
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .fold(0u16, |sum, word| sum.wrapping_add(word));
    0u16.wrapping_sub(sum)
}

/// Decode the packed device timestamp into seconds since the Unix epoch.
///
/// Bit layout, most significant first: year-since-2000 (6), month (4),
/// day (5), hours (5), minutes (6), seconds (6).
fn unpack_timestamp(packed: u32) -> Option<f64> {
    let year = 2000 + ((packed >> 26) & 0x3F) as i32;
    let month = ((packed >> 22) & 0x0F) as u32;
    let day = ((packed >> 17) & 0x1F) as u32;
    let hours = ((packed >> 12) & 0x1F) as u32;
    let minutes = ((packed >> 6) & 0x3F) as u32;
    let seconds = (packed & 0x3F) as u32;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = date.and_hms_opt(hours, minutes, seconds)?;
    Some(time.and_utc().timestamp() as f64)
}

/// Pack a date-time into the device timestamp format. Fixture helper.
pub fn pack_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
) -> u32 {
    (((year - 2000) as u32 & 0x3F) << 26)
        | ((month & 0x0F) << 22)
        | ((day & 0x1F) << 17)
        | ((hours & 0x1F) << 12)
        | ((minutes & 0x3F) << 6)
        | (seconds & 0x3F)
}

/// Coded sample rate: `3200 / 2^(15 - (code & 15))` Hz. A zero code
/// means the device never configured a rate.
fn decode_sample_rate(code: u8) -> f64 {
    if code == 0 {
        return 0.0;
    }
    let shift = 15 - (code & 0x0F);
    3200.0 / (1u32 << shift) as f64
}
