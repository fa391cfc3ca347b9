// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Telemetry wire encodings.
//!
//! The slave peripheral can corrupt bits of a data byte sent right before STOP. The workaround is
//! to carry only seven payload bits per wire byte and force the eighth (the high bit) to a fixed
//! marker. Wire byte `n` carries bits `n*7 ..= n*7 + 6` of the little-endian record, LSB first;
//! bits past the end of the record read as zero. The master undoes this with
//! [`decode_seven_bit`].
//!
//! [`TelemetryEncoding::Raw`] sends the record bytes unchanged, for masters that do not know the
//! repacked format.

use crate::config::TelemetryEncoding;
use crate::protocol::telemetry::RECORD_LEN;

/// High bit set on every 7-bit wire byte.
pub const MARKER: u8 = 0x80;

/// Number of wire bytes needed to carry a record in the 7-bit encoding.
pub const SEVEN_BIT_LEN: usize = (RECORD_LEN * 8 + 6) / 7;

/// Wire length of a full record for a given encoding.
pub const fn wire_len(encoding: TelemetryEncoding) -> usize {
    match encoding {
        TelemetryEncoding::SevenBit => SEVEN_BIT_LEN,
        TelemetryEncoding::Raw => RECORD_LEN,
    }
}

/// The seven payload bits of wire byte `n`, in the low bits of the result.
pub fn seven_bit_payload(record: &[u8], n: usize) -> u8 {
    let mut out = 0u8;
    for i in 0..7 {
        let bit = n * 7 + i;
        let byte_index = bit >> 3;
        let bit_index = bit & 7;
        let value = record
            .get(byte_index)
            .map_or(0, |&b| (b >> bit_index) & 1);
        out |= value << i;
    }
    out
}

/// Wire byte `index` of `record`, or `None` once the record is exhausted.
pub fn encode_byte(encoding: TelemetryEncoding, record: &[u8], index: usize) -> Option<u8> {
    match encoding {
        TelemetryEncoding::Raw => record.get(index).copied(),
        TelemetryEncoding::SevenBit => {
            if index * 7 < record.len() * 8 {
                Some(MARKER | seven_bit_payload(record, index))
            } else {
                None
            }
        }
    }
}

/// Inverse of the 7-bit encoding: rebuild the record bytes from the wire bytes.
///
/// Marker bits are ignored. Missing wire bytes leave the corresponding record bits zero.
pub fn decode_seven_bit(wire: &[u8]) -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    for (n, &w) in wire.iter().enumerate() {
        for i in 0..7 {
            let bit = n * 7 + i;
            let byte_index = bit >> 3;
            if byte_index >= RECORD_LEN {
                break;
            }
            out[byte_index] |= ((w >> i) & 1) << (bit & 7);
        }
    }
    out
}
