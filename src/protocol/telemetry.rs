// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Telemetry record returned on master reads.
//!
//! Byte layout (little endian, 12 bytes):
//!
//! | Offset | Field |
//! | ------ | ----- |
//! | 0      | commanded speed |
//! | 1      | bit 0 running, bit 1 endstop 1, bit 2 endstop 2, bits 3..7 error flags |
//! | 2..6   | actual steps (`i32`) |
//! | 6..10  | target steps (`i32`) |
//! | 10..12 | motor current in mA (`i16`) |

/// Encoded record size in bytes.
pub const RECORD_LEN: usize = 12;

/// Latched error flags (5 bits on the wire).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorFlags {
    raw: u8,
}

impl ErrorFlags {
    /// Motor driver reported a fault on its fault input.
    pub const DRIVER_FAULT: u8 = 1 << 0;
    /// A write to the PWM or direction outputs failed.
    pub const DRIVE_IO: u8 = 1 << 1;

    const MASK: u8 = 0x1F;

    #[inline]
    pub const fn from_raw(raw: u8) -> Self {
        Self {
            raw: raw & Self::MASK,
        }
    }

    #[inline]
    pub fn raw(&self) -> u8 {
        self.raw
    }

    #[inline]
    pub fn is_clear(&self) -> bool {
        self.raw == 0
    }

    #[inline]
    pub fn driver_fault(&self) -> bool {
        (self.raw & Self::DRIVER_FAULT) != 0
    }

    #[inline]
    pub fn drive_io(&self) -> bool {
        (self.raw & Self::DRIVE_IO) != 0
    }

    #[inline]
    pub fn latch(&mut self, flag: u8) {
        self.raw |= flag & Self::MASK;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.raw = 0;
    }
}

/// Snapshot of the axis state as the master sees it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryRecord {
    pub speed: u8,
    pub running: bool,
    pub end_stop1: bool,
    pub end_stop2: bool,
    pub error: ErrorFlags,
    pub actual_steps: i32,
    pub target_steps: i32,
    pub current_ma: i16,
}

impl TelemetryRecord {
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0] = self.speed;
        out[1] = (self.running as u8)
            | (self.end_stop1 as u8) << 1
            | (self.end_stop2 as u8) << 2
            | self.error.raw() << 3;
        out[2..6].copy_from_slice(&self.actual_steps.to_le_bytes());
        out[6..10].copy_from_slice(&self.target_steps.to_le_bytes());
        out[10..12].copy_from_slice(&self.current_ma.to_le_bytes());
        out
    }

    pub fn from_bytes(b: &[u8; RECORD_LEN]) -> Self {
        Self {
            speed: b[0],
            running: b[1] & 1 != 0,
            end_stop1: b[1] & (1 << 1) != 0,
            end_stop2: b[1] & (1 << 2) != 0,
            error: ErrorFlags::from_raw(b[1] >> 3),
            actual_steps: i32::from_le_bytes([b[2], b[3], b[4], b[5]]),
            target_steps: i32::from_le_bytes([b[6], b[7], b[8], b[9]]),
            current_ma: i16::from_le_bytes([b[10], b[11]]),
        }
    }
}
