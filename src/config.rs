// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Axis configuration.
//!
//! Everything the firmware revisions used to hard-code per build lives in [`AxisConfig`]. The
//! defaults reproduce the closed-loop DC motor build: tolerance of 2 steps, speed floor of 50, a
//! 100 ms safety tick, no dead-man's switch, 7-bit telemetry and full interlocks.
//!
//! ```
//! use dcmotor_axis::config::{AddressConfig, AddressMode, AxisConfig};
//!
//! let cfg = AxisConfig::new()
//!     .with_unattended_ticks(20)
//!     .with_address(AddressConfig::new(0x60, AddressMode::Single));
//! assert!(cfg.validate().is_ok());
//! ```

use core::fmt;

use crate::i2c::AddressFilter;

/// Highest axis index the boot-time address pin can report (tri-state: 0, 1, 2).
pub const MAX_AXIS: u8 = 2;

/// Longest safety tick the one-shot tick timer can count (16-bit reload at 10 kHz).
pub const MAX_TICK_MS: u32 = 6553;

/// Lowest and highest non-reserved 7-bit addresses.
const ADDR_MIN: u8 = 0x08;
const ADDR_MAX: u8 = 0x77;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Resolved address falls outside `0x08..=0x77`.
    AddressOutOfRange(u8),
    /// Axis index larger than [`MAX_AXIS`].
    AxisOutOfRange(u8),
    /// Safety tick period of zero.
    ZeroTickPeriod,
    /// Safety tick period longer than [`MAX_TICK_MS`].
    TickPeriodTooLong(u32),
    /// Speed floor of zero would let the ramp stall short of the target.
    ZeroMinSpeed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::AddressOutOfRange(a) => {
                write!(f, "address 0x{:02X} is not a usable 7-bit address", a)
            }
            ConfigError::AxisOutOfRange(a) => write!(f, "axis index {} exceeds {}", a, MAX_AXIS),
            ConfigError::ZeroTickPeriod => f.write_str("safety tick period must be non-zero"),
            ConfigError::TickPeriodTooLong(ms) => {
                write!(f, "safety tick period {} ms exceeds {} ms", ms, MAX_TICK_MS)
            }
            ConfigError::ZeroMinSpeed => f.write_str("minimum speed must be non-zero"),
        }
    }
}

/// How the bus address is derived from the base address and the axis index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// `base + axis`, exact match.
    Single,
    /// `base + axis` with don't-care bits in `mask`.
    Masked { mask: u8 },
    /// `base` (shared by every axis) and `base + 1 + axis`.
    Dual,
    /// `base + axis ..= base + axis + span`.
    Range { span: u8 },
}

/// Base address plus the mode used to expand it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressConfig {
    pub base: u8,
    pub mode: AddressMode,
}

impl AddressConfig {
    pub const fn new(base: u8, mode: AddressMode) -> Self {
        Self { base, mode }
    }

    /// Resolve the address filter for a given axis.
    pub fn resolve(&self, axis: u8) -> Result<AddressFilter, ConfigError> {
        if axis > MAX_AXIS {
            return Err(ConfigError::AxisOutOfRange(axis));
        }

        let own = checked_address(self.base as u16 + axis as u16)?;

        Ok(match self.mode {
            AddressMode::Single => AddressFilter::Masked {
                address: own,
                mask: 0,
            },
            AddressMode::Masked { mask } => AddressFilter::Masked {
                address: own,
                mask: mask & 0x7F,
            },
            AddressMode::Dual => AddressFilter::Dual(
                checked_address(self.base as u16)?,
                checked_address(self.base as u16 + 1 + axis as u16)?,
            ),
            AddressMode::Range { span } => AddressFilter::Range {
                low: own,
                high: checked_address(own as u16 + span as u16)?,
            },
        })
    }
}

/// Axis index from the boot-time address pin, sampled once with the pull-up and once with the
/// pull-down enabled.
///
/// | Pin wiring | pulled up | pulled down | axis |
/// |------------|-----------|-------------|------|
/// | tied high  | high      | high        | 0    |
/// | tied low   | low       | low         | 1    |
/// | floating   | high      | low         | 2    |
pub fn axis_from_pin_levels(high_with_pull_up: bool, high_with_pull_down: bool) -> u8 {
    match (high_with_pull_up, high_with_pull_down) {
        (true, true) => 0,
        (false, false) => 1,
        _ => 2,
    }
}

fn checked_address(addr: u16) -> Result<u8, ConfigError> {
    if addr < ADDR_MIN as u16 || addr > ADDR_MAX as u16 {
        Err(ConfigError::AddressOutOfRange(addr.min(0xFF) as u8))
    } else {
        Ok(addr as u8)
    }
}

/// Which conditions gate the `running` flag.
///
/// Several firmware revisions computed `running` from the step difference alone. That behavior is
/// kept as [`InterlockPolicy::PositionOnly`]; the motor output stage still refuses to drive into
/// an endstop or with an error latched, whichever policy is selected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterlockPolicy {
    /// Speed, step difference, endstops and error flags.
    Full,
    /// Step difference only.
    PositionOnly,
}

/// Telemetry wire format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryEncoding {
    /// Seven payload bits per byte, high bit forced set.
    SevenBit,
    /// Record bytes verbatim.
    Raw,
}

/// Whether motion requires the SETUP/START sequencer to be running.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sequencing {
    /// Motion follows speed and target alone.
    Free,
    /// Motion additionally requires the sequencer to be RUNNING.
    Gated,
}

/// Per-axis configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConfig {
    /// Step difference at or below which the axis counts as on target.
    pub stop_tolerance: u32,
    /// Speed floor while running.
    pub min_speed: u8,
    /// Safety tick period.
    pub tick_ms: u32,
    /// Ticks without a speed command before speed is forced to zero. `None` disables.
    pub unattended_ticks: Option<u16>,
    pub interlock: InterlockPolicy,
    pub encoding: TelemetryEncoding,
    pub sequencing: Sequencing,
    pub address: AddressConfig,
}

impl AxisConfig {
    pub const fn new() -> Self {
        Self {
            stop_tolerance: 2,
            min_speed: 50,
            tick_ms: 100,
            unattended_ticks: None,
            interlock: InterlockPolicy::Full,
            encoding: TelemetryEncoding::SevenBit,
            sequencing: Sequencing::Free,
            address: AddressConfig::new(0x50, AddressMode::Single),
        }
    }

    pub const fn with_stop_tolerance(mut self, steps: u32) -> Self {
        self.stop_tolerance = steps;
        self
    }

    pub const fn with_min_speed(mut self, speed: u8) -> Self {
        self.min_speed = speed;
        self
    }

    pub const fn with_tick_ms(mut self, ms: u32) -> Self {
        self.tick_ms = ms;
        self
    }

    /// Enable the dead-man's switch.
    pub const fn with_unattended_ticks(mut self, ticks: u16) -> Self {
        self.unattended_ticks = Some(ticks);
        self
    }

    pub const fn with_interlock(mut self, policy: InterlockPolicy) -> Self {
        self.interlock = policy;
        self
    }

    pub const fn with_encoding(mut self, encoding: TelemetryEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub const fn with_sequencing(mut self, sequencing: Sequencing) -> Self {
        self.sequencing = sequencing;
        self
    }

    pub const fn with_address(mut self, address: AddressConfig) -> Self {
        self.address = address;
        self
    }

    /// Check the values that would make the control loop misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.tick_ms > MAX_TICK_MS {
            return Err(ConfigError::TickPeriodTooLong(self.tick_ms));
        }
        if self.min_speed == 0 {
            return Err(ConfigError::ZeroMinSpeed);
        }
        self.address.resolve(0).map(|_| ())
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mode_offsets_by_axis() {
        let cfg = AddressConfig::new(0x50, AddressMode::Single);
        assert_eq!(
            cfg.resolve(2),
            Ok(AddressFilter::Masked {
                address: 0x52,
                mask: 0
            })
        );
    }

    #[test]
    fn test_dual_mode_shares_base() {
        let cfg = AddressConfig::new(0x50, AddressMode::Dual);
        assert_eq!(cfg.resolve(1), Ok(AddressFilter::Dual(0x50, 0x52)));
    }

    #[test]
    fn test_range_mode_spans_from_axis_address() {
        let cfg = AddressConfig::new(0x60, AddressMode::Range { span: 3 });
        assert_eq!(
            cfg.resolve(1),
            Ok(AddressFilter::Range {
                low: 0x61,
                high: 0x64
            })
        );
    }

    #[test]
    fn test_rejects_bad_axis_and_address() {
        let cfg = AddressConfig::new(0x50, AddressMode::Single);
        assert_eq!(cfg.resolve(3), Err(ConfigError::AxisOutOfRange(3)));

        let cfg = AddressConfig::new(0x76, AddressMode::Range { span: 4 });
        assert_eq!(cfg.resolve(0), Err(ConfigError::AddressOutOfRange(0x7A)));

        let cfg = AddressConfig::new(0x02, AddressMode::Single);
        assert_eq!(cfg.resolve(0), Err(ConfigError::AddressOutOfRange(0x02)));
    }

    #[test]
    fn test_address_pin_levels() {
        assert_eq!(axis_from_pin_levels(true, true), 0);
        assert_eq!(axis_from_pin_levels(false, false), 1);
        assert_eq!(axis_from_pin_levels(true, false), 2);
    }

    #[test]
    fn test_validate_defaults_and_zero_values() {
        assert_eq!(AxisConfig::new().validate(), Ok(()));
        assert_eq!(
            AxisConfig::new().with_tick_ms(0).validate(),
            Err(ConfigError::ZeroTickPeriod)
        );
        assert_eq!(
            AxisConfig::new().with_min_speed(0).validate(),
            Err(ConfigError::ZeroMinSpeed)
        );
    }

    #[test]
    fn test_validate_tick_period_limit() {
        assert_eq!(
            AxisConfig::new().with_tick_ms(MAX_TICK_MS).validate(),
            Ok(())
        );
        assert_eq!(
            AxisConfig::new().with_tick_ms(MAX_TICK_MS + 1).validate(),
            Err(ConfigError::TickPeriodTooLong(MAX_TICK_MS + 1))
        );
        assert_eq!(
            AxisConfig::new().with_tick_ms(u32::MAX).validate(),
            Err(ConfigError::TickPeriodTooLong(u32::MAX))
        );
    }
}
