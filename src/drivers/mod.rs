// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Level Drivers
//!
//! Drivers for the axis peripherals, written against `embedded-hal` traits so they can run on the
//! board and in host tests alike.
//!
//! ## Existing drivers
//!
//! - [`encoder`] – single-edge step encoder (channel A edge, channel B level)
//! - [`motor`] – DC motor bridges: PWM + direction pins (VNH7070) or PWM pair (ZXBM5210/TB67H451)
//! - [`endstop`] – travel-limit switch inputs
//! - [`line`] – single output line with configurable active level (notification line, LEDs)

pub mod encoder;
pub mod endstop;
pub mod line;
pub mod motor;

pub use encoder::{StepEncoder, StepSink};
pub use endstop::{EndstopState, Endstops, LimitSwitches};
pub use line::OutputLine;
pub use motor::{
    AdcSample, CurrentSense, CurrentSensor, DirPinDrive, DriveError, FaultInput, FaultPin,
    MotorDrive, PwmPairDrive,
};

/// Electrical level that means "asserted" for a digital line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    Low,
}
