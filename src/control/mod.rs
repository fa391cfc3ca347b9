// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Axis Control
//!
//! Closed-loop position control for one DC-motor axis.
//!
//! ## Modules
//!
//! - [`law`] - Bounded proportional speed profile and the safety interlock.
//! - [`sequencer`] - SETUP / START / STOP state machine with a time-budget fallback.
//! - [`device`] - The axis device: command dispatch, telemetry, periodic tick.

pub mod device;
pub mod law;
pub mod sequencer;

pub use device::{ControlState, DeviceController};
pub use law::{ControlMode, LawInput, LawOutput};
pub use sequencer::{Phase, Sequencer, Stopwatch};
