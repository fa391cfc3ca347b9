// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # DC Motor Axis Firmware
//!
//! Firmware for a closed-loop DC motor axis controller that sits on an I2C bus as a slave. The
//! master sends speed and position commands and reads back a telemetry record; the axis closes the
//! loop on a single-edge step encoder and stops at its limit switches.
//!
//! Everything except [`hw`] is hardware-independent and runs in host tests.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`i2c`] | Interrupt-driven I2C slave byte engine and address filters |
//! | [`protocol`] | Command frames, telemetry record, wire encodings |
//! | [`control`] | Control law, sequencer, axis device |
//! | [`drivers`] | Motor bridges, step encoder, endstops, output lines |
//! | [`config`] | Per-axis configuration and address resolution |
//! | [`axis`] | Glue binding one engine, device and encoder to the three interrupt sources |
//! | [`sync`] | Interrupt-shared state |
//! | `hw` | STM32F777 peripheral bindings (`board` feature) |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod log;

pub mod axis;
pub mod config;
pub mod control;
pub mod drivers;
#[cfg(feature = "board")]
pub mod hw;
pub mod i2c;
pub mod protocol;
pub mod sync;

pub use axis::Axis;
pub use config::{AxisConfig, ConfigError};
pub use control::DeviceController;
pub use i2c::I2cSlaveEngine;
