// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Bus Protocol
//!
//! Byte-level formats exchanged with the bus master.
//!
//! ## Modules
//!
//! - [`command`] - Inbound command frames: tags, payload sizes, frame assembly.
//! - [`telemetry`] - The fixed 12-byte telemetry record.
//! - [`codec`] - Telemetry wire encodings (raw and 7-bit repacked) and the inverse transform.

pub mod codec;
pub mod command;
pub mod telemetry;

pub use command::{Command, CommandFrame, CommandTag, FrameError};
pub use telemetry::{ErrorFlags, TelemetryRecord};
