// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # I2C Slave
//!
//! Hardware-independent slave protocol engine.
//!
//! - [`address`] - Address filters (single with mask, dual, range).
//! - [`slave`] - The byte engine, the [`SlaveHandler`] capability a device implements, and the
//!   [`SlaveBus`] register seam a peripheral implements.

pub mod address;
pub mod slave;

pub use address::AddressFilter;
pub use slave::{
    BusStatus, Direction, I2cSlaveEngine, ProtocolSession, RxResponse, SessionState, SlaveBus,
    SlaveHandler, FILLER,
};
