// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single digital output with a configurable active level.
//!
//! Used for the attention line to the bus master (push-pull, active low) and the status LED.

use embedded_hal::digital::OutputPin;

use super::ActiveLevel;

/// Output line that remembers its active level and last driven state.
pub struct OutputLine<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    asserted: bool,
}

impl<PIN: OutputPin> OutputLine<PIN> {
    /// Wrap `pin`, driving it to the released level.
    pub fn new(mut pin: PIN, active: ActiveLevel) -> Self {
        match active {
            ActiveLevel::High => pin.set_low().ok(),
            ActiveLevel::Low => pin.set_high().ok(),
        };
        Self {
            pin,
            active,
            asserted: false,
        }
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the line logically asserted (true) or released (false).
    pub fn set(&mut self, asserted: bool) {
        match (self.active, asserted) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high().ok(),
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low().ok(),
        };
        self.asserted = asserted;
    }

    #[inline]
    pub fn assert(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn release(&mut self) {
        self.set(false);
    }

    #[inline]
    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}
