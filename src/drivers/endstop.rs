// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Travel-limit switches.

use embedded_hal::digital::InputPin;

use super::ActiveLevel;

/// One sample of both limit switches.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndstopState {
    pub end_stop1: bool,
    pub end_stop2: bool,
}

impl EndstopState {
    #[inline]
    pub fn any(&self) -> bool {
        self.end_stop1 || self.end_stop2
    }
}

pub trait LimitSwitches {
    fn sample(&mut self) -> EndstopState;
}

/// Axis without limit switches.
impl LimitSwitches for () {
    fn sample(&mut self) -> EndstopState {
        EndstopState::default()
    }
}

/// Two switch inputs sharing one active level.
///
/// A switch whose input cannot be read is reported as triggered.
pub struct Endstops<A, B> {
    first: A,
    second: B,
    active: ActiveLevel,
}

impl<A: InputPin, B: InputPin> Endstops<A, B> {
    pub fn new(first: A, second: B, active: ActiveLevel) -> Self {
        Self {
            first,
            second,
            active,
        }
    }

    pub fn free(self) -> (A, B) {
        (self.first, self.second)
    }
}

fn triggered<P: InputPin>(pin: &mut P, active: ActiveLevel) -> bool {
    let level = match active {
        ActiveLevel::High => pin.is_high(),
        ActiveLevel::Low => pin.is_low(),
    };
    level.unwrap_or(true)
}

impl<A: InputPin, B: InputPin> LimitSwitches for Endstops<A, B> {
    fn sample(&mut self) -> EndstopState {
        EndstopState {
            end_stop1: triggered(&mut self.first, self.active),
            end_stop2: triggered(&mut self.second, self.active),
        }
    }
}
