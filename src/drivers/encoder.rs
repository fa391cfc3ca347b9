// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-edge step encoder.
//!
//! Only the rising edge of channel A raises an interrupt; channel B is sampled at that moment.
//! B high means one step backwards, B low one step forwards. This counts half the edges a full
//! 4x quadrature decoder would, and there is no debouncing beyond the edge-sense configuration.

use embedded_hal::digital::InputPin;

/// Consumer of step deltas.
pub trait StepSink {
    fn add_steps(&mut self, delta: i32);
}

/// Step delta for a channel-A rising edge, given the level of channel B.
#[inline]
pub const fn step_delta(channel_b_high: bool) -> i32 {
    if channel_b_high {
        -1
    } else {
        1
    }
}

pub struct StepEncoder<B> {
    channel_b: B,
}

impl<B: InputPin> StepEncoder<B> {
    pub fn new(channel_b: B) -> Self {
        Self { channel_b }
    }

    /// Handle a channel-A rising edge. Returns the delta reported to `sink`, or `None` if
    /// channel B could not be read, in which case the edge is dropped.
    pub fn on_rising_edge<S: StepSink>(&mut self, sink: &mut S) -> Option<i32> {
        let delta = step_delta(self.channel_b.is_high().ok()?);
        sink.add_steps(delta);
        Some(delta)
    }

    pub fn free(self) -> B {
        self.channel_b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct Level(bool);

    impl ErrorType for Level {
        type Error = Infallible;
    }

    impl InputPin for Level {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    #[derive(Default)]
    struct Counter(i32);

    impl StepSink for Counter {
        fn add_steps(&mut self, delta: i32) {
            self.0 += delta;
        }
    }

    #[test]
    fn test_sign_convention() {
        assert_eq!(step_delta(true), -1);
        assert_eq!(step_delta(false), 1);
    }

    #[test]
    fn test_edges_accumulate() {
        let mut counter = Counter::default();

        let mut fwd = StepEncoder::new(Level(false));
        for _ in 0..5 {
            assert_eq!(fwd.on_rising_edge(&mut counter), Some(1));
        }

        let mut rev = StepEncoder::new(Level(true));
        for _ in 0..2 {
            assert_eq!(rev.on_rising_edge(&mut counter), Some(-1));
        }

        assert_eq!(counter.0, 3);
    }
}
