// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Position control law.
//!
//! A bounded proportional profile on the step error. With `diff = target - actual`:
//!
//! | Quantity      | Value                                   |
//! |---------------|-----------------------------------------|
//! | speed limit   | `|diff >> 2| + min_speed`               |
//! | output speed  | commanded speed clamped to `[min_speed, limit]` |
//! | direction     | forward iff `diff > 0`                  |
//!
//! The limit shrinks as the axis closes in, so the motor decelerates into the target. An axis at
//! an endstop or with an error latched is never driven, whatever the [`InterlockPolicy`].

use crate::config::{AxisConfig, InterlockPolicy};
use crate::protocol::ErrorFlags;

/// What the motor is told to follow.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Closed loop on the step counter.
    Position,
    /// Open loop: the commanded speed is applied directly in the given direction.
    Manual { forward: bool },
}

/// Snapshot of everything the law looks at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LawInput {
    pub mode: ControlMode,
    pub speed: u8,
    pub target_steps: i32,
    pub actual_steps: i32,
    pub end_stop1: bool,
    pub end_stop2: bool,
    pub error: ErrorFlags,
    /// Cleared when the sequencer gates motion off.
    pub permitted: bool,
}

/// Result of one evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LawOutput {
    pub running: bool,
    pub speed: u8,
    pub forward: bool,
}

impl LawOutput {
    pub const STOPPED: Self = Self {
        running: false,
        speed: 0,
        forward: false,
    };
}

impl LawInput {
    /// Target minus actual, widened so it cannot overflow.
    #[inline]
    pub fn diff(&self) -> i64 {
        i64::from(self.target_steps) - i64::from(self.actual_steps)
    }

    #[inline]
    pub fn interlocked(&self) -> bool {
        self.end_stop1 || self.end_stop2 || !self.error.is_clear()
    }

    pub fn on_target(&self, tolerance: u32) -> bool {
        self.diff().unsigned_abs() <= u64::from(tolerance)
    }
}

/// Speed clamp for a given step error.
pub fn clamp_speed(speed: u8, diff: i64, min_speed: u8) -> u8 {
    let limit = (diff >> 2).unsigned_abs() + u64::from(min_speed);
    let clamped = u64::from(speed).min(limit).max(u64::from(min_speed));
    // limit >= min_speed and speed <= u8::MAX
    clamped as u8
}

/// Evaluate the law.
pub fn evaluate(cfg: &AxisConfig, input: &LawInput) -> LawOutput {
    let interlocked = input.interlocked();

    let running = match (input.mode, cfg.interlock) {
        (ControlMode::Position, InterlockPolicy::Full) => {
            input.speed != 0 && !input.on_target(cfg.stop_tolerance) && !interlocked
        }
        (ControlMode::Position, InterlockPolicy::PositionOnly) => {
            !input.on_target(cfg.stop_tolerance)
        }
        (ControlMode::Manual { .. }, InterlockPolicy::Full) => input.speed != 0 && !interlocked,
        (ControlMode::Manual { .. }, InterlockPolicy::PositionOnly) => input.speed != 0,
    } && input.permitted;

    if !running || interlocked {
        return LawOutput {
            running,
            ..LawOutput::STOPPED
        };
    }

    match input.mode {
        ControlMode::Position => {
            let diff = input.diff();
            LawOutput {
                running,
                speed: clamp_speed(input.speed, diff, cfg.min_speed),
                forward: diff > 0,
            }
        }
        ControlMode::Manual { forward } => LawOutput {
            running,
            speed: input.speed,
            forward,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(speed: u8, target: i32, actual: i32) -> LawInput {
        LawInput {
            mode: ControlMode::Position,
            speed,
            target_steps: target,
            actual_steps: actual,
            end_stop1: false,
            end_stop2: false,
            error: ErrorFlags::default(),
            permitted: true,
        }
    }

    #[test]
    fn test_far_from_target_clamps_to_limit() {
        let cfg = AxisConfig::default();
        let out = evaluate(&cfg, &position(200, 500, 0));
        // 500 >> 2 = 125, + 50
        assert_eq!(
            out,
            LawOutput {
                running: true,
                speed: 175,
                forward: true
            }
        );
    }

    #[test]
    fn test_reverse_direction() {
        let cfg = AxisConfig::default();
        let out = evaluate(&cfg, &position(60, 0, 500));
        assert!(out.running);
        assert_eq!(out.speed, 60);
        assert!(!out.forward);
    }

    #[test]
    fn test_slow_command_raised_to_floor() {
        let cfg = AxisConfig::default();
        let out = evaluate(&cfg, &position(10, 1000, 0));
        assert_eq!(out.speed, 50);
    }

    #[test]
    fn test_within_tolerance_is_stopped() {
        let cfg = AxisConfig::default();
        for diff in -2..=2 {
            assert_eq!(evaluate(&cfg, &position(200, diff, 0)), LawOutput::STOPPED);
        }
        assert!(evaluate(&cfg, &position(200, 3, 0)).running);
    }

    #[test]
    fn test_zero_speed_never_runs() {
        let cfg = AxisConfig::default();
        assert_eq!(evaluate(&cfg, &position(0, 500, 0)), LawOutput::STOPPED);
    }

    #[test]
    fn test_decelerates_monotonically() {
        let cfg = AxisConfig::default();
        let mut last = u8::MAX;
        for actual in (0..=497).step_by(7) {
            let out = evaluate(&cfg, &position(255, 500, actual));
            assert!(out.speed <= last);
            last = out.speed;
        }
    }

    #[test]
    fn test_extreme_positions_do_not_overflow() {
        let cfg = AxisConfig::default();
        let out = evaluate(&cfg, &position(255, i32::MAX, i32::MIN));
        assert_eq!(out.speed, 255);
        assert!(out.forward);
    }

    #[test]
    fn test_endstop_or_error_forces_zero_under_both_policies() {
        for policy in [InterlockPolicy::Full, InterlockPolicy::PositionOnly] {
            let cfg = AxisConfig::default().with_interlock(policy);

            let mut at_stop = position(200, 500, 0);
            at_stop.end_stop2 = true;
            assert_eq!(evaluate(&cfg, &at_stop).speed, 0);

            let mut faulted = position(200, 500, 0);
            faulted.error = ErrorFlags::from_raw(ErrorFlags::DRIVER_FAULT);
            assert_eq!(evaluate(&cfg, &faulted).speed, 0);
        }
    }

    #[test]
    fn test_position_only_reports_running_at_endstop() {
        let cfg = AxisConfig::default().with_interlock(InterlockPolicy::PositionOnly);
        let mut input = position(0, 500, 0);
        input.end_stop1 = true;
        let out = evaluate(&cfg, &input);
        assert!(out.running);
        assert_eq!(out.speed, 0);

        let full = evaluate(&AxisConfig::default(), &input);
        assert!(!full.running);
    }

    #[test]
    fn test_gate_stops_motion() {
        let cfg = AxisConfig::default();
        let mut input = position(200, 500, 0);
        input.permitted = false;
        assert_eq!(evaluate(&cfg, &input), LawOutput::STOPPED);
    }

    #[test]
    fn test_manual_applies_duty_directly() {
        let cfg = AxisConfig::default();
        let mut input = position(30, 0, 0);
        input.mode = ControlMode::Manual { forward: false };
        assert_eq!(
            evaluate(&cfg, &input),
            LawOutput {
                running: true,
                speed: 30,
                forward: false
            }
        );

        input.end_stop1 = true;
        assert_eq!(evaluate(&cfg, &input), LawOutput::STOPPED);
    }
}
