// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Axis device: command dispatch, closed-loop control and the periodic safety tick.
//!
//! [`DeviceController`] owns the [`ControlState`] and every output that depends on it. It is fed
//! from three places:
//!
//! | Source         | Entry point                                       |
//! |----------------|---------------------------------------------------|
//! | bus bytes      | [`SlaveHandler`] (commands in, telemetry out)     |
//! | encoder edges  | [`StepSink::add_steps`]                           |
//! | periodic timer | [`DeviceController::on_tick`]                     |
//!
//! Each of them ends in [`DeviceController::check_state`], which re-evaluates the control law and
//! drives the motor. The motor is only written when the command changes.

use embedded_hal::digital::OutputPin;

use crate::config::{AxisConfig, Sequencing};
use crate::control::law::{self, ControlMode, LawInput, LawOutput};
use crate::control::sequencer::{Phase, Sequencer};
use crate::drivers::{LimitSwitches, MotorDrive, OutputLine, StepSink};
use crate::i2c::{RxResponse, SlaveHandler};
use crate::protocol::codec;
use crate::protocol::telemetry::RECORD_LEN;
use crate::protocol::{Command, CommandFrame, ErrorFlags, TelemetryRecord};
use crate::{log_debug, log_info, log_warn};

/// Live axis state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    /// Commanded speed, or open-loop duty in manual mode.
    pub speed: u8,
    pub running: bool,
    pub end_stop1: bool,
    pub end_stop2: bool,
    pub error: ErrorFlags,
    pub actual_steps: i32,
    pub target_steps: i32,
    pub current_ma: i16,
    pub mode: ControlMode,
    /// Ticks since the last speed-setting command.
    pub unattended_ticks: u16,
}

impl ControlState {
    pub const fn new() -> Self {
        Self {
            speed: 0,
            running: false,
            end_stop1: false,
            end_stop2: false,
            error: ErrorFlags::from_raw(0),
            actual_steps: 0,
            target_steps: 0,
            current_ma: 0,
            mode: ControlMode::Position,
            unattended_ticks: 0,
        }
    }

    pub fn record(&self) -> TelemetryRecord {
        TelemetryRecord {
            speed: self.speed,
            running: self.running,
            end_stop1: self.end_stop1,
            end_stop2: self.end_stop2,
            error: self.error,
            actual_steps: self.actual_steps,
            target_steps: self.target_steps,
            current_ma: self.current_ma,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct DeviceController<M, L, N: OutputPin> {
    cfg: AxisConfig,
    motor: M,
    limits: L,
    notify: OutputLine<N>,
    state: ControlState,
    frame: CommandFrame,
    sequencer: Sequencer,
    /// Record latched at the first byte of a read, so one transfer never mixes two states.
    snapshot: [u8; RECORD_LEN],
    last_drive: Option<(u8, bool)>,
    interlocked: bool,
}

impl<M, L, N> DeviceController<M, L, N>
where
    M: MotorDrive,
    L: LimitSwitches,
    N: OutputPin,
{
    /// Take ownership of the axis outputs. The motor is stopped and the endstops sampled once.
    pub fn new(cfg: AxisConfig, motor: M, limits: L, notify: OutputLine<N>) -> Self {
        let mut dev = Self {
            cfg,
            motor,
            limits,
            notify,
            state: ControlState::new(),
            frame: CommandFrame::new(),
            sequencer: Sequencer::new(),
            snapshot: [0; RECORD_LEN],
            last_drive: None,
            interlocked: false,
        };
        dev.sample_endstops();
        dev.check_state();
        dev
    }

    #[inline]
    pub fn config(&self) -> &AxisConfig {
        &self.cfg
    }

    #[inline]
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    #[inline]
    pub fn notify_asserted(&self) -> bool {
        self.notify.is_asserted()
    }

    /// Current telemetry record.
    pub fn telemetry(&self) -> TelemetryRecord {
        self.state.record()
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    pub fn limits_mut(&mut self) -> &mut L {
        &mut self.limits
    }

    pub fn free(self) -> (M, L, OutputLine<N>) {
        (self.motor, self.limits, self.notify)
    }

    /// Execute a decoded command.
    pub fn apply(&mut self, cmd: Command) {
        log_debug!("command {:?}", cmd);
        match cmd {
            Command::SetSpeed(speed) => {
                self.state.mode = ControlMode::Position;
                self.state.speed = speed;
                self.state.unattended_ticks = 0;
            }
            Command::SetEndSteps(steps) => {
                self.state.mode = ControlMode::Position;
                self.state.target_steps = steps;
            }
            Command::Setup {
                end_steps,
                end_time_ms,
                start_immediately,
            } => {
                self.state.mode = ControlMode::Position;
                self.state.target_steps = self.state.target_steps.wrapping_add(end_steps);
                if self.sequencer.setup(end_time_ms, start_immediately) {
                    log_info!("sequencer running, budget {} ms", self.sequencer.end_time_ms());
                }
            }
            Command::Start => {
                if self.sequencer.start() {
                    log_info!("sequencer running, budget {} ms", self.sequencer.end_time_ms());
                }
            }
            Command::Stop => {
                self.state.speed = 0;
                if self.sequencer.stop() {
                    log_info!("sequencer stopped");
                }
            }
            Command::Set { duty, forward } => {
                self.state.mode = ControlMode::Manual { forward };
                self.state.speed = duty;
                self.state.unattended_ticks = 0;
            }
            Command::ClearErrors => {
                self.state.error.clear();
            }
        }
        self.check_state();
    }

    /// Periodic safety tick: sample inputs, run the timeouts, re-evaluate.
    pub fn on_tick(&mut self) {
        self.sample_endstops();

        if self.motor.fault() && !self.state.error.driver_fault() {
            log_warn!("motor driver fault");
            self.state.error.latch(ErrorFlags::DRIVER_FAULT);
        }
        if let Some(ma) = self.motor.current_ma() {
            self.state.current_ma = ma;
        }

        if let Some(limit) = self.cfg.unattended_ticks {
            self.state.unattended_ticks = self.state.unattended_ticks.saturating_add(1);
            if self.state.unattended_ticks > limit && self.state.speed != 0 {
                log_warn!(
                    "no speed command for {} ticks, stopping",
                    self.state.unattended_ticks
                );
                self.state.speed = 0;
            }
        }

        if self.sequencer.tick(self.cfg.tick_ms) {
            log_warn!("sequencer time budget exhausted, stopping");
            self.state.speed = 0;
        }

        self.check_state();
    }

    /// Re-evaluate the control law and apply it.
    ///
    /// Calling this again without an intervening change leaves every output as it is.
    pub fn check_state(&mut self) {
        let out = self.evaluate();
        self.drive(out);
    }

    fn sample_endstops(&mut self) {
        let stops = self.limits.sample();
        self.state.end_stop1 = stops.end_stop1;
        self.state.end_stop2 = stops.end_stop2;
    }

    fn law_input(&self) -> LawInput {
        let permitted = match self.cfg.sequencing {
            Sequencing::Free => true,
            Sequencing::Gated => self.sequencer.is_running(),
        };
        LawInput {
            mode: self.state.mode,
            speed: self.state.speed,
            target_steps: self.state.target_steps,
            actual_steps: self.state.actual_steps,
            end_stop1: self.state.end_stop1,
            end_stop2: self.state.end_stop2,
            error: self.state.error,
            permitted,
        }
    }

    /// Evaluate the law and publish `running`; the motor is left to the caller.
    fn evaluate(&mut self) -> LawOutput {
        let input = self.law_input();

        if input.mode == ControlMode::Position
            && self.sequencer.is_running()
            && input.on_target(self.cfg.stop_tolerance)
        {
            self.sequencer.reach_target();
            log_info!("sequencer finished at {} steps", input.actual_steps);
        }

        let interlocked = input.interlocked();
        if interlocked && !self.interlocked {
            log_warn!(
                "interlock engaged: endstops {} {}, error {}",
                input.end_stop1,
                input.end_stop2,
                input.error.raw()
            );
        }
        self.interlocked = interlocked;

        let out = law::evaluate(&self.cfg, &self.law_input());
        if out.running != self.state.running {
            self.state.running = out.running;
            self.notify.assert();
            log_info!("running {}", out.running);
        }
        out
    }

    fn drive(&mut self, out: LawOutput) {
        let command = (out.speed, out.forward);
        if self.last_drive == Some(command) {
            return;
        }
        match self.motor.set(out.speed, out.forward) {
            Ok(()) => self.last_drive = Some(command),
            Err(e) => {
                log_warn!("motor drive failed: {:?}", e);
                self.state.error.latch(ErrorFlags::DRIVE_IO);
                self.last_drive = self.motor.set(0, false).ok().map(|()| (0, false));
                self.evaluate();
            }
        }
    }
}

impl<M, L, N> StepSink for DeviceController<M, L, N>
where
    M: MotorDrive,
    L: LimitSwitches,
    N: OutputPin,
{
    fn add_steps(&mut self, delta: i32) {
        self.state.actual_steps = self.state.actual_steps.wrapping_add(delta);
        self.check_state();
    }
}

impl<M, L, N> SlaveHandler for DeviceController<M, L, N>
where
    M: MotorDrive,
    L: LimitSwitches,
    N: OutputPin,
{
    fn produce_outbound_byte(&mut self, index: usize) -> Option<u8> {
        self.notify.release();
        if index == 0 {
            self.snapshot = self.state.record().to_bytes();
        }
        codec::encode_byte(self.cfg.encoding, &self.snapshot, index)
    }

    fn consume_inbound_byte(&mut self, index: usize, value: u8) -> RxResponse {
        match self.frame.store(index, value) {
            Ok(Some(cmd)) => {
                self.apply(cmd);
                RxResponse::Ack
            }
            Ok(None) => RxResponse::Ack,
            Err(_) => RxResponse::Nack,
        }
    }
}
