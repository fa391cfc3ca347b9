// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side stand-ins for the board: a scripted slave peripheral that plays the master's part,
//! and pins/PWM whose levels the test can watch and change.

#![allow(dead_code)]

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use dcmotor_axis::config::AxisConfig;
use dcmotor_axis::drivers::{
    ActiveLevel, DirPinDrive, Endstops, LimitSwitches, MotorDrive, OutputLine, StepEncoder,
};
use dcmotor_axis::i2c::{BusStatus, Direction, RxResponse, SlaveBus};
use dcmotor_axis::{Axis, DeviceController, I2cSlaveEngine};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

/// A digital level shared between the firmware side and the test.
#[derive(Clone, Default)]
pub struct Level(Rc<Cell<bool>>);

impl Level {
    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, high: bool) {
        self.0.set(high);
    }
}

impl ErrorType for Level {
    type Error = Infallible;
}

impl OutputPin for Level {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

impl InputPin for Level {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }
    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

/// PWM channel with a 255 count period whose duty the test can watch.
#[derive(Clone, Default)]
pub struct Duty(Rc<Cell<u16>>);

impl Duty {
    pub fn get(&self) -> u16 {
        self.0.get()
    }
}

impl pwm::ErrorType for Duty {
    type Error = Infallible;
}

impl SetDutyCycle for Duty {
    fn max_duty_cycle(&self) -> u16 {
        255
    }
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.0.set(duty);
        Ok(())
    }
}

/// Peripheral driven by the test acting as bus master.
///
/// The test loads one status per interrupt; [`status`](SlaveBus::status) hands it out once.
pub struct SimBus {
    pending: BusStatus,
    rx: u8,
    tx: Option<u8>,
    responses: Vec<RxResponse>,
    address_acks: Vec<bool>,
    /// SDA detach/reattach cycles, one per byte that needs one.
    pub rearms: usize,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            pending: BusStatus::idle(),
            rx: 0,
            tx: None,
            responses: Vec::new(),
            address_acks: Vec::new(),
            rearms: 0,
        }
    }
}

impl SlaveBus for SimBus {
    fn status(&mut self) -> BusStatus {
        core::mem::replace(&mut self.pending, BusStatus::idle())
    }
    fn ack_address(&mut self, ack: bool) {
        self.address_acks.push(ack);
    }
    fn read_data(&mut self) -> u8 {
        self.rx
    }
    fn write_data(&mut self, byte: u8) {
        self.tx = Some(byte);
    }
    fn respond(&mut self, response: RxResponse) {
        self.responses.push(response);
    }
    fn clear_stop(&mut self) {}
    fn rearm_stop_detection(&mut self) {
        self.rearms += 1;
    }
}

pub type TestMotor = DirPinDrive<Duty, Level, Level>;
pub type TestLimits = Endstops<Level, Level>;
pub type TestAxis = Axis<SimBus, TestMotor, TestLimits, Level, Level>;

/// Every line of the test rig, kept by the test after the axis took ownership of the clones.
#[derive(Clone, Default)]
pub struct Rig {
    pub duty: Duty,
    pub in_a: Level,
    pub in_b: Level,
    pub end_stop1: Level,
    pub end_stop2: Level,
    pub notify: Level,
    pub encoder_b: Level,
}

impl Rig {
    pub fn axis(&self, cfg: AxisConfig, axis_index: u8) -> TestAxis {
        let filter = cfg.address.resolve(axis_index).expect("address");
        let motor = DirPinDrive::new(self.duty.clone(), self.in_a.clone(), self.in_b.clone());
        let limits = Endstops::new(
            self.end_stop1.clone(),
            self.end_stop2.clone(),
            ActiveLevel::High,
        );
        let notify = OutputLine::active_low(self.notify.clone());
        Axis::new(
            I2cSlaveEngine::new(SimBus::new(), filter),
            DeviceController::new(cfg, motor, limits, notify),
            StepEncoder::new(self.encoder_b.clone()),
        )
    }

    /// The attention line is active low.
    pub fn notify_asserted(&self) -> bool {
        !self.notify.get()
    }

    /// Signed drive as seen at the bridge: positive forward (INB), negative reverse (INA).
    pub fn drive(&self) -> i32 {
        let duty = i32::from(self.duty.get());
        match (self.in_a.get(), self.in_b.get()) {
            (false, true) => duty,
            (true, false) => -duty,
            (false, false) => 0,
            (true, true) => panic!("both bridge inputs high"),
        }
    }

    /// `steps` channel-A rising edges, forward for positive counts.
    pub fn turn<B, M, L>(&self, axis: &mut Axis<B, M, L, Level, Level>, steps: i32)
    where
        B: SlaveBus,
        M: MotorDrive,
        L: LimitSwitches,
    {
        self.encoder_b.set(steps < 0);
        for _ in 0..steps.unsigned_abs() {
            axis.on_encoder_edge();
        }
    }
}

fn interrupt(axis: &mut TestAxis, status: BusStatus) {
    axis.engine.bus().pending = status;
    axis.on_bus_event();
}

fn address(axis: &mut TestAxis, addr: u8, direction: Direction) {
    interrupt(
        axis,
        BusStatus {
            address_match: true,
            direction,
            address: addr,
            ..BusStatus::idle()
        },
    );
}

fn stop(axis: &mut TestAxis) {
    interrupt(
        axis,
        BusStatus {
            stop: true,
            ..BusStatus::idle()
        },
    );
}

/// One master write transaction. Returns whether the address was acknowledged and the response
/// to each data byte.
pub fn master_write(axis: &mut TestAxis, addr: u8, bytes: &[u8]) -> (bool, Vec<RxResponse>) {
    address(axis, addr, Direction::Write);
    for &b in bytes {
        axis.engine.bus().rx = b;
        interrupt(
            axis,
            BusStatus {
                data_ready: true,
                direction: Direction::Write,
                address: addr,
                ..BusStatus::idle()
            },
        );
    }
    stop(axis);

    let bus = axis.engine.bus();
    let acked = bus.address_acks.pop().unwrap_or(false);
    (acked, std::mem::take(&mut bus.responses))
}

/// One master read transaction of `len` bytes.
pub fn master_read(axis: &mut TestAxis, addr: u8, len: usize) -> (bool, Vec<u8>) {
    address(axis, addr, Direction::Read);
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        interrupt(
            axis,
            BusStatus {
                data_ready: true,
                direction: Direction::Read,
                address: addr,
                ..BusStatus::idle()
            },
        );
        out.push(axis.engine.bus().tx.take().unwrap_or(0));
    }
    stop(axis);

    let acked = axis.engine.bus().address_acks.pop().unwrap_or(false);
    (acked, out)
}
