// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! One complete axis: bus engine, device and encoder, with one entry point per interrupt source.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::control::DeviceController;
use crate::drivers::{LimitSwitches, MotorDrive, StepEncoder};
use crate::i2c::{I2cSlaveEngine, SlaveBus};

pub struct Axis<B, M, L, N, E>
where
    B: SlaveBus,
    N: OutputPin,
{
    pub engine: I2cSlaveEngine<B>,
    pub device: DeviceController<M, L, N>,
    pub encoder: StepEncoder<E>,
}

impl<B, M, L, N, E> Axis<B, M, L, N, E>
where
    B: SlaveBus,
    M: MotorDrive,
    L: LimitSwitches,
    N: OutputPin,
    E: InputPin,
{
    pub fn new(
        engine: I2cSlaveEngine<B>,
        device: DeviceController<M, L, N>,
        encoder: StepEncoder<E>,
    ) -> Self {
        Self {
            engine,
            device,
            encoder,
        }
    }

    /// Bus event interrupt.
    #[inline]
    pub fn on_bus_event(&mut self) {
        self.engine.on_interrupt(&mut self.device);
    }

    /// Channel-A rising edge interrupt.
    #[inline]
    pub fn on_encoder_edge(&mut self) {
        self.encoder.on_rising_edge(&mut self.device);
    }

    /// Periodic timer interrupt.
    #[inline]
    pub fn on_tick(&mut self) {
        self.device.on_tick();
    }
}
