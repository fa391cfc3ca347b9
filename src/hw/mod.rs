// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Board Support (STM32F777)
//!
//! MCU-level bindings that connect the hardware-independent axis to the peripherals.
//!
//! - [`i2c_slave`] - I2C1 slave as a [`SlaveBus`](crate::i2c::SlaveBus)
//! - [`pwm`] - TIM4 motor PWM
//! - [`adc`] - ADC1 current sense
//! - [`exti`] - encoder edge interrupt
//! - [`tick`] - TIM6 one-shot safety tick
//! - [`gpio`] - `embedded-hal` pin adapters
//! - [`config_pin`] - tri-state axis strap
//! - [`pins`] - board pin map

pub mod adc;
pub mod config_pin;
pub mod exti;
pub mod gpio;
pub mod i2c_slave;
pub mod pins;
pub mod pwm;
pub mod tick;

pub use adc::{Adc, AdcChannel};
pub use exti::EdgeLine;
pub use gpio::{In, Out};
pub use i2c_slave::I2cSlave;
pub use pins::BoardPins;
pub use pwm::{PwmChannel, Tim4Pwm};
pub use tick::TickTimer;
