// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 axis controller board.
//!
//! | Function            | Pin       | Notes                     |
//! |---------------------|-----------|---------------------------|
//! | I2C1 SCL / SDA      | PB8 / PB9 | AF4, open drain           |
//! | attention line      | PB0       | push-pull, active low     |
//! | motor PWM           | PD12      | TIM4_CH1, AF2             |
//! | motor INA / INB     | PA3 / PA4 | VNH7070 direction inputs  |
//! | motor current sense | PC4       | ADC1_IN14                 |
//! | encoder A / B       | PA0 / PA1 | A on EXTI0, rising edge   |
//! | endstop 1 / 2       | PE0 / PE1 | pulled down, active high  |
//! | axis strap          | PE2       | tri-state, sensed at boot |
//! | status LED          | PD10      | active low                |

use stm32f7xx_hal::{
    gpio::{
        gpioa, gpiob, gpioc, gpiod, gpioe, Alternate, Analog, Floating, Input, OpenDrain, Output,
        PullDown, PushPull,
    },
    pac,
    prelude::*,
};

/// Channel A's port and EXTI line.
pub const ENCODER_A_PORT: char = 'A';
pub const ENCODER_A_LINE: u8 = 0;

/// ADC1 channel wired to the current sense output.
pub const CURRENT_SENSE_CHANNEL: u8 = 14;

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub i2c1: I2c1Pins,
    pub notify: gpiob::PB0<Output<PushPull>>,
    pub motor: MotorPins,
    pub encoder: EncoderPins,
    pub endstops: EndstopPins,
    pub axis_strap: gpioe::PE2<Input<Floating>>,
    pub led: gpiod::PD10<Output<PushPull>>,
}

pub struct I2c1Pins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

/// VNH7070 control pins
pub struct MotorPins {
    pub pwm: gpiod::PD12<Alternate<2>>, // TIM4_CH1
    pub in_a: gpioa::PA3<Output<PushPull>>,
    pub in_b: gpioa::PA4<Output<PushPull>>,
    pub sense: gpioc::PC4<Analog>, // ADC1_IN14
}

/// Single-edge step encoder
pub struct EncoderPins {
    pub a: gpioa::PA0<Input<Floating>>,
    pub b: gpioa::PA1<Input<Floating>>,
}

pub struct EndstopPins {
    pub first: gpioe::PE0<Input<PullDown>>,
    pub second: gpioe::PE1<Input<PullDown>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(
        gpioa: pac::GPIOA,
        gpiob: pac::GPIOB,
        gpioc: pac::GPIOC,
        gpiod: pac::GPIOD,
        gpioe: pac::GPIOE,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            i2c1: I2c1Pins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            notify: gpiob.pb0.into_push_pull_output(),

            motor: MotorPins {
                pwm: gpiod.pd12.into_alternate::<2>(),
                in_a: gpioa.pa3.into_push_pull_output(),
                in_b: gpioa.pa4.into_push_pull_output(),
                sense: gpioc.pc4.into_analog(),
            },

            encoder: EncoderPins {
                a: gpioa.pa0.into_floating_input(),
                b: gpioa.pa1.into_floating_input(),
            },

            endstops: EndstopPins {
                first: gpioe.pe0.into_pull_down_input(),
                second: gpioe.pe1.into_pull_down_input(),
            },

            axis_strap: gpioe.pe2.into_floating_input(),

            led: gpiod.pd10.into_push_pull_output(),
        }
    }
}
