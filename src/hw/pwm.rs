// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Motor PWM on TIM4 via direct PAC register access.
//!
//! The counter runs `0..=PWM_TOP`; a compare value of `PWM_TOP + 1` keeps the output high for the
//! whole period, so duty 255 is fully on.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use stm32f7xx_hal::pac;

const PWM_TOP: u32 = 0xFE;

const RCC_APB1ENR_TIM4EN: u32 = 1 << 2;

const CR1_CEN: u32 = 1 << 0;
const CR1_ARPE: u32 = 1 << 7;
const EGR_UG: u32 = 1 << 0;

/// CCMR output half for one channel: PWM mode 1, preload enabled.
const CCMR_PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3);

/// TIM4 in edge-aligned PWM mode on all four channels.
pub struct Tim4Pwm {
    tim: pac::TIM4,
}

impl Tim4Pwm {
    /// Configure TIM4. `prescaler` divides the timer clock; the PWM frequency is
    /// `f_tim / (prescaler + 1) / (PWM_TOP + 1)`.
    pub fn new(tim: pac::TIM4, prescaler: u16) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_APB1ENR_TIM4EN) });

        tim.cr1.write(|w| unsafe { w.bits(0) });
        tim.psc.write(|w| unsafe { w.bits(u32::from(prescaler)) });
        tim.arr.write(|w| unsafe { w.bits(PWM_TOP) });

        tim.ccmr1_output()
            .write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD | (CCMR_PWM1_PRELOAD << 8)) });
        tim.ccmr2_output()
            .write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD | (CCMR_PWM1_PRELOAD << 8)) });

        // all compare outputs enabled, active high
        tim.ccer
            .write(|w| unsafe { w.bits((1 << 0) | (1 << 4) | (1 << 8) | (1 << 12)) });

        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });
        tim.ccr3.write(|w| unsafe { w.bits(0) });
        tim.ccr4.write(|w| unsafe { w.bits(0) });

        tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        tim.cr1.write(|w| unsafe { w.bits(CR1_ARPE | CR1_CEN) });

        Self { tim }
    }

    /// Hand out the four channels. The timer stays running.
    pub fn split(self) -> (PwmChannel<1>, PwmChannel<2>, PwmChannel<3>, PwmChannel<4>) {
        let _ = self.tim;
        (PwmChannel, PwmChannel, PwmChannel, PwmChannel)
    }
}

/// One TIM4 compare channel (`C` in `1..=4`).
pub struct PwmChannel<const C: u8>;

impl<const C: u8> ErrorType for PwmChannel<C> {
    type Error = Infallible;
}

impl<const C: u8> SetDutyCycle for PwmChannel<C> {
    fn max_duty_cycle(&self) -> u16 {
        (PWM_TOP + 1) as u16
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        // Safety: each channel owns its compare register exclusively.
        let tim = unsafe { &*pac::TIM4::ptr() };
        let duty = u32::from(duty);
        match C {
            1 => tim.ccr1.write(|w| unsafe { w.bits(duty) }),
            2 => tim.ccr2.write(|w| unsafe { w.bits(duty) }),
            3 => tim.ccr3.write(|w| unsafe { w.bits(duty) }),
            _ => tim.ccr4.write(|w| unsafe { w.bits(duty) }),
        }
        Ok(())
    }
}
