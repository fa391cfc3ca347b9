// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Self-rescheduling safety tick on TIM6.
//!
//! TIM6 runs in one-pulse mode: it counts one period, raises its update interrupt and stops. The
//! handler does its work and calls [`TickTimer::rearm`], so a handler that never returns also
//! never gets another tick.

use stm32f7xx_hal::pac;

use crate::config::MAX_TICK_MS;

const RCC_APB1ENR_TIM6EN: u32 = 1 << 4;

const CR1_CEN: u32 = 1 << 0;
const CR1_URS: u32 = 1 << 2;
const CR1_OPM: u32 = 1 << 3;
const DIER_UIE: u32 = 1 << 0;
const SR_UIF: u32 = 1 << 0;
const EGR_UG: u32 = 1 << 0;

/// Counter resolution: 10 kHz. Keep in step with [`MAX_TICK_MS`].
const COUNT_HZ: u32 = 10_000;

pub struct TickTimer {
    tim: pac::TIM6,
}

impl TickTimer {
    /// Configure TIM6 for a `period_ms` one-shot. `timer_clk_hz` is the APB1 timer clock.
    ///
    /// Periods past [`MAX_TICK_MS`] do not fit the reload register; `AxisConfig::validate`
    /// rejects them before they get here.
    pub fn tim6(tim: pac::TIM6, timer_clk_hz: u32, period_ms: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_APB1ENR_TIM6EN) });

        let psc = (timer_clk_hz / COUNT_HZ).saturating_sub(1).min(0xFFFF);
        let arr = period_ms
            .min(MAX_TICK_MS)
            .saturating_mul(COUNT_HZ / 1000)
            .max(1)
            - 1;

        tim.cr1.write(|w| unsafe { w.bits(CR1_URS | CR1_OPM) });
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(arr) });
        // load PSC; URS keeps this from raising UIF
        tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        tim.sr.write(|w| unsafe { w.bits(0) });
        tim.dier.write(|w| unsafe { w.bits(DIER_UIE) });

        Self { tim }
    }

    /// Start the next period.
    #[inline]
    pub fn rearm(&mut self) {
        self.tim
            .cr1
            .modify(|r, w| unsafe { w.bits(r.bits() | CR1_CEN) });
    }

    /// Acknowledge the update interrupt. Returns whether one was pending.
    #[inline]
    pub fn clear(&mut self) -> bool {
        let pending = self.tim.sr.read().bits() & SR_UIF != 0;
        self.tim.sr.write(|w| unsafe { w.bits(0) });
        pending
    }

    pub fn free(self) -> pac::TIM6 {
        self.tim
    }
}
