// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Motor current sense on ADC1 using direct PAC register access.
//!
//! 8-bit, right-aligned, software-triggered single conversions. The motor current scale assumes
//! 8-bit counts.
//!
//! Example:
//! ```ignore
//! let adc1 = Adc::adc1(dp.ADC1);
//! let sense = CurrentSense::new(adc1.channel(14));
//! ```

use core::convert::Infallible;

use stm32f7xx_hal::pac;

use crate::drivers::AdcSample;

/// CR1.RES = 0b10: 8-bit resolution.
const CR1_RES_8BIT: u32 = 0b10 << 24;
const CR2_ADON: u32 = 1 << 0;
const CR2_SWSTART: u32 = 1 << 30;
const SR_EOC: u32 = 1 << 1;

/// Longest sample time (480 cycles), for the high-impedance sense output.
const SMP_480: u32 = 0b111;

/// Upper bound on the end-of-conversion wait; a conversion takes a few hundred cycles.
const EOC_SPIN_LIMIT: u32 = 10_000;

pub struct Adc<ADC> {
    adc: ADC,
}

impl<ADC> Adc<ADC> {
    #[inline]
    pub fn free(self) -> ADC {
        self.adc
    }
}

impl Adc<pac::ADC1> {
    /// Create and initialize ADC1.
    pub fn adc1(adc1: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        // ADC prescaler: PCLK2 / 4
        common.ccr.modify(|_, w| w.adcpre().div4());

        // Power off to configure
        adc1.cr2.modify(|_, w| w.adon().clear_bit());
        adc1.cr1.write(|w| unsafe { w.bits(CR1_RES_8BIT) });
        adc1.cr2.write(|w| unsafe { w.bits(0) });

        // Single conversion sequence
        adc1.sqr1.modify(|_, w| w.l().bits(0));

        adc1.cr2.write(|w| unsafe { w.bits(CR2_ADON) });

        Self { adc: adc1 }
    }

    /// Dedicate the converter to one channel.
    pub fn channel(self, channel: u8) -> AdcChannel {
        let channel = channel & 0x1F;
        let shift = u32::from(channel % 10) * 3;
        if channel < 10 {
            self.adc
                .smpr2
                .modify(|r, w| unsafe { w.bits(r.bits() | (SMP_480 << shift)) });
        } else {
            self.adc
                .smpr1
                .modify(|r, w| unsafe { w.bits(r.bits() | (SMP_480 << shift)) });
        }
        self.adc
            .sqr3
            .modify(|_, w| unsafe { w.sq1().bits(channel) });

        AdcChannel { adc: self.adc }
    }
}

/// ADC1 converting a single channel.
pub struct AdcChannel {
    adc: pac::ADC1,
}

impl AdcChannel {
    /// Kick off a conversion.
    #[inline]
    pub fn start(&mut self) {
        self.adc
            .cr2
            .modify(|r, w| unsafe { w.bits(r.bits() | CR2_SWSTART) });
    }

    /// Result of the conversion started last, once it is done.
    pub fn try_read(&mut self) -> nb::Result<u16, Infallible> {
        if self.adc.sr.read().bits() & SR_EOC == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.adc.dr.read().data().bits() as u16)
    }

    /// Blocking conversion. Returns 0 if the converter never signals end of conversion.
    pub fn read(&mut self) -> u16 {
        self.start();
        for _ in 0..EOC_SPIN_LIMIT {
            match self.try_read() {
                Ok(raw) => return raw,
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(never)) => match never {},
            }
        }
        0
    }
}

impl AdcSample for AdcChannel {
    #[inline]
    fn sample(&mut self) -> u16 {
        self.read()
    }
}
