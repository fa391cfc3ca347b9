// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Rising-edge external interrupt line for the encoder's channel A.

use stm32f7xx_hal::pac;

const RCC_APB2ENR_SYSCFGEN: u32 = 1 << 14;

/// One EXTI line, rising edge only.
pub struct EdgeLine {
    line: u8,
}

impl EdgeLine {
    /// Route GPIO `port` (`'A'..='K'`) pin `line` (`0..=15`) to its EXTI line and enable the
    /// rising-edge interrupt.
    pub fn rising(port: char, line: u8) -> Self {
        let line = line & 0x0F;
        let rcc = unsafe { &*pac::RCC::ptr() };
        let syscfg = unsafe { &*pac::SYSCFG::ptr() };
        let exti = unsafe { &*pac::EXTI::ptr() };

        rcc.apb2enr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_APB2ENR_SYSCFGEN) });

        let port_index = (port as u32).saturating_sub('A' as u32) & 0x0F;
        let shift = u32::from(line % 4) * 4;
        let route = |r: u32| (r & !(0x0F << shift)) | (port_index << shift);
        match line / 4 {
            0 => syscfg.exticr1.modify(|r, w| unsafe { w.bits(route(r.bits())) }),
            1 => syscfg.exticr2.modify(|r, w| unsafe { w.bits(route(r.bits())) }),
            2 => syscfg.exticr3.modify(|r, w| unsafe { w.bits(route(r.bits())) }),
            _ => syscfg.exticr4.modify(|r, w| unsafe { w.bits(route(r.bits())) }),
        }

        let bit = 1u32 << line;
        exti.rtsr.modify(|r, w| unsafe { w.bits(r.bits() | bit) });
        exti.ftsr.modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
        exti.pr.write(|w| unsafe { w.bits(bit) });
        exti.imr.modify(|r, w| unsafe { w.bits(r.bits() | bit) });

        Self { line }
    }

    /// Acknowledge the edge. Returns whether one was pending.
    #[inline]
    pub fn clear_pending(&mut self) -> bool {
        let exti = unsafe { &*pac::EXTI::ptr() };
        let bit = 1u32 << self.line;
        let pending = exti.pr.read().bits() & bit != 0;
        exti.pr.write(|w| unsafe { w.bits(bit) });
        pending
    }
}
