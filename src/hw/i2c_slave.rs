// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! I2C1 in slave mode as a [`SlaveBus`], using direct PAC register access.
//!
//! The peripheral runs in slave byte control mode (`SBC`) with `RELOAD` set and `NBYTES = 1`, so
//! every byte ends in a transfer-complete-reload stretch:
//!
//! - master write: the clock is held between the data byte and its ACK until
//!   [`respond`](SlaveBus::respond) picks ACK or NACK and reloads `NBYTES`.
//! - master read: `TXIS` asks for the next byte; the reload stretch after it is released from
//!   [`status`](SlaveBus::status).
//!
//! The peripheral acknowledges a matching address in hardware. Filters it cannot express exactly
//! are widened to a masked address and the extra addresses are refused by NACKing their data.
//!
//! After every transmitted byte SDA is detached from the peripheral for a moment (PB9 switched to
//! input and back to its alternate function), so the STOP that may follow is seen.

use stm32f7xx_hal::pac;

use crate::hw::pins::I2c1Pins;
use crate::i2c::{AddressFilter, BusStatus, Direction, RxResponse, SlaveBus};

const RCC_APB1ENR_I2C1EN: u32 = 1 << 21;

// CR1
const CR1_PE: u32 = 1 << 0;
const CR1_TXIE: u32 = 1 << 1;
const CR1_RXIE: u32 = 1 << 2;
const CR1_ADDRIE: u32 = 1 << 3;
const CR1_NACKIE: u32 = 1 << 4;
const CR1_STOPIE: u32 = 1 << 5;
const CR1_TCIE: u32 = 1 << 6;
const CR1_ERRIE: u32 = 1 << 7;
const CR1_SBC: u32 = 1 << 16;

// CR2
const CR2_NACK: u32 = 1 << 15;
const CR2_NBYTES_SHIFT: u32 = 16;
const CR2_NBYTES_MASK: u32 = 0xFF << CR2_NBYTES_SHIFT;
const CR2_RELOAD: u32 = 1 << 24;

// OAR1 / OAR2
const OAR1_OA1EN: u32 = 1 << 15;
const OAR2_OA2MSK_SHIFT: u32 = 8;
const OAR2_OA2EN: u32 = 1 << 15;

// ISR
const ISR_TXE: u32 = 1 << 0;
const ISR_TXIS: u32 = 1 << 1;
const ISR_RXNE: u32 = 1 << 2;
const ISR_ADDR: u32 = 1 << 3;
const ISR_NACKF: u32 = 1 << 4;
const ISR_STOPF: u32 = 1 << 5;
const ISR_TCR: u32 = 1 << 7;
const ISR_BERR: u32 = 1 << 8;
const ISR_ARLO: u32 = 1 << 9;
const ISR_OVR: u32 = 1 << 10;
const ISR_DIR: u32 = 1 << 16;
const ISR_ADDCODE_SHIFT: u32 = 17;

// ICR
const ICR_ADDRCF: u32 = 1 << 3;
const ICR_NACKCF: u32 = 1 << 4;
const ICR_STOPCF: u32 = 1 << 5;
const ICR_BERRCF: u32 = 1 << 8;
const ICR_ARLOCF: u32 = 1 << 9;
const ICR_OVRCF: u32 = 1 << 10;

// GPIOB MODER field of PB9 (SDA)
const SDA_PIN: u32 = 9;
const MODER_MASK: u32 = 0b11;
const MODER_INPUT: u32 = 0b00;
const MODER_ALTERNATE: u32 = 0b10;

/// TIMINGR for a 16 MHz kernel clock: data setup and hold times of standard mode.
pub const TIMINGR_16MHZ: u32 = 0x0030_3D5B;

pub struct I2cSlave {
    i2c: pac::I2C1,
    pins: I2c1Pins,
}

impl I2cSlave {
    /// Enable I2C1 as a slave answering to `filter` on SCL/SDA, which are already in their AF4
    /// open-drain mode.
    pub fn i2c1(i2c: pac::I2C1, pins: I2c1Pins, timingr: u32, filter: AddressFilter) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_APB1ENR_I2C1EN) });

        // PE=0 while configuring
        i2c.cr1.write(|w| unsafe { w.bits(0) });
        i2c.timingr.write(|w| unsafe { w.bits(timingr) });

        let (oar1, oar2) = own_address_registers(filter);
        i2c.oar1.write(|w| unsafe { w.bits(0) });
        i2c.oar2.write(|w| unsafe { w.bits(0) });
        i2c.oar1.write(|w| unsafe { w.bits(oar1) });
        i2c.oar2.write(|w| unsafe { w.bits(oar2) });

        i2c.cr1.write(|w| unsafe {
            w.bits(
                CR1_SBC
                    | CR1_TXIE
                    | CR1_RXIE
                    | CR1_ADDRIE
                    | CR1_NACKIE
                    | CR1_STOPIE
                    | CR1_TCIE
                    | CR1_ERRIE,
            )
        });
        i2c.cr1
            .modify(|r, w| unsafe { w.bits(r.bits() | CR1_PE) });

        Self { i2c, pins }
    }

    pub fn free(self) -> (pac::I2C1, I2c1Pins) {
        self.i2c.cr1.write(|w| unsafe { w.bits(0) });
        (self.i2c, self.pins)
    }

    fn set_sda_mode(&mut self, mode: u32) {
        // the SDA field of GPIOB MODER belongs to `self.pins.sda`
        let gpiob = unsafe { &*pac::GPIOB::ptr() };
        let shift = SDA_PIN * 2;
        gpiob.moder.modify(|r, w| unsafe {
            w.bits((r.bits() & !(MODER_MASK << shift)) | (mode << shift))
        });
    }

    /// One more byte, with the reload stretch after it.
    fn reload_one(&mut self, nack: bool) {
        self.i2c.cr2.modify(|r, w| {
            let mut bits = (r.bits() & !(CR2_NBYTES_MASK | CR2_NACK))
                | (1 << CR2_NBYTES_SHIFT)
                | CR2_RELOAD;
            if nack {
                bits |= CR2_NACK;
            }
            unsafe { w.bits(bits) }
        });
    }

    fn flush_tx(&mut self) {
        self.i2c
            .isr
            .modify(|r, w| unsafe { w.bits(r.bits() | ISR_TXE) });
    }
}

/// OAR1/OAR2 values for a filter.
///
/// Two discrete addresses use both own-address registers. Anything else becomes one masked
/// address in OAR2, which can only mask whole runs of low bits.
fn own_address_registers(filter: AddressFilter) -> (u32, u32) {
    if let AddressFilter::Dual(a, b) = filter {
        return (
            OAR1_OA1EN | (u32::from(a & 0x7F) << 1),
            OAR2_OA2EN | (u32::from(b & 0x7F) << 1),
        );
    }

    let (address, mask) = filter.covering_mask();
    if mask == 0 {
        return (OAR1_OA1EN | (u32::from(address & 0x7F) << 1), 0);
    }

    let masked_low_bits = 8 - mask.leading_zeros();
    let address = address & !((1u8 << masked_low_bits) - 1) & 0x7F;
    (
        0,
        OAR2_OA2EN | (masked_low_bits << OAR2_OA2MSK_SHIFT) | (u32::from(address) << 1),
    )
}

impl SlaveBus for I2cSlave {
    fn status(&mut self) -> BusStatus {
        let isr = self.i2c.isr.read().bits();
        let transmitting = isr & ISR_DIR != 0;

        if isr & ISR_NACKF != 0 {
            // master ended its read
            self.i2c.icr.write(|w| unsafe { w.bits(ICR_NACKCF) });
        }
        if isr & ISR_OVR != 0 {
            self.i2c.icr.write(|w| unsafe { w.bits(ICR_OVRCF) });
        }
        if transmitting && isr & ISR_TCR != 0 {
            self.reload_one(false);
        }

        let data_ready = if transmitting {
            isr & ISR_TXIS != 0
        } else {
            isr & ISR_RXNE != 0
        };

        BusStatus {
            address_match: isr & ISR_ADDR != 0,
            data_ready,
            stop: isr & (ISR_STOPF | ISR_BERR | ISR_ARLO) != 0,
            direction: if transmitting {
                Direction::Read
            } else {
                Direction::Write
            },
            address: ((isr >> ISR_ADDCODE_SHIFT) & 0x7F) as u8,
        }
    }

    fn ack_address(&mut self, ack: bool) {
        if self.i2c.isr.read().bits() & ISR_DIR != 0 {
            self.flush_tx();
        }
        self.reload_one(!ack);
        // releases the address stretch
        self.i2c.icr.write(|w| unsafe { w.bits(ICR_ADDRCF) });
    }

    fn read_data(&mut self) -> u8 {
        (self.i2c.rxdr.read().bits() & 0xFF) as u8
    }

    fn write_data(&mut self, byte: u8) {
        self.i2c.txdr.write(|w| unsafe { w.bits(u32::from(byte)) });
    }

    fn respond(&mut self, response: RxResponse) {
        self.reload_one(response == RxResponse::Nack);
    }

    fn clear_stop(&mut self) {
        self.i2c
            .icr
            .write(|w| unsafe { w.bits(ICR_STOPCF | ICR_BERRCF | ICR_ARLOCF | ICR_NACKCF) });
        self.flush_tx();
    }

    fn rearm_stop_detection(&mut self) {
        self.set_sda_mode(MODER_INPUT);
        // AFRH still selects AF4, so this hands SDA straight back to I2C1
        self.set_sda_mode(MODER_ALTERNATE);
    }
}
