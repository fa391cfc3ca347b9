// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `embedded-hal` 1.0 digital pin adapters over the HAL's typed GPIO pins.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stm32f7xx_hal::gpio::{self, Input, Output, PushPull};

/// Push-pull output.
pub struct Out<const P: char, const N: u8>(gpio::Pin<P, N, Output<PushPull>>);

impl<const P: char, const N: u8> Out<P, N> {
    pub fn new(pin: gpio::Pin<P, N, Output<PushPull>>) -> Self {
        Self(pin)
    }

    pub fn free(self) -> gpio::Pin<P, N, Output<PushPull>> {
        self.0
    }
}

impl<const P: char, const N: u8> ErrorType for Out<P, N> {
    type Error = Infallible;
}

impl<const P: char, const N: u8> OutputPin for Out<P, N> {
    #[inline]
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set_low();
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set_high();
        Ok(())
    }
}

/// Digital input with whatever pull `PULL` the pin was configured with.
pub struct In<const P: char, const N: u8, PULL>(gpio::Pin<P, N, Input<PULL>>);

impl<const P: char, const N: u8, PULL> In<P, N, PULL> {
    pub fn new(pin: gpio::Pin<P, N, Input<PULL>>) -> Self {
        Self(pin)
    }

    pub fn free(self) -> gpio::Pin<P, N, Input<PULL>> {
        self.0
    }
}

impl<const P: char, const N: u8, PULL> ErrorType for In<P, N, PULL> {
    type Error = Infallible;
}

impl<const P: char, const N: u8, PULL> InputPin for In<P, N, PULL> {
    #[inline]
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.is_high())
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.is_low())
    }
}
