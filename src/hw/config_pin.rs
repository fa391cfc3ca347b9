// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Boot-time axis selection from a tri-state strap pin.

use stm32f7xx_hal::gpio;

use crate::config::axis_from_pin_levels;

/// Core cycles to let the pin settle after switching its pull.
const SETTLE_CYCLES: u32 = 2_000;

/// Sample `pin` with its pull-up and then its pull-down enabled, and return the axis index the
/// strap selects. The pin is left as a pulled-down input and handed back.
pub fn sense_axis<const P: char, const N: u8, MODE>(
    pin: gpio::Pin<P, N, MODE>,
) -> (u8, gpio::Pin<P, N, gpio::Input<gpio::PullDown>>) {
    let pin = pin.into_pull_up_input();
    cortex_m::asm::delay(SETTLE_CYCLES);
    let high_with_pull_up = pin.is_high();

    let pin = pin.into_pull_down_input();
    cortex_m::asm::delay(SETTLE_CYCLES);
    let high_with_pull_down = pin.is_high();

    (
        axis_from_pin_levels(high_with_pull_up, high_with_pull_down),
        pin,
    )
}
