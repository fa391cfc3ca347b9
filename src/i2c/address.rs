// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slave address matching.

/// The set of 7-bit addresses this slave answers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressFilter {
    /// `address`, with the bits set in `mask` ignored.
    Masked { address: u8, mask: u8 },
    /// Either of two discrete addresses.
    Dual(u8, u8),
    /// Any address in `low..=high`.
    Range { low: u8, high: u8 },
}

impl AddressFilter {
    /// Whether a 7-bit address from an address-match event belongs to us.
    pub fn matches(&self, addr: u8) -> bool {
        let addr = addr & 0x7F;
        match *self {
            AddressFilter::Masked { address, mask } => (addr ^ address) & !mask & 0x7F == 0,
            AddressFilter::Dual(a, b) => addr == a || addr == b,
            AddressFilter::Range { low, high } => (low..=high).contains(&addr),
        }
    }

    /// Smallest `(address, mask)` pair that covers every address of the filter.
    ///
    /// Peripherals that only support a single masked address get programmed with this and let
    /// [`matches`](Self::matches) reject the extra addresses in software.
    pub fn covering_mask(&self) -> (u8, u8) {
        match *self {
            AddressFilter::Masked { address, mask } => (address & !mask, mask),
            AddressFilter::Dual(a, b) => (a & b, a ^ b),
            AddressFilter::Range { low, high } => {
                let diff = low ^ high;
                // every bit at or below the highest differing bit varies across the range
                let mask = if diff == 0 {
                    0
                } else {
                    (0xFFu8 >> diff.leading_zeros()) & 0x7F
                };
                (low & !mask, mask)
            }
        }
    }
}
