// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-shared state.
//!
//! The bus, encoder and tick interrupts all mutate the same axis state. Every access goes through
//! [`Shared`], which takes a critical section for the duration of the closure. On a single-core
//! target with equal interrupt priorities this costs a couple of instructions; on anything with
//! preemptive priorities it is what keeps the handlers from interleaving.

use core::cell::RefCell;

use critical_section::Mutex;

/// A value shared between interrupt handlers.
pub struct Shared<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> Shared<T> {
    /// Wrap a value. `const` so it can back a `static`.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with shared access inside a critical section.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        critical_section::with(|cs| f(&self.inner.borrow_ref(cs)))
    }

    /// Run `f` with exclusive access inside a critical section.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Swap in a new value, returning the old one.
    pub fn replace(&self, value: T) -> T {
        critical_section::with(|cs| self.inner.replace(cs, value))
    }
}

impl<T> Shared<Option<T>> {
    /// Run `f` only once the value has been installed. Interrupts that fire before boot finished
    /// wiring things up fall through here.
    pub fn with_installed<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.with_mut(|slot| slot.as_mut().map(f))
    }
}
