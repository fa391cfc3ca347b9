// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SETUP / START / STOP motion sequencer.
//!
//! ```text
//!          SETUP(start) / START            target reached
//!   IDLE ------------------------> RUNNING --------------> FINISHED
//!    ^                               |                        |
//!    +------- STOP / time budget ----+        START ----------+--> RUNNING
//! ```
//!
//! The step target is the primary stop condition; the time budget accumulated by SETUP is only a
//! fallback. A budget of 0 means no time limit. The budget is consumed when a run ends.

/// Sequencer state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Elapsed-time counter advanced by the periodic tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed_ms: u32,
    running: bool,
}

impl Stopwatch {
    pub const fn new() -> Self {
        Self {
            elapsed_ms: 0,
            running: false,
        }
    }

    pub fn restart(&mut self) {
        self.elapsed_ms = 0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn advance(&mut self, ms: u32) {
        if self.running {
            self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
        }
    }

    #[inline]
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sequencer {
    phase: Phase,
    end_time_ms: u32,
    watch: Stopwatch,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            end_time_ms: 0,
            watch: Stopwatch::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Accumulated time budget of the current or next run.
    #[inline]
    pub fn end_time_ms(&self) -> u32 {
        self.end_time_ms
    }

    #[inline]
    pub fn elapsed_ms(&self) -> u32 {
        self.watch.elapsed_ms()
    }

    /// Add `end_time_ms` to the time budget and optionally start. Returns whether a run started.
    pub fn setup(&mut self, end_time_ms: u32, start_immediately: bool) -> bool {
        self.end_time_ms = self.end_time_ms.saturating_add(end_time_ms);
        start_immediately && self.start()
    }

    /// Start a run from IDLE or FINISHED. A run already in progress is left alone.
    pub fn start(&mut self) -> bool {
        if self.phase == Phase::Running {
            return false;
        }
        self.phase = Phase::Running;
        self.watch.restart();
        true
    }

    /// Back to IDLE from any phase. Returns whether the phase changed.
    pub fn stop(&mut self) -> bool {
        let changed = self.phase != Phase::Idle;
        self.end(Phase::Idle);
        changed
    }

    /// The step target was reached.
    pub fn reach_target(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.end(Phase::Finished);
        true
    }

    /// Advance the stopwatch by one tick. Returns whether the time budget ran out.
    pub fn tick(&mut self, period_ms: u32) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.watch.advance(period_ms);
        if self.end_time_ms != 0 && self.watch.elapsed_ms() > self.end_time_ms {
            self.end(Phase::Idle);
            return true;
        }
        false
    }

    fn end(&mut self, phase: Phase) {
        self.phase = phase;
        self.end_time_ms = 0;
        self.watch.stop();
    }
}
