//! Trigger handling
//!
//! A measurement cycle is started by a button press. Two things can go
//! wrong with a raw button line: contact bounce produces several rising
//! edges per press, and a press during a running cycle would start a second
//! one against the same sensor.
//!
//! - [`RisingEdge`] turns a sampled level into debounced press events
//! - [`TriggerGuard`] admits at most one cycle at a time; the returned
//!   [`CycleToken`] releases it when dropped, including on early return

use core::sync::atomic::{AtomicBool, Ordering};

use crate::constants::time::TRIGGER_DEBOUNCE_MS;
use crate::errors::{MeasurementError, MeasurementResult};
use crate::time::Timestamp;

/// Single-cycle admission flag
#[derive(Debug, Default)]
pub struct TriggerGuard {
    active: AtomicBool,
}

impl TriggerGuard {
    /// Guard with no cycle running
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Claim the guard for one cycle
    ///
    /// Fails with [`MeasurementError::CycleInProgress`] while another token
    /// is alive.
    pub fn try_begin(&self) -> MeasurementResult<CycleToken<'_>> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| CycleToken { guard: self })
            .map_err(|_| MeasurementError::CycleInProgress)
    }

    /// True while a cycle holds the guard
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Proof of a running cycle, releases the guard on drop
#[derive(Debug)]
pub struct CycleToken<'a> {
    guard: &'a TriggerGuard,
}

impl Drop for CycleToken<'_> {
    fn drop(&mut self) {
        self.guard.active.store(false, Ordering::Release);
    }
}

/// Debounced rising-edge detector for a polled button line
#[derive(Debug, Clone, Copy)]
pub struct RisingEdge {
    last_level: bool,
    last_fire: Option<Timestamp>,
    debounce_ms: u64,
}

impl RisingEdge {
    /// Detector with the default debounce window
    pub const fn new() -> Self {
        Self::with_debounce(TRIGGER_DEBOUNCE_MS)
    }

    /// Detector ignoring edges closer than `debounce_ms` to the last press
    pub const fn with_debounce(debounce_ms: u64) -> Self {
        Self {
            last_level: false,
            last_fire: None,
            debounce_ms,
        }
    }

    /// Feed the current line level; true on a debounced low→high transition
    pub fn update(&mut self, level: bool, now: Timestamp) -> bool {
        let rising = level && !self.last_level;
        self.last_level = level;

        if !rising {
            return false;
        }

        match self.last_fire {
            Some(fired) if now.saturating_sub(fired) < self.debounce_ms => false,
            _ => {
                self.last_fire = Some(now);
                true
            }
        }
    }
}

impl Default for RisingEdge {
    fn default() -> Self {
        Self::new()
    }
}
