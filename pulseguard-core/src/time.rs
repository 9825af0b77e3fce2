//! Time management for measurement loops
//!
//! Every measurement cycle is bounded by a wall-clock deadline, and the
//! saturation loop sleeps a fixed interval between iterations. Both go
//! through [`TimeSource`] so that:
//! - the Raspberry Pi build uses the monotonic system clock
//! - tests drive a [`MockClock`] that jumps forward instead of sleeping

/// Timestamp in milliseconds since the clock's origin
pub type Timestamp = u64;

/// Source of time for the sampling loops
pub trait TimeSource {
    /// Current monotonic timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Block the calling thread for `ms` milliseconds
    fn sleep_ms(&self, ms: u64);

    /// Deadline `duration_ms` from now
    fn deadline_after(&self, duration_ms: u64) -> Timestamp {
        self.now().saturating_add(duration_ms)
    }
}

/// Monotonic clock backed by `std::time::Instant`
///
/// Starts at 0 when constructed, always increases.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Clock with its origin at the current instant
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}

/// Shared simulated clock for tests and replays
///
/// Clones share the same counter, so a mock sensor can advance the time
/// seen by the monitor that samples it. `sleep_ms` returns immediately
/// after moving the counter forward.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now_ms: std::sync::Arc<core::sync::atomic::AtomicU64>,
}

#[cfg(feature = "std")]
impl MockClock {
    /// Clock starting at `start` milliseconds
    pub fn new(start: Timestamp) -> Self {
        Self {
            now_ms: std::sync::Arc::new(core::sync::atomic::AtomicU64::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, core::sync::atomic::Ordering::SeqCst);
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, timestamp: Timestamp) {
        self.now_ms.store(timestamp, core::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(feature = "std")]
impl TimeSource for MockClock {
    fn now(&self) -> Timestamp {
        self.now_ms.load(core::sync::atomic::Ordering::SeqCst)
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance(ms);
    }
}
