//! Output-side collaborators: display, persistence API, alert LED

use core::fmt;

use crate::records::HealthRecord;
use crate::time::TimeSource;

/// Where text is placed on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Centered horizontally and vertically
    #[default]
    Center,
    /// Anchored at the top-left corner
    TopLeft,
    /// Left-aligned, vertically centered
    CenterLeft,
}

/// Small text display on the device
pub trait Display {
    /// Replace the screen contents with `text`
    fn show(&mut self, text: &str, placement: Placement, font_size: u8);

    /// Count down from `seconds` to 1, one number per second
    ///
    /// Blocks for roughly `seconds` seconds.
    fn countdown(&mut self, seconds: u32);

    /// Blank the screen
    fn clear(&mut self);
}

/// Remote store for measurement records and SMS alert requests
///
/// Both calls are fire-and-forget from the core's point of view: errors
/// are logged by the caller and never fail a measurement cycle.
pub trait PersistenceApi {
    /// Error reported by the transport
    type Error: fmt::Display;

    /// Store a completed measurement
    fn store_health(&mut self, record: &HealthRecord) -> Result<(), Self::Error>;

    /// Ask the backend to send an SMS alert for `record`
    fn send_sms_alert(&mut self, record: &HealthRecord) -> Result<(), Self::Error>;
}

/// Binary physical output used to signal an alert (an LED)
pub trait AlertIndicator {
    /// Drive the output
    fn set(&mut self, on: bool);

    /// Toggle the output `times` times, `period_ms` on then `period_ms` off
    fn blink<C: TimeSource>(&mut self, times: u32, period_ms: u64, clock: &C) {
        for _ in 0..times {
            self.set(true);
            clock.sleep_ms(period_ms);
            self.set(false);
            clock.sleep_ms(period_ms);
        }
    }
}
