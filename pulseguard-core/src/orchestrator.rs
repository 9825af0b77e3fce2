//! Measurement Orchestration
//!
//! ## One Monitor Cycle
//!
//! [`run_measurement`] drives a single monitor for a bounded duration:
//!
//! ```text
//!              start()
//!                 │
//!        ┌────────┴────────┐        thread::scope
//!        ▼                 ▼
//!  display.countdown   monitor.run(duration)
//!        │                 │
//!        └────────┬────────┘        join both
//!                 ▼
//!       sampler join value ──► result
//!                 │
//!               stop()
//! ```
//!
//! The sampling thread's return value is the only data crossing the thread
//! boundary, and it is read only after both threads have been joined.
//!
//! ## One Trigger Cycle
//!
//! [`MeasurementStation::trigger`] runs heart rate, then saturation, never
//! both at once since they share the sensor. When both succeed the summary
//! is shown, the record is stored and the alert decision is taken; a
//! failed monitor turns the whole cycle into a failure screen with nothing
//! stored or alerted. Connector errors are logged and never fail a cycle.

use std::sync::{Mutex, PoisonError};
use std::thread;

use crate::alert::{AlertDecision, AlertEvaluator, Thresholds};
use crate::config::MeasurementConfig;
use crate::constants::time::MS_PER_SECOND;
use crate::errors::{MeasurementError, MeasurementResult};
use crate::monitors::Monitor;
use crate::records::HealthRecord;
use crate::time::TimeSource;
use crate::traits::{AlertIndicator, Display, PersistenceApi, Placement};
use crate::trigger::TriggerGuard;

/// Text shown when a cycle produced no usable result
pub const FAILURE_TEXT: &str = "Measurement\nfailed";

const LABEL_FONT_SIZE: u8 = 24;
const SUMMARY_FONT_SIZE: u8 = 12;

/// Run one monitor for `duration_ms` alongside the display countdown
///
/// The monitor is started before the threads are spawned and always
/// stopped after both are joined, whatever the outcome.
pub fn run_measurement<M, D>(monitor: &mut M, display: &mut D, duration_ms: u64) -> MeasurementResult<f32>
where
    M: Monitor + Send,
    D: Display + Send,
{
    monitor.start()?;
    log_info!("{} measurement started ({} ms)", monitor.name(), duration_ms);

    let seconds = u32::try_from(duration_ms.div_ceil(MS_PER_SECOND)).unwrap_or(u32::MAX);

    let result = thread::scope(|scope| {
        let countdown = scope.spawn(|| display.countdown(seconds));
        let sampler = scope.spawn(|| monitor.run(duration_ms));

        let sampled = sampler
            .join()
            .unwrap_or(Err(MeasurementError::TaskPanicked { task: "sampling" }));

        if countdown.join().is_err() {
            log_warn!("Display countdown panicked");
        }

        sampled
    });

    if let Err(e) = monitor.stop() {
        log_warn!("{} stop failed: {}", monitor.name(), e);
    }

    match &result {
        Ok(value) => {
            log_info!("{} result: {:.2}", monitor.name(), value);
        }
        Err(e) => {
            log_error!("{} measurement failed: {}", monitor.name(), e);
        }
    }

    result
}

/// Outcome of one trigger cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Heart-rate monitor result (BPM)
    pub heart_rate: MeasurementResult<f32>,
    /// Saturation monitor result (%)
    pub spo2: MeasurementResult<f32>,
    /// Alert decision, present only when both monitors succeeded
    pub decision: Option<AlertDecision>,
}

impl CycleReport {
    /// True when both monitors produced a result
    pub fn is_success(&self) -> bool {
        self.decision.is_some()
    }

    /// Stored record, if the cycle succeeded
    pub fn record(&self) -> Option<HealthRecord> {
        self.decision.as_ref().map(AlertDecision::record)
    }
}

/// Owned handles the station drives
pub struct StationParts<H, O, D, P, L, C> {
    /// Heart-rate monitor
    pub heart_rate: H,
    /// Saturation monitor
    pub spo2: O,
    /// On-device display
    pub display: D,
    /// Remote store and SMS relay
    pub persistence: P,
    /// Alert LED
    pub indicator: L,
    /// Clock for label hold and blink timing
    pub clock: C,
}

/// A complete bedside station: monitors, peripherals and policy
///
/// `trigger` takes `&self` so a button handler on another thread can call
/// it; a trigger arriving while a cycle runs is rejected with
/// [`MeasurementError::CycleInProgress`] instead of queuing.
pub struct MeasurementStation<H, O, D, P, L, C> {
    guard: TriggerGuard,
    parts: Mutex<StationParts<H, O, D, P, L, C>>,
    evaluator: AlertEvaluator,
    config: MeasurementConfig,
}

impl<H, O, D, P, L, C> MeasurementStation<H, O, D, P, L, C>
where
    H: Monitor + Send,
    O: Monitor + Send,
    D: Display + Send,
    P: PersistenceApi,
    L: AlertIndicator,
    C: TimeSource,
{
    /// Station with default thresholds and timing
    pub fn new(parts: StationParts<H, O, D, P, L, C>) -> Self {
        Self {
            guard: TriggerGuard::new(),
            parts: Mutex::new(parts),
            evaluator: AlertEvaluator::default(),
            config: MeasurementConfig::default(),
        }
    }

    /// Replace the alert thresholds
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.evaluator = AlertEvaluator::new(thresholds);
        self
    }

    /// Replace the cycle timing
    pub fn with_config(mut self, config: MeasurementConfig) -> Self {
        self.config = config;
        self
    }

    /// Cycle timing in use
    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    /// True while a cycle is running
    pub fn is_busy(&self) -> bool {
        self.guard.is_active()
    }

    /// Run one full cycle: heart rate, saturation, persistence, alerting
    pub fn trigger(&self) -> MeasurementResult<CycleReport> {
        let _token = self.guard.try_begin().map_err(|e| {
            log_warn!("Trigger ignored, a measurement is already running");
            e
        })?;

        // The guard already excludes other cycles, a poisoned lock only
        // means a previous cycle panicked.
        let mut parts = self.parts.lock().unwrap_or_else(PoisonError::into_inner);
        let parts = &mut *parts;

        let duration_ms = self.config.duration_ms();

        let heart_rate = self.measure(&mut parts.heart_rate, &mut parts.display, &parts.clock, duration_ms);
        let spo2 = self.measure(&mut parts.spo2, &mut parts.display, &parts.clock, duration_ms);

        let decision = match (heart_rate, spo2) {
            (Ok(hr), Ok(sat)) => Some(self.complete(parts, hr, sat)),
            _ => {
                parts.display.show(FAILURE_TEXT, Placement::Center, LABEL_FONT_SIZE);
                None
            }
        };

        Ok(CycleReport {
            heart_rate,
            spo2,
            decision,
        })
    }

    fn measure<M: Monitor + Send>(&self, monitor: &mut M, display: &mut D, clock: &C, duration_ms: u64) -> MeasurementResult<f32> {
        monitor.apply_config(&self.config);
        display.show(monitor.name(), Placement::Center, LABEL_FONT_SIZE);
        clock.sleep_ms(self.config.label_hold_ms);

        run_measurement(monitor, display, duration_ms)
    }

    fn complete(&self, parts: &mut StationParts<H, O, D, P, L, C>, heart_rate: f32, spo2: f32) -> AlertDecision {
        let record = HealthRecord::new(heart_rate, spo2);
        parts
            .display
            .show(&record.to_string(), Placement::Center, SUMMARY_FONT_SIZE);

        if let Err(e) = parts.persistence.store_health(&record) {
            log_error!("Failed to store measurement: {}", e);
        }

        let decision = self.evaluator.decide(heart_rate, spo2);
        if decision.alert {
            parts
                .indicator
                .blink(self.config.blink_count, self.config.blink_period_ms, &parts.clock);

            if let Err(e) = parts.persistence.send_sms_alert(&decision.record()) {
                log_error!("Failed to send SMS alert: {}", e);
            }
        }

        decision
    }

    /// Blank the display, switch the LED off and hand the parts back
    pub fn shutdown(self) -> StationParts<H, O, D, P, L, C> {
        let mut parts = self.parts.into_inner().unwrap_or_else(PoisonError::into_inner);
        parts.display.clear();
        parts.indicator.set(false);
        log_info!("Station shut down");
        parts
    }
}
