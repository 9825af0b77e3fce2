//! Alert Evaluation
//!
//! A completed measurement is escalated when either vital leaves its safe
//! range:
//!
//! | Vital | Alert when |
//! |-------|------------|
//! | Heart rate | `< 20` or `> 180` BPM |
//! | Saturation | `< 94` % |
//!
//! All comparisons are strict: a value sitting exactly on a threshold does
//! not alert. The evaluation is pure and never looks at previous cycles.

use crate::constants::thresholds::{HEART_RATE_MAX_BPM, HEART_RATE_MIN_BPM, SPO2_MIN_PCT};
use crate::records::HealthRecord;

/// Alerting limits
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds {
    /// Heart rate below this alerts (BPM)
    pub heart_rate_min: f32,
    /// Heart rate above this alerts (BPM)
    pub heart_rate_max: f32,
    /// Saturation below this alerts (%)
    pub spo2_min: f32,
}

impl Thresholds {
    /// Set the lower heart-rate limit
    pub fn with_heart_rate_min(mut self, bpm: f32) -> Self {
        self.heart_rate_min = bpm;
        self
    }

    /// Set the upper heart-rate limit
    pub fn with_heart_rate_max(mut self, bpm: f32) -> Self {
        self.heart_rate_max = bpm;
        self
    }

    /// Set the saturation limit
    pub fn with_spo2_min(mut self, pct: f32) -> Self {
        self.spo2_min = pct;
        self
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            heart_rate_min: HEART_RATE_MIN_BPM,
            heart_rate_max: HEART_RATE_MAX_BPM,
            spo2_min: SPO2_MIN_PCT,
        }
    }
}

/// True if the heart rate or the saturation is out of range
pub fn evaluate(heart_rate: f32, spo2: f32, thresholds: &Thresholds) -> bool {
    heart_rate < thresholds.heart_rate_min
        || heart_rate > thresholds.heart_rate_max
        || spo2 < thresholds.spo2_min
}

/// Outcome of evaluating one completed cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertDecision {
    /// Whether to escalate
    pub alert: bool,
    /// Evaluated heart rate (BPM)
    pub heart_rate: f32,
    /// Evaluated saturation (%)
    pub spo2: f32,
}

impl AlertDecision {
    /// Record sent with the SMS alert
    pub fn record(&self) -> HealthRecord {
        HealthRecord::new(self.heart_rate, self.spo2)
    }
}

/// Applies a fixed set of thresholds to cycle results
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertEvaluator {
    thresholds: Thresholds,
}

impl AlertEvaluator {
    /// Evaluator with the given limits
    pub const fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Limits in use
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Decide whether a heart rate / saturation pair alerts
    pub fn decide(&self, heart_rate: f32, spo2: f32) -> AlertDecision {
        let alert = evaluate(heart_rate, spo2, &self.thresholds);
        if alert {
            log_warn!(
                "Vitals out of range: HR {:.2} bpm, SpO2 {:.2} %",
                heart_rate,
                spo2
            );
        }

        AlertDecision {
            alert,
            heart_rate,
            spo2,
        }
    }
}
