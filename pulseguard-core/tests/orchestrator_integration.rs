//! Integration tests for full trigger cycles
//!
//! Heart rate, then saturation, then persistence and alerting, driven
//! through `MeasurementStation` with recording peripherals.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use pulseguard_core::monitors::{HeartRateMonitor, OxygenSaturationMonitor};
use pulseguard_core::orchestrator::{MeasurementStation, StationParts, FAILURE_TEXT};
use pulseguard_core::time::{MockClock, TimeSource};
use pulseguard_core::{HealthRecord, MeasurementConfig, MeasurementError, Placement, Thresholds};

use common::{
    shared, snapshot, FixedEstimator, FlatOximeter, RecordingDisplay, RecordingLed,
    RecordingPersistence, Screen, Shared, ScriptedDetector, StalledSensor, SyntheticPpg,
};

type Station = MeasurementStation<
    HeartRateMonitor<SyntheticPpg, ScriptedDetector, MockClock>,
    OxygenSaturationMonitor<FlatOximeter, FixedEstimator, MockClock>,
    RecordingDisplay,
    RecordingPersistence,
    RecordingLed,
    MockClock,
>;

struct Logs {
    screens: Shared<Screen>,
    stored: Shared<HealthRecord>,
    alerts: Shared<HealthRecord>,
    levels: Shared<bool>,
}

impl Logs {
    fn new() -> Self {
        Self {
            screens: shared(),
            stored: shared(),
            alerts: shared(),
            levels: shared(),
        }
    }
}

/// Station plus the switch that makes the heart-rate sensor fail to start
fn station(spo2: f32, display: RecordingDisplay, logs: &Logs) -> (Station, Arc<AtomicBool>) {
    let clock = MockClock::new(0);
    let sensor = SyntheticPpg::new(clock.clone(), 80);
    let fail_begin = sensor.fail_begin.clone();

    let parts = StationParts {
        heart_rate: HeartRateMonitor::new(sensor, ScriptedDetector::every(80), clock.clone()),
        spo2: OxygenSaturationMonitor::new(
            FlatOximeter::new(120_000, 110_000, 25),
            FixedEstimator::valid(spo2),
            clock.clone(),
        ),
        display,
        persistence: RecordingPersistence::new(logs.stored.clone(), logs.alerts.clone()),
        indicator: RecordingLed {
            levels: logs.levels.clone(),
        },
        clock,
    };

    (MeasurementStation::new(parts), fail_begin)
}

fn shown(screens: &[Screen]) -> Vec<String> {
    screens
        .iter()
        .filter_map(|screen| match screen {
            Screen::Show(text, _, _) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn normal_cycle_stores_without_alert() {
    let logs = Logs::new();
    let (station, _) = station(97.0, RecordingDisplay::new(logs.screens.clone()), &logs);

    let report = station.trigger().unwrap();

    assert_eq!(report.heart_rate, Ok(75.0));
    assert_eq!(report.spo2, Ok(97.0));
    assert!(report.is_success());
    assert!(!report.decision.unwrap().alert);

    assert_eq!(snapshot(&logs.stored), vec![HealthRecord::new(75.0, 97.0)]);
    assert!(snapshot(&logs.alerts).is_empty());
    assert!(snapshot(&logs.levels).is_empty());

    let screens = snapshot(&logs.screens);
    assert_eq!(
        screens,
        vec![
            Screen::Show("Heart Rate".into(), Placement::Center, 24),
            Screen::Countdown(15),
            Screen::Show("SpO2".into(), Placement::Center, 24),
            Screen::Countdown(15),
            Screen::Show("HR: 75.00 bpm\nSpO2: 97.00 %".into(), Placement::Center, 12),
        ]
    );
}

#[test]
fn low_saturation_blinks_and_alerts() {
    let logs = Logs::new();
    let (station, _) = station(90.0, RecordingDisplay::new(logs.screens.clone()), &logs);

    let report = station.trigger().unwrap();

    let decision = report.decision.unwrap();
    assert!(decision.alert);

    assert_eq!(snapshot(&logs.stored).len(), 1);
    assert_eq!(snapshot(&logs.alerts), vec![HealthRecord::new(75.0, 90.0)]);

    let levels = snapshot(&logs.levels);
    assert_eq!(levels.len(), 12);
    assert!(levels.chunks(2).all(|pair| pair == [true, false]));
}

#[test]
fn custom_thresholds_change_the_decision() {
    let logs = Logs::new();
    let (station, _) = station(90.0, RecordingDisplay::new(logs.screens.clone()), &logs);
    let station = station.with_thresholds(Thresholds::default().with_spo2_min(88.0));

    let report = station.trigger().unwrap();

    assert!(!report.decision.unwrap().alert);
    assert!(snapshot(&logs.alerts).is_empty());
}

#[test]
fn sensor_failure_shows_failure_and_recovers() {
    let logs = Logs::new();
    let (station, fail_begin) = station(97.0, RecordingDisplay::new(logs.screens.clone()), &logs);

    fail_begin.store(true, Ordering::SeqCst);
    let report = station.trigger().unwrap();

    assert!(matches!(
        report.heart_rate,
        Err(MeasurementError::SensorInitFailed { .. })
    ));
    assert!(!report.is_success());
    assert_eq!(report.record(), None);
    assert!(snapshot(&logs.stored).is_empty());
    assert!(snapshot(&logs.alerts).is_empty());
    assert_eq!(shown(&snapshot(&logs.screens)).last().unwrap(), FAILURE_TEXT);
    assert!(!station.is_busy());

    // Next trigger runs a fresh cycle
    fail_begin.store(false, Ordering::SeqCst);
    let report = station.trigger().unwrap();

    assert!(report.is_success());
    assert_eq!(snapshot(&logs.stored), vec![HealthRecord::new(75.0, 97.0)]);
}

#[test]
fn persistence_failure_does_not_fail_cycle() {
    let logs = Logs::new();
    let clock = MockClock::new(0);
    let mut persistence = RecordingPersistence::new(logs.stored.clone(), logs.alerts.clone());
    persistence.fail = true;

    let station = MeasurementStation::new(StationParts {
        heart_rate: HeartRateMonitor::new(
            SyntheticPpg::new(clock.clone(), 80),
            ScriptedDetector::every(80),
            clock.clone(),
        ),
        spo2: OxygenSaturationMonitor::new(
            FlatOximeter::new(120_000, 110_000, 25),
            FixedEstimator::valid(90.0),
            clock.clone(),
        ),
        display: RecordingDisplay::new(logs.screens.clone()),
        persistence,
        indicator: RecordingLed {
            levels: logs.levels.clone(),
        },
        clock,
    });

    let report = station.trigger().unwrap();

    assert!(report.decision.unwrap().alert);
    assert_eq!(snapshot(&logs.levels).len(), 12);
}

#[test]
fn retrigger_during_cycle_is_rejected() {
    let logs = Logs::new();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let display = RecordingDisplay::gated(logs.screens.clone(), started_tx, release_rx);
    let (station, _) = station(97.0, display, &logs);

    thread::scope(|scope| {
        let first = scope.spawn(|| station.trigger());

        // First cycle is inside its heart-rate countdown
        started_rx.recv().unwrap();
        assert!(station.is_busy());
        assert_eq!(station.trigger(), Err(MeasurementError::CycleInProgress));

        release_tx.send(()).unwrap();
        let report = first.join().unwrap().unwrap();
        assert!(report.is_success());
    });

    assert!(!station.is_busy());
    assert_eq!(snapshot(&logs.stored).len(), 1);
}

#[test]
fn shorter_cycles_from_config() {
    let logs = Logs::new();
    let (station, _) = station(97.0, RecordingDisplay::new(logs.screens.clone()), &logs);
    let station = station.with_config(MeasurementConfig::default().with_measure_seconds(5));

    let report = station.trigger().unwrap();

    assert_eq!(report.heart_rate, Ok(75.0));
    assert!(snapshot(&logs.screens).contains(&Screen::Countdown(5)));
}

#[test]
fn saturation_loop_interval_from_config() {
    let logs = Logs::new();
    let (station, _) = station(97.0, RecordingDisplay::new(logs.screens.clone()), &logs);
    let station = station.with_config(MeasurementConfig::default().with_spo2_loop_ms(1_000));

    station.trigger().unwrap();
    let parts = station.shutdown();

    // 15 iterations at 1 s, the window fills during the 4th
    assert_eq!(parts.spo2.readings().len(), 12);
}

#[test]
fn stalled_sensor_fails_cycle_and_releases_trigger() {
    let logs = Logs::new();
    let clock = MockClock::new(0);

    let station = MeasurementStation::new(StationParts {
        heart_rate: HeartRateMonitor::new(
            StalledSensor::new(0),
            ScriptedDetector::every(80),
            clock.clone(),
        ),
        spo2: OxygenSaturationMonitor::new(
            FlatOximeter::new(120_000, 110_000, 25),
            FixedEstimator::valid(97.0),
            clock.clone(),
        ),
        display: RecordingDisplay::new(logs.screens.clone()),
        persistence: RecordingPersistence::new(logs.stored.clone(), logs.alerts.clone()),
        indicator: RecordingLed {
            levels: logs.levels.clone(),
        },
        clock,
    });

    let report = station.trigger().unwrap();
    assert_eq!(report.heart_rate, Err(MeasurementError::EmptyReadingSet));
    assert!(!report.is_success());
    assert!(!station.is_busy());

    // Guard was released, the next trigger runs a full cycle again
    assert!(station.trigger().is_ok());
    assert!(snapshot(&logs.stored).is_empty());
}

#[test]
fn shutdown_clears_display_and_led() {
    let logs = Logs::new();
    let (station, _) = station(97.0, RecordingDisplay::new(logs.screens.clone()), &logs);

    let parts = station.shutdown();

    assert_eq!(snapshot(&logs.screens), vec![Screen::Clear]);
    assert_eq!(snapshot(&logs.levels), vec![false]);
    assert_eq!(parts.clock.now(), 0);
}
