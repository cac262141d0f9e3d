//! Calibration: short guided recording windows per gesture, peak or interval
//! statistics, and threshold recommendations derived from them.
//!
//! The recorders pull from a [`SampleSource`] and never touch the live
//! thresholds; the wizard folds accepted recommendations into a fresh
//! snapshot at the end, so an aborted gesture commits nothing.

use std::time::{Duration, Instant};

use crate::{
    config::Thresholds,
    gestures::{ImpulseDetector, shortest_angle_deg},
    net::SampleSource,
    orientation::quaternion_to_euler_deg,
    wire::SensorData,
};

/// Recording window per punch/jump attempt.
pub const IMPULSE_WINDOW: Duration = Duration::from_secs(2);
/// Recording window per turn attempt.
pub const TURN_WINDOW: Duration = Duration::from_secs(3);
/// Walking rhythm recording window.
pub const WALK_WINDOW: Duration = Duration::from_secs(10);
/// How long to wait for a starting azimuth before giving up on a turn sample.
pub const AZIMUTH_WAIT: Duration = Duration::from_secs(10);

/// Attempts per impulse/turn gesture.
pub const SAMPLES_PER_GESTURE: usize = 3;

/// Peaks below this are not a deliberate gesture; the user gets a retry.
pub const SANITY_FLOOR_ACCEL: f32 = 5.0;
/// Impulse thresholds never drop below this.
pub const MIN_IMPULSE_THRESHOLD: f32 = 8.0;
/// Threshold offset factors: mean − k·stddev.
pub const PUNCH_STDDEV_FACTOR: f32 = 1.0;
pub const JUMP_STDDEV_FACTOR: f32 = 1.5;

/// Minimal chatter filter while recording step rhythm. Far below any real
/// debounce so the natural cadence comes through.
const STEP_CHATTER_FILTER: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Punch,
    Jump,
    Turn,
    Walking,
}

impl Gesture {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "punch" => Some(Gesture::Punch),
            "jump" => Some(Gesture::Jump),
            "turn" => Some(Gesture::Turn),
            "walking" => Some(Gesture::Walking),
            _ => None,
        }
    }
}

// ---------- Recorders ----------

/// Record one impulse window, returning `(peak_z, peak_xy)` tracked with the
/// impulse detector's own peak logic (thresholds disarmed so nothing
/// triggers). Raw device-frame values, matching how the gesture will be
/// thrown during play from the same stance.
pub fn record_impulse_peaks(source: &mut dyn SampleSource, window: Duration) -> (f32, f32) {
    let disarmed = Thresholds {
        punch_xy_accel: f32::INFINITY,
        jump_z_accel: f32::INFINITY,
        ..Thresholds::default()
    };
    let mut detector = ImpulseDetector::new();

    let deadline = Instant::now() + window;
    while Instant::now() < deadline {
        if let Some(sample) = source.recv() {
            if let SensorData::LinearAcceleration(v) = sample.data {
                detector.observe(v, &disarmed);
            }
        }
    }

    detector.peaks()
}

/// Wait for the first rotation-vector packet and return its yaw in degrees.
/// `None` if the phone stays silent past `wait_limit`.
pub fn wait_for_azimuth(source: &mut dyn SampleSource, wait_limit: Duration) -> Option<f32> {
    let deadline = Instant::now() + wait_limit;
    while Instant::now() < deadline {
        if let Some(sample) = source.recv() {
            if let SensorData::RotationVector(q) = sample.data {
                return Some(quaternion_to_euler_deg(&q).yaw);
            }
        }
    }
    None
}

/// Record one turn window: the maximum shortest-path yaw delta from the
/// locked starting azimuth.
pub fn record_max_turn(source: &mut dyn SampleSource, start_azimuth: f32, window: Duration) -> f32 {
    let mut max_diff = 0.0f32;

    let deadline = Instant::now() + window;
    while Instant::now() < deadline {
        if let Some(sample) = source.recv() {
            if let SensorData::RotationVector(q) = sample.data {
                let yaw = quaternion_to_euler_deg(&q).yaw;
                let diff = shortest_angle_deg(start_azimuth, yaw);
                if diff > max_diff {
                    max_diff = diff;
                }
            }
        }
    }

    max_diff
}

/// Record step-pulse arrival times over the window, with a minimal chatter
/// filter. Interval math runs on packet arrival stamps, not on the poll
/// clock.
pub fn record_step_times(source: &mut dyn SampleSource, window: Duration) -> Vec<Instant> {
    let mut steps: Vec<Instant> = Vec::new();

    let deadline = Instant::now() + window;
    while Instant::now() < deadline {
        if let Some(sample) = source.recv() {
            if matches!(sample.data, SensorData::StepPulse) {
                let accept = match steps.last() {
                    Some(last) => {
                        sample.at.duration_since(*last).as_secs_f32() > STEP_CHATTER_FILTER
                    }
                    None => true,
                };
                if accept {
                    steps.push(sample.at);
                }
            }
        }
    }

    steps
}

// ---------- Statistics & derivation ----------

pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Sample standard deviation (n − 1 denominator). Zero for fewer than two
/// values.
pub fn sample_stddev(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / (values.len() - 1) as f32;
    variance.sqrt()
}

/// `mean − k·stddev`, floored, from at least two valid peak readings.
/// `None` means: keep the previous threshold, report failure.
pub fn derive_impulse_threshold(peaks: &[f32], stddev_factor: f32) -> Option<f32> {
    if peaks.len() < 2 {
        return None;
    }
    let recommended = mean(peaks) - stddev_factor * sample_stddev(peaks);
    Some(recommended.max(MIN_IMPULSE_THRESHOLD))
}

/// 75% of the measured average turn, with a 90° floor.
pub fn derive_turn_threshold(turn_magnitudes: &[f32]) -> Option<f32> {
    if turn_magnitudes.len() < 2 {
        return None;
    }
    Some((0.75 * mean(turn_magnitudes)).max(90.0))
}

/// `(step_debounce_sec, walk_timeout_sec)` from the natural step rhythm.
/// Needs at least three recorded steps (two intervals).
pub fn derive_walking_params(step_times: &[Instant]) -> Option<(f32, f32)> {
    if step_times.len() < 3 {
        return None;
    }
    let intervals: Vec<f32> = step_times
        .windows(2)
        .map(|w| w[1].duration_since(w[0]).as_secs_f32())
        .collect();
    let avg = mean(&intervals);
    Some((0.75 * avg, 2.5 * avg))
}
