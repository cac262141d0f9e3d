//! End-to-end engine scenarios: decoded sensor samples in, action events out.

use std::time::{Duration, Instant};

use nalgebra::{UnitQuaternion, Vector3};

use silkmotion::{
    config::Thresholds,
    engine::{ActionEvent, Engine},
    gestures::{Facing, TURN_HISTORY_CAPACITY},
    orientation::DEG_TO_RAD,
    wire::{SensorData, SensorSample},
};

fn rotation(at: Instant, yaw_deg: f32, pitch_deg: f32, roll_deg: f32) -> SensorSample {
    let q = UnitQuaternion::from_euler_angles(
        roll_deg * DEG_TO_RAD,
        pitch_deg * DEG_TO_RAD,
        yaw_deg * DEG_TO_RAD,
    );
    SensorSample {
        at,
        data: SensorData::RotationVector(*q.quaternion()),
    }
}

fn accel(at: Instant, x: f32, y: f32, z: f32) -> SensorSample {
    SensorSample {
        at,
        data: SensorData::LinearAcceleration(Vector3::new(x, y, z)),
    }
}

fn step(at: Instant) -> SensorSample {
    SensorSample {
        at,
        data: SensorData::StepPulse,
    }
}

/// Feed a yaw ramp at ~50 Hz. Returns all emitted events.
fn run_yaw_ramp(engine: &mut Engine, base: Instant, pitch_peak: f32) -> Vec<ActionEvent> {
    let mut events = Vec::new();
    for i in 0..TURN_HISTORY_CAPACITY {
        let frac = i as f32 / (TURN_HISTORY_CAPACITY - 1) as f32;
        let sample = rotation(
            base + Duration::from_millis(20 * i as u64),
            frac * 190.0,
            frac * pitch_peak,
            0.0,
        );
        engine.handle(&sample, &mut events);
    }
    events
}

#[test]
fn stable_body_turn_flips_facing_exactly_once() {
    let mut engine = Engine::new(Thresholds::default());

    let events = run_yaw_ramp(&mut engine, Instant::now(), 3.0);

    assert_eq!(events, vec![ActionEvent::FacingChanged(Facing::Left)]);
    assert_eq!(engine.facing(), Facing::Left);
}

#[test]
fn tilting_the_phone_during_the_ramp_blocks_the_turn() {
    let mut engine = Engine::new(Thresholds::default());

    // Same yaw sweep, but pitch drifts to 60° — past the stability gate.
    let events = run_yaw_ramp(&mut engine, Instant::now(), 60.0);

    assert!(events.is_empty(), "unexpected events: {events:?}");
    assert_eq!(engine.facing(), Facing::Right);
}

#[test]
fn jump_is_detected_in_the_world_frame() {
    let mut engine = Engine::new(Thresholds::default());
    let base = Instant::now();
    let mut events = Vec::new();

    // Device rolled 90°: its +Y axis points at the world's +Z.
    engine.handle(&rotation(base, 0.0, 0.0, 90.0), &mut events);
    assert!(events.is_empty());

    // Raw device Z is zero; only the projection makes this a jump.
    engine.handle(
        &accel(base + Duration::from_millis(20), 0.0, 20.0, 0.0),
        &mut events,
    );
    assert_eq!(events, vec![ActionEvent::Jump]);
}

#[test]
fn jump_outranks_attack_when_one_sample_crosses_both() {
    let mut engine = Engine::new(Thresholds::default());
    let mut events = Vec::new();

    engine.handle(&accel(Instant::now(), 17.0, 0.0, 20.0), &mut events);
    assert_eq!(events, vec![ActionEvent::Jump]);
}

#[test]
fn walk_lifecycle_from_steps_to_timeout() {
    let t = Thresholds::default();
    let mut engine = Engine::new(t.clone());
    let base = Instant::now();
    let mut events = Vec::new();

    engine.handle(&step(base), &mut events);
    assert_eq!(events, vec![ActionEvent::WalkStarted(Facing::Right)]);
    events.clear();

    // Chatter inside the debounce window is dropped entirely.
    engine.handle(&step(base + Duration::from_millis(100)), &mut events);
    assert!(events.is_empty());

    // A real follow-up step keeps the walk alive without a new event.
    engine.handle(&step(base + Duration::from_millis(500)), &mut events);
    assert!(events.is_empty());
    assert!(engine.is_walking());

    // Silence past the timeout; any packet's poll releases the walk.
    let late = base + Duration::from_millis(500)
        + Duration::from_secs_f32(t.walk_timeout_sec + 0.1);
    engine.handle(&accel(late, 0.0, 0.0, 1.0), &mut events);
    assert_eq!(events, vec![ActionEvent::WalkStopped]);
    assert!(!engine.is_walking());
}

#[test]
fn idle_tick_releases_the_walk_during_radio_silence() {
    let t = Thresholds::default();
    let mut engine = Engine::new(t.clone());
    let base = Instant::now();
    let mut events = Vec::new();

    engine.handle(&step(base), &mut events);
    events.clear();

    engine.tick(
        base + Duration::from_secs_f32(t.walk_timeout_sec + 0.1),
        &mut events,
    );
    assert_eq!(events, vec![ActionEvent::WalkStopped]);
}

#[test]
fn steps_after_a_turn_walk_in_the_new_facing() {
    let mut engine = Engine::new(Thresholds::default());
    let base = Instant::now();

    let events = run_yaw_ramp(&mut engine, base, 2.0);
    assert_eq!(events, vec![ActionEvent::FacingChanged(Facing::Left)]);

    let mut events = Vec::new();
    engine.handle(&step(base + Duration::from_secs(1)), &mut events);
    assert_eq!(events, vec![ActionEvent::WalkStarted(Facing::Left)]);
}
