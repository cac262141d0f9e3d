//! The engine context: one owned bundle of thresholds, detectors, and facing
//! state. The ingestion loop feeds it samples; it emits action events for the
//! key-injection edge to apply.

use std::time::Instant;

use crate::{
    config::Thresholds,
    gestures::{Facing, ImpulseDetector, ImpulseGesture, TurnDetector},
    orientation::OrientationTracker,
    walking::WalkingController,
    wire::{SensorData, SensorSample},
};

/// What the detectors decided. Side effects (key taps, holds) happen at the
/// edge, never inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent {
    Jump,
    Attack,
    FacingChanged(Facing),
    WalkStarted(Facing),
    WalkStopped,
}

pub struct Engine {
    thresholds: Thresholds,
    tracker: OrientationTracker,
    impulse: ImpulseDetector,
    turn: TurnDetector,
    walking: WalkingController,
    facing: Facing,
}

impl Engine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            tracker: OrientationTracker::new(),
            impulse: ImpulseDetector::new(),
            turn: TurnDetector::new(),
            walking: WalkingController::new(),
            facing: Facing::default(),
        }
    }

    /// Dispatch one decoded sample. Events are appended in the order they
    /// fired; the walking timeout is polled on every packet, whatever its
    /// sensor type.
    pub fn handle(&mut self, sample: &SensorSample, events: &mut Vec<ActionEvent>) {
        if self.walking.poll(sample.at, &self.thresholds) {
            events.push(ActionEvent::WalkStopped);
        }

        match sample.data {
            SensorData::LinearAcceleration(device) => {
                let world = self.tracker.world_frame(device);
                match self.impulse.observe(world, &self.thresholds) {
                    Some(ImpulseGesture::Jump) => events.push(ActionEvent::Jump),
                    Some(ImpulseGesture::Attack) => events.push(ActionEvent::Attack),
                    None => {}
                }
            }
            SensorData::RotationVector(q) => {
                let euler = self.tracker.update(q);
                if self.turn.observe(euler, &self.thresholds) {
                    self.facing = self.facing.flipped();
                    events.push(ActionEvent::FacingChanged(self.facing));
                }
            }
            SensorData::StepPulse => {
                if self.walking.on_step(sample.at, &self.thresholds) {
                    events.push(ActionEvent::WalkStarted(self.facing));
                }
            }
        }
    }

    /// Idle tick for quiet stretches with no packets, so the walking timeout
    /// still fires during radio silence.
    pub fn tick(&mut self, now: Instant, events: &mut Vec<ActionEvent>) {
        if self.walking.poll(now, &self.thresholds) {
            events.push(ActionEvent::WalkStopped);
        }
    }

    /// Teardown: force-release an active walk hold. Must run before the
    /// engine goes away so no key stays pressed.
    pub fn shutdown(&mut self, events: &mut Vec<ActionEvent>) {
        if self.walking.force_stop() {
            events.push(ActionEvent::WalkStopped);
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_walking(&self) -> bool {
        self.walking.is_walking()
    }

    /// Live impulse peaks `(peak_z, peak_xy)` for tuning output.
    pub fn impulse_peaks(&self) -> (f32, f32) {
        self.impulse.peaks()
    }
}
