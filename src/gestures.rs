//! Per-sample gesture detection: impulse gestures (jump/attack) from
//! world-frame acceleration, and discrete turns from the orientation history.

use std::collections::VecDeque;

use nalgebra::Vector3;

use crate::{config::Thresholds, orientation::EulerDeg};

/// Which way the character is facing. Flipped by the turn detector, read by
/// the walking hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Shortest-path angular difference between two headings, in degrees.
/// Always in `[0, 180]`.
pub fn shortest_angle_deg(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs() % 360.0;
    180.0 - (diff - 180.0).abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpulseGesture {
    Jump,
    Attack,
}

/// Classifies world-frame acceleration samples into jump / attack / none.
///
/// The running peaks are diagnostic state for tuning dashboards; the trigger
/// decision itself compares the current sample against the thresholds.
pub struct ImpulseDetector {
    peak_z: f32,
    peak_xy: f32,
}

impl ImpulseDetector {
    pub fn new() -> Self {
        Self {
            peak_z: 0.0,
            peak_xy: 0.0,
        }
    }

    /// Evaluate one world-frame acceleration sample. Jump is checked before
    /// attack so a strong upward motion is never misread as a punch.
    pub fn observe(&mut self, world: Vector3<f32>, t: &Thresholds) -> Option<ImpulseGesture> {
        let xy_magnitude = (world.x * world.x + world.y * world.y).sqrt();

        if world.z > self.peak_z {
            self.peak_z = world.z;
        }
        if xy_magnitude > self.peak_xy {
            self.peak_xy = xy_magnitude;
        }

        if world.z > t.jump_z_accel {
            self.reset();
            Some(ImpulseGesture::Jump)
        } else if xy_magnitude > t.punch_xy_accel {
            self.reset();
            Some(ImpulseGesture::Attack)
        } else {
            None
        }
    }

    /// Running maxima since the last trigger or reset: `(peak_z, peak_xy)`.
    pub fn peaks(&self) -> (f32, f32) {
        (self.peak_z, self.peak_xy)
    }

    pub fn reset(&mut self) {
        self.peak_z = 0.0;
        self.peak_xy = 0.0;
    }
}

impl Default for ImpulseDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Orientation history depth: ~0.5 s at the 50 Hz the phone sends.
pub const TURN_HISTORY_CAPACITY: usize = 25;

/// Detects deliberate body turns from the rolling orientation history.
///
/// A turn needs a large shortest-path yaw delta between the oldest and newest
/// snapshot *and* bounded pitch/roll drift over the same span — the stability
/// gate keeps wrist bends and phone lifts from registering as turns.
pub struct TurnDetector {
    history: VecDeque<EulerDeg>,
}

impl TurnDetector {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(TURN_HISTORY_CAPACITY),
        }
    }

    /// Append an orientation snapshot and report whether a turn triggered.
    /// On a trigger the history is cleared, so one large rotation cannot
    /// flip the facing more than once.
    pub fn observe(&mut self, euler: EulerDeg, t: &Thresholds) -> bool {
        self.history.push_back(euler);
        while self.history.len() > TURN_HISTORY_CAPACITY {
            self.history.pop_front();
        }

        // Warm-up: a full buffer is the precondition for evaluation.
        if self.history.len() < TURN_HISTORY_CAPACITY {
            return false;
        }

        let oldest = self.history.front().unwrap();
        let newest = self.history.back().unwrap();

        let yaw_diff = shortest_angle_deg(newest.yaw, oldest.yaw);
        let pitch_diff = (newest.pitch - oldest.pitch).abs();
        let roll_diff = (newest.roll - oldest.roll).abs();
        let is_stable = pitch_diff < t.stability_degrees && roll_diff < t.stability_degrees;

        if yaw_diff > t.turn_degrees && is_stable {
            self.history.clear();
            true
        } else {
            false
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for TurnDetector {
    fn default() -> Self {
        Self::new()
    }
}
