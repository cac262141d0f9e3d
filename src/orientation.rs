//! Orientation tracking: quaternion → yaw/pitch/roll, plus rotation of
//! device-frame vectors into the world frame.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Euler angles in degrees. Yaw doubles as the facing-direction azimuth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerDeg {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Standard quaternion-to-Euler conversion, in degrees. Pitch saturates to a
/// sign-preserving ±90° at gimbal lock.
pub fn quaternion_to_euler_deg(q: &Quaternion<f32>) -> EulerDeg {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);

    let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));

    let sin_pitch = 2.0 * (w * y - z * x);
    let pitch = if sin_pitch.abs() >= 1.0 {
        core::f32::consts::FRAC_PI_2.copysign(sin_pitch)
    } else {
        sin_pitch.asin()
    };

    let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

    EulerDeg {
        yaw: yaw * RAD_TO_DEG,
        pitch: pitch * RAD_TO_DEG,
        roll: roll * RAD_TO_DEG,
    }
}

/// Owns the latest orientation. Readers get value snapshots; the world-frame
/// projection uses whatever the most recent fix was.
pub struct OrientationTracker {
    latest: UnitQuaternion<f32>,
    has_fix: bool,
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self {
            latest: UnitQuaternion::identity(),
            has_fix: false,
        }
    }

    /// Ingest a rotation-vector sample. Returns the derived Euler snapshot.
    pub fn update(&mut self, q: Quaternion<f32>) -> EulerDeg {
        let euler = quaternion_to_euler_deg(&q);
        self.latest = UnitQuaternion::from_quaternion(q);
        self.has_fix = true;
        euler
    }

    /// Rotate a device-frame vector into the world frame. Before the first
    /// orientation fix this is the identity transform, so gestures fall back
    /// to raw device-frame values.
    pub fn world_frame(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.latest * v
    }

    pub fn has_fix(&self) -> bool {
        self.has_fix
    }
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn identity_quaternion_is_all_zero_angles() {
        let euler = quaternion_to_euler_deg(&Quaternion::new(1.0, 0.0, 0.0, 0.0));
        assert!(euler.yaw.abs() < EPS);
        assert!(euler.pitch.abs() < EPS);
        assert!(euler.roll.abs() < EPS);
    }

    #[test]
    fn recovers_known_rotations() {
        // nalgebra's euler argument order is (roll, pitch, yaw).
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, 90.0 * DEG_TO_RAD);
        let euler = quaternion_to_euler_deg(q.quaternion());
        assert!((euler.yaw - 90.0).abs() < EPS, "yaw was {}", euler.yaw);

        let q = UnitQuaternion::from_euler_angles(30.0 * DEG_TO_RAD, 0.0, 0.0);
        let euler = quaternion_to_euler_deg(q.quaternion());
        assert!((euler.roll - 30.0).abs() < EPS, "roll was {}", euler.roll);

        let q = UnitQuaternion::from_euler_angles(0.0, 45.0 * DEG_TO_RAD, 0.0);
        let euler = quaternion_to_euler_deg(q.quaternion());
        assert!((euler.pitch - 45.0).abs() < EPS, "pitch was {}", euler.pitch);
    }

    #[test]
    fn pitch_saturates_at_gimbal_lock() {
        let q = UnitQuaternion::from_euler_angles(0.0, 90.0 * DEG_TO_RAD, 0.0);
        let euler = quaternion_to_euler_deg(q.quaternion());
        assert!((euler.pitch - 90.0).abs() < 0.1, "pitch was {}", euler.pitch);
    }

    #[test]
    fn projection_without_fix_is_identity() {
        let tracker = OrientationTracker::new();
        let v = Vector3::new(1.5, -2.0, 9.81);
        assert_eq!(tracker.world_frame(v), v);
        assert!(!tracker.has_fix());
    }

    #[test]
    fn projection_rotates_into_world_frame() {
        let mut tracker = OrientationTracker::new();
        // Device rolled 90°: device +Y ends up along world +Z.
        let q = UnitQuaternion::from_euler_angles(90.0 * DEG_TO_RAD, 0.0, 0.0);
        tracker.update(*q.quaternion());

        let world = tracker.world_frame(Vector3::new(0.0, 1.0, 0.0));
        assert!((world - Vector3::new(0.0, 0.0, 1.0)).norm() < EPS, "got {world}");
    }
}
