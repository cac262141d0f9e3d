use std::time::Instant;

use nalgebra::{Quaternion, Vector3};
use serde::Deserialize;
use serde_json::Value;

/// One decoded telemetry packet, stamped with its arrival time.
#[derive(Debug, Clone, Copy)]
pub struct SensorSample {
    pub at: Instant,
    pub data: SensorData,
}

/// The closed set of sensors the phone app sends. Decoded once here; all
/// downstream dispatch matches on this exhaustively.
#[derive(Debug, Clone, Copy)]
pub enum SensorData {
    /// Device-frame linear acceleration in m/s².
    LinearAcceleration(Vector3<f32>),
    /// Orientation as a unit quaternion (x, y, z, w).
    RotationVector(Quaternion<f32>),
    /// One detected step. The packet itself is the signal.
    StepPulse,
}

#[derive(Deserialize)]
struct RawPacket {
    sensor: String,
    #[serde(default)]
    values: Option<Value>,
}

/// Decodes one UDP payload. Malformed JSON, unknown sensors, and missing
/// value fields all yield `None`; the caller drops the packet and moves on.
pub fn decode(payload: &[u8], at: Instant) -> Option<SensorSample> {
    let text = std::str::from_utf8(payload).ok()?;
    let raw: RawPacket = serde_json::from_str(text).ok()?;

    let data = match raw.sensor.as_str() {
        "linear_acceleration" => {
            let values = raw.values?;
            SensorData::LinearAcceleration(Vector3::new(
                field(&values, "x")?,
                field(&values, "y")?,
                field(&values, "z")?,
            ))
        }
        "rotation_vector" => {
            let values = raw.values?;
            SensorData::RotationVector(Quaternion::new(
                field(&values, "w")?,
                field(&values, "x")?,
                field(&values, "y")?,
                field(&values, "z")?,
            ))
        }
        "step_detector" => SensorData::StepPulse,
        _ => return None,
    };

    Some(SensorSample { at, data })
}

fn field(values: &Value, name: &str) -> Option<f32> {
    values.get(name)?.as_f64().map(|f| f as f32)
}
