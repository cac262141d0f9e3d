use std::{
    fs,
    io::{Read, Write},
    path::PathBuf,
};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::{APP_ID, keys::ActionKeyMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub keys: ActionKeyMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub listen_ip: String,
    pub listen_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_ip: "0.0.0.0".to_string(),
            listen_port: 12345,
        }
    }
}

/// Detector thresholds. Read-only during live detection; calibration builds a
/// fresh snapshot through [`ThresholdsBuilder`] and swaps it in whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Peak XY acceleration (m/s²) that counts as an attack.
    pub punch_xy_accel: f32,
    /// Peak +Z acceleration (m/s²) that counts as a jump.
    pub jump_z_accel: f32,
    /// Yaw change across the orientation history that counts as a body turn.
    pub turn_degrees: f32,
    /// Minimum interval between accepted step pulses.
    pub step_debounce_sec: f32,
    /// Silence after the last step before the walk hold is released.
    pub walk_timeout_sec: f32,
    /// Pitch/roll drift allowed while a yaw delta is trusted as a turn.
    pub stability_degrees: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            punch_xy_accel: 16.0,
            jump_z_accel: 15.0,
            turn_degrees: 90.0,
            step_debounce_sec: 0.3,
            walk_timeout_sec: 1.5,
            stability_degrees: 40.0,
        }
    }
}

impl Thresholds {
    pub fn rebuild(&self) -> ThresholdsBuilder {
        ThresholdsBuilder {
            next: self.clone(),
        }
    }
}

/// Builds the next thresholds snapshot from calibration results. Unset fields
/// keep their previous value, so an aborted gesture never commits anything.
pub struct ThresholdsBuilder {
    next: Thresholds,
}

impl ThresholdsBuilder {
    pub fn punch_xy_accel(mut self, value: f32) -> Self {
        self.next.punch_xy_accel = value;
        self
    }

    pub fn jump_z_accel(mut self, value: f32) -> Self {
        self.next.jump_z_accel = value;
        self
    }

    pub fn turn_degrees(mut self, value: f32) -> Self {
        self.next.turn_degrees = value;
        self
    }

    pub fn walking(mut self, debounce_sec: f32, timeout_sec: f32) -> Self {
        self.next.step_debounce_sec = debounce_sec;
        self.next.walk_timeout_sec = timeout_sec;
        self
    }

    pub fn build(self) -> Thresholds {
        self.next
    }
}

impl Config {
    pub fn load() -> Result<Self, String> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let mut file = fs::File::open(&path).map_err(|e| format!("Failed to open config: {e}"))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| format!("Failed to read config: {e}"))?;

        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse config: {e}"))
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path()?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {e}"))?;
        let mut file =
            fs::File::create(&path).map_err(|e| format!("Failed to create config: {e}"))?;
        file.write_all(json.as_bytes())
            .map_err(|e| format!("Failed to write config: {e}"))
    }

    fn config_path() -> Result<PathBuf, String> {
        let base = BaseDirs::new().ok_or("Could not find user data directory")?;
        let dir = base.data_dir().join(APP_ID);
        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config dir: {e}"))?;
        Ok(dir.join("config.json"))
    }
}
