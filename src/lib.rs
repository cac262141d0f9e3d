//! Silkmotion — phone motion telemetry in, gameplay key input out.
//!
//! A phone app streams sensor packets over UDP (linear acceleration,
//! rotation vector, step pulses). This crate interprets them as gameplay
//! gestures: jump and attack from acceleration impulses, discrete turns from
//! the orientation history, and a continuous walk driven by step rhythm.
//! Detected actions are delivered as key presses through the [`keys::InputSynth`]
//! seam.
//!
//! The `silkmotion` binary is the live controller; the `calibrate` binary is
//! the interactive wizard that personalizes the detection thresholds.

pub mod calibration;
pub mod config;
pub mod engine;
pub mod gestures;
pub mod hold;
pub mod keys;
pub mod logger;
pub mod net;
pub mod orientation;
pub mod runtime;
pub mod walking;
pub mod wire;

pub use config::{Config, Thresholds};
pub use engine::{ActionEvent, Engine};
pub use gestures::Facing;

/// Per-user data directory name (config + logs).
pub const APP_ID: &str = "silkmotion";
