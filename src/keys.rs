use std::{sync::Arc, sync::Mutex, thread, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    gestures::Facing,
    log,
    logger::ActionLog,
};

/// A key as it appears in the config: a literal character, or one of the
/// named special keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeySpec {
    Char(char),
    Space,
    Enter,
    Tab,
    Shift,
    Ctrl,
    Alt,
}

impl TryFrom<String> for KeySpec {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "space" => Ok(KeySpec::Space),
            "enter" => Ok(KeySpec::Enter),
            "tab" => Ok(KeySpec::Tab),
            "shift" => Ok(KeySpec::Shift),
            "ctrl" => Ok(KeySpec::Ctrl),
            "alt" => Ok(KeySpec::Alt),
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(KeySpec::Char(c)),
                    _ => Err(format!("Unknown key spec: {value:?}")),
                }
            }
        }
    }
}

impl From<KeySpec> for String {
    fn from(key: KeySpec) -> Self {
        match key {
            KeySpec::Char(c) => c.to_string(),
            KeySpec::Space => "space".to_string(),
            KeySpec::Enter => "enter".to_string(),
            KeySpec::Tab => "tab".to_string(),
            KeySpec::Shift => "shift".to_string(),
            KeySpec::Ctrl => "ctrl".to_string(),
            KeySpec::Alt => "alt".to_string(),
        }
    }
}

/// Maps the logical gameplay actions to injected keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionKeyMap {
    pub left: KeySpec,
    pub right: KeySpec,
    pub jump: KeySpec,
    pub attack: KeySpec,
}

impl Default for ActionKeyMap {
    fn default() -> Self {
        Self {
            left: KeySpec::Char('a'),
            right: KeySpec::Char('d'),
            jump: KeySpec::Space,
            attack: KeySpec::Char('x'),
        }
    }
}

impl ActionKeyMap {
    /// The walk-hold key for the given facing.
    pub fn walk_key(&self, facing: Facing) -> KeySpec {
        match facing {
            Facing::Left => self.left,
            Facing::Right => self.right,
        }
    }
}

/// Key-injection seam. The actual OS-level injector lives outside this crate;
/// everything in here talks to it through this trait.
pub trait InputSynth: Send + Sync {
    fn press(&self, key: KeySpec) -> Result<(), String>;

    fn release(&self, key: KeySpec) -> Result<(), String>;

    /// Discrete tap: press, hold briefly, release. Blocks the caller for the
    /// hold duration, which is how jump and attack are delivered.
    fn tap(&self, key: KeySpec, hold: Duration) -> Result<(), String> {
        self.press(key)?;
        thread::sleep(hold);
        self.release(key)
    }
}

/// Logs presses and releases instead of injecting them. Default synth until a
/// platform injector is plugged in behind [`InputSynth`].
pub struct DryRunSynth {
    logger: Arc<dyn ActionLog>,
}

impl DryRunSynth {
    pub fn new(logger: Arc<dyn ActionLog>) -> Self {
        Self { logger }
    }
}

impl InputSynth for DryRunSynth {
    fn press(&self, key: KeySpec) -> Result<(), String> {
        log!(self.logger, "⬇ press {}", String::from(key));
        Ok(())
    }

    fn release(&self, key: KeySpec) -> Result<(), String> {
        log!(self.logger, "⬆ release {}", String::from(key));
        Ok(())
    }
}

/// Records every press/release for assertions in tests.
#[derive(Default)]
pub struct RecordingSynth {
    events: Mutex<Vec<SynthEvent>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthEvent {
    Press(KeySpec),
    Release(KeySpec),
}

impl RecordingSynth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<SynthEvent> {
        std::mem::take(&mut self.events.lock().unwrap())
    }
}

impl InputSynth for RecordingSynth {
    fn press(&self, key: KeySpec) -> Result<(), String> {
        self.events.lock().unwrap().push(SynthEvent::Press(key));
        Ok(())
    }

    fn release(&self, key: KeySpec) -> Result<(), String> {
        self.events.lock().unwrap().push(SynthEvent::Release(key));
        Ok(())
    }
}
