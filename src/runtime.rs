//! The live controller runtime: pumps decoded samples through the engine and
//! applies the resulting action events at the key-injection seam. The loop
//! runs until the shared stop flag is raised, then tears down, so no key
//! outlives it.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{
    config::Thresholds,
    engine::{ActionEvent, Engine},
    hold::HoldSession,
    keys::{ActionKeyMap, InputSynth},
    log,
    logger::ActionLog,
    net::SampleSource,
    wire::SensorSample,
};

/// How long jump/attack taps stay pressed.
const TAP_HOLD: Duration = Duration::from_millis(100);

pub struct Controller {
    engine: Engine,
    hold: HoldSession,
    keys: ActionKeyMap,
    synth: Arc<dyn InputSynth>,
    logger: Arc<dyn ActionLog>,
    events: Vec<ActionEvent>,
}

impl Controller {
    pub fn new(
        thresholds: Thresholds,
        keys: ActionKeyMap,
        synth: Arc<dyn InputSynth>,
        logger: Arc<dyn ActionLog>,
    ) -> Self {
        Self {
            engine: Engine::new(thresholds),
            hold: HoldSession::new(synth.clone(), logger.clone()),
            keys,
            synth,
            logger,
            events: Vec::new(),
        }
    }

    /// The ingestion loop. Every received packet goes through the engine;
    /// quiet windows still tick it so the walking timeout keeps firing
    /// without traffic. The stop flag is checked once per iteration — the
    /// source's read timeout bounds how long an interrupt waits — and
    /// teardown runs before this returns.
    pub fn run(&mut self, source: &mut dyn SampleSource, stop: &AtomicBool) {
        while !stop.load(Ordering::SeqCst) {
            let sample = source.recv();
            self.dispatch(sample);
        }
        self.shutdown();
    }

    /// Teardown: release an active walk hold and join its task. Runs at the
    /// end of [`run`](Self::run); calling it again is a no-op.
    pub fn shutdown(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        self.engine.shutdown(&mut events);
        for event in events.drain(..) {
            self.apply(event);
        }
        self.events = events;
        self.hold.stop();
    }

    fn dispatch(&mut self, sample: Option<SensorSample>) {
        let mut events = std::mem::take(&mut self.events);
        match sample {
            Some(sample) => self.engine.handle(&sample, &mut events),
            None => self.engine.tick(Instant::now(), &mut events),
        }
        for event in events.drain(..) {
            self.apply(event);
        }
        self.events = events;
    }

    fn apply(&mut self, event: ActionEvent) {
        match event {
            ActionEvent::Jump => {
                log!(self.logger, "🦗 JUMP");
                if let Err(e) = self.synth.tap(self.keys.jump, TAP_HOLD) {
                    log!(self.logger, "❌ Jump tap failed: {e}");
                }
            }
            ActionEvent::Attack => {
                log!(self.logger, "⚔ ATTACK");
                if let Err(e) = self.synth.tap(self.keys.attack, TAP_HOLD) {
                    log!(self.logger, "❌ Attack tap failed: {e}");
                }
            }
            ActionEvent::FacingChanged(facing) => {
                log!(self.logger, "🔄 Turn — now facing {facing:?}");
                // Hold direction follows facing, so an active walk swaps keys.
                if self.hold.is_active() {
                    self.hold.stop();
                    self.hold.start(self.keys.walk_key(facing));
                }
            }
            ActionEvent::WalkStarted(facing) => {
                log!(self.logger, "🚶 Walk started ({facing:?})");
                self.hold.start(self.keys.walk_key(facing));
            }
            ActionEvent::WalkStopped => {
                log!(self.logger, "🛑 Walk stopped");
                self.hold.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        keys::{KeySpec, RecordingSynth, SynthEvent},
        orientation::DEG_TO_RAD,
        wire::SensorData,
    };
    use nalgebra::UnitQuaternion;
    use std::collections::VecDeque;

    struct NullLog;

    impl ActionLog for NullLog {
        fn log(&self, _message: &str) {}
    }

    /// Yields scripted samples, then raises the stop flag on the first empty
    /// read, the way an interrupt would mid-stream.
    struct InterruptedSource {
        samples: VecDeque<SensorSample>,
        stop: Arc<AtomicBool>,
    }

    impl SampleSource for InterruptedSource {
        fn recv(&mut self) -> Option<SensorSample> {
            match self.samples.pop_front() {
                Some(sample) => Some(sample),
                None => {
                    self.stop.store(true, Ordering::SeqCst);
                    None
                }
            }
        }
    }

    fn step(at: Instant) -> SensorSample {
        SensorSample {
            at,
            data: SensorData::StepPulse,
        }
    }

    fn rotation(at: Instant, yaw_deg: f32) -> SensorSample {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, yaw_deg * DEG_TO_RAD);
        SensorSample {
            at,
            data: SensorData::RotationVector(*q.quaternion()),
        }
    }

    fn controller(synth: Arc<RecordingSynth>) -> Controller {
        Controller::new(
            Thresholds::default(),
            ActionKeyMap::default(),
            synth,
            Arc::new(NullLog),
        )
    }

    #[test]
    fn interrupt_mid_walk_releases_the_held_key() {
        let synth = Arc::new(RecordingSynth::new());
        let mut controller = controller(synth.clone());
        let stop = Arc::new(AtomicBool::new(false));

        // One step starts the hold; the interrupt lands well inside the
        // walk timeout, so only teardown can release the key.
        let mut source = InterruptedSource {
            samples: vec![step(Instant::now())].into(),
            stop: stop.clone(),
        };
        controller.run(&mut source, &stop);

        assert_eq!(
            synth.take(),
            vec![
                SynthEvent::Press(KeySpec::Char('d')),
                SynthEvent::Release(KeySpec::Char('d')),
            ]
        );
    }

    #[test]
    fn interrupt_while_idle_touches_no_keys() {
        let synth = Arc::new(RecordingSynth::new());
        let mut controller = controller(synth.clone());
        let stop = Arc::new(AtomicBool::new(false));

        let mut source = InterruptedSource {
            samples: VecDeque::new(),
            stop: stop.clone(),
        };
        controller.run(&mut source, &stop);

        assert!(synth.take().is_empty());
    }

    #[test]
    fn turn_mid_walk_swaps_the_held_key() {
        let synth = Arc::new(RecordingSynth::new());
        let mut controller = controller(synth.clone());
        let stop = Arc::new(AtomicBool::new(false));
        let base = Instant::now();

        // Walk starts on 'd' (facing Right), then a full yaw ramp flips the
        // facing while the hold is active.
        let mut samples = vec![step(base)];
        for i in 0..25 {
            let yaw = i as f32 * (190.0 / 24.0);
            samples.push(rotation(base + Duration::from_millis(20 * (i + 1) as u64), yaw));
        }
        let mut source = InterruptedSource {
            samples: samples.into(),
            stop: stop.clone(),
        };
        controller.run(&mut source, &stop);

        assert_eq!(
            synth.take(),
            vec![
                SynthEvent::Press(KeySpec::Char('d')),
                SynthEvent::Release(KeySpec::Char('d')),
                SynthEvent::Press(KeySpec::Char('a')),
                SynthEvent::Release(KeySpec::Char('a')),
            ]
        );
    }
}
