//! The walking hold: one background task that keeps a key pressed until it
//! is told to stop. Stopping signals the task and joins it, so by the time
//! `stop` returns the release has gone out.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Sender, bounded};

use crate::{
    keys::{InputSynth, KeySpec},
    log,
    logger::ActionLog,
};

pub struct HoldSession {
    synth: Arc<dyn InputSynth>,
    logger: Arc<dyn ActionLog>,
    active: Option<ActiveHold>,
}

struct ActiveHold {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

impl HoldSession {
    pub fn new(synth: Arc<dyn InputSynth>, logger: Arc<dyn ActionLog>) -> Self {
        Self {
            synth,
            logger,
            active: None,
        }
    }

    /// Start holding `key`. The walking state machine guarantees at most one
    /// hold at a time; a second start while one is active is a bug, not a
    /// runtime condition.
    pub fn start(&mut self, key: KeySpec) {
        assert!(
            self.active.is_none(),
            "walk hold started while another is active"
        );

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let synth = Arc::clone(&self.synth);
        let logger = Arc::clone(&self.logger);

        let join = thread::spawn(move || {
            if let Err(e) = synth.press(key) {
                log!(logger, "❌ Walk hold press failed: {e}");
                return;
            }
            // Park until signalled; a dropped sender unblocks us too.
            let _ = stop_rx.recv();
            if let Err(e) = synth.release(key) {
                log!(logger, "❌ Walk hold release failed: {e}");
            }
        });

        self.active = Some(ActiveHold { stop_tx, join });
    }

    /// Signal the hold task and wait for its release to complete. No-op when
    /// nothing is held.
    pub fn stop(&mut self) {
        if let Some(hold) = self.active.take() {
            let _ = hold.stop_tx.send(());
            if hold.join.join().is_err() {
                log!(self.logger, "❌ Walk hold task panicked");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for HoldSession {
    fn drop(&mut self) {
        self.stop();
    }
}
