//! Press-and-hold repeats
//!
//! Digital keys held past a delay re-queue their action on a timer thread,
//! separate from the input polling path. The thread shares the dispatcher's
//! key state under a mutex and shuts down with its owner.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, tick, Sender};
use crossbeam::select;
use log::debug;
use parking_lot::Mutex;

use super::keymap::{Action, ActionSink};
use crate::handler::InputKind;

/// Timer granularity; repeats are due-checked at this cadence
const TICK_INTERVAL: Duration = Duration::from_millis(25);

/// State of one currently-held action key
pub(crate) struct HeldKey {
    pub action: Action,
    pub kind: InputKind,
    pub magnitude: f32,
    pub pressed_at: Instant,
    pub last_repeat: Option<Instant>,
}

pub(crate) type SharedKeyStates = Arc<Mutex<HashMap<u32, HeldKey>>>;
pub(crate) type SharedSink = Arc<Mutex<dyn ActionSink>>;

/// Timer thread that re-queues held digital keys
pub struct HoldRepeater {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl HoldRepeater {
    pub(crate) fn spawn(
        states: SharedKeyStates,
        sink: SharedSink,
        hold_delay: Duration,
        repeat_interval: Duration,
    ) -> io::Result<Self> {
        let (shutdown, shutdown_rx) = bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name("padmap-hold-repeat".to_string())
            .spawn(move || {
                let ticker = tick(TICK_INTERVAL);
                loop {
                    select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            let now = Instant::now();
                            let due = collect_due(&states, now, hold_delay, repeat_interval);
                            if !due.is_empty() {
                                let mut sink = sink.lock();
                                for action in due {
                                    sink.queue_action(action);
                                }
                            }
                        }
                    }
                }
                debug!("hold-repeat thread stopped");
            })?;

        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }
}

impl Drop for HoldRepeater {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn collect_due(
    states: &SharedKeyStates,
    now: Instant,
    hold_delay: Duration,
    repeat_interval: Duration,
) -> Vec<Action> {
    let mut due = Vec::new();
    let mut states = states.lock();
    for key in states.values_mut() {
        if key.kind != InputKind::Digital {
            continue;
        }
        if now.duration_since(key.pressed_at) < hold_delay {
            continue;
        }
        let ready = match key.last_repeat {
            Some(last) => now.duration_since(last) >= repeat_interval,
            None => true,
        };
        if ready {
            key.last_repeat = Some(now);
            due.push(key.action.clone());
        }
    }
    due
}
