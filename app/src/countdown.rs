//! Background countdown for a locked capsule
//!
//! Recomputes the view once per second and publishes it on a watch channel.
//! The ticker only updates `remaining`; a capsule is reported unlocked only
//! after a fresh fetch.

use std::sync::Arc;
use std::time::Duration;

use capsule_core::Clock;
use time_capsule::CapsuleView;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub struct Countdown {
    rx: watch::Receiver<CapsuleView>,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Start ticking `view`. Returns `None` unless the view is locked.
    pub fn start(view: CapsuleView, clock: Arc<dyn Clock>) -> Option<Self> {
        if !view.is_locked() {
            return None;
        }

        let (tx, rx) = watch::channel(view.tick(clock.now()));

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let next = view.tick(clock.now());
                let done = next.remaining().map_or(true, |r| r <= 0);
                if tx.send(next).is_err() || done {
                    break;
                }
            }

            tracing::debug!("Countdown stopped");
        });

        Some(Self { rx, handle })
    }

    /// Latest published view
    pub fn current(&self) -> CapsuleView {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CapsuleView> {
        self.rx.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
