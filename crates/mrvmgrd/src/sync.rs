//! Periodic full-resync worker.
//!
//! A background task replays the entire desired state through every
//! switch reconciler on a fixed interval. A pass with no transport
//! failure stops the timer; any failure leaves it armed so the next
//! tick retries from scratch. Lifecycle events re-arm it through
//! [`SyncWorker::rearm`].
//!
//! State machine: Idle -> Armed -> Running -> Armed (failure) or
//! Stopped (clean pass, until re-armed).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::repository::Repository;
use crate::switch_mgr::SwitchMgr;

/// Timer-driven corrective loop over all switch reconcilers.
pub struct SyncWorker {
    repo: Arc<Repository>,
    switches: Vec<Arc<Mutex<SwitchMgr>>>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl SyncWorker {
    /// Creates a worker over shared reconcilers. Not yet armed.
    pub fn new(
        repo: Arc<Repository>,
        switches: Vec<Arc<Mutex<SwitchMgr>>>,
        interval: Duration,
    ) -> Self {
        Self {
            repo,
            switches,
            interval,
            task: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Returns true while the timer task is armed or running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Arms the timer. The first pass runs immediately, then on every
    /// tick until one completes clean. Idempotent while running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let cancel = CancellationToken::new();
        self.cancel = cancel.clone();

        let repo = Arc::clone(&self.repo);
        let switches = self.switches.clone();
        let interval = self.interval;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Sync worker cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if run_pass(&repo, &switches).await {
                            info!("Sync completed");
                            break;
                        }
                        warn!("Sync failed; retrying on next tick");
                    }
                }
            }
        }));
        info!("Sync worker armed (interval {:?})", self.interval);
    }

    /// Cancels the timer and waits for the task to wind down.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Stop-then-start: forces a fresh cycle immediately.
    pub async fn reset(&mut self) {
        self.stop().await;
        self.start();
    }

    /// Arms the timer only if it is not already running.
    ///
    /// Called on entity events so a converged (stopped) worker picks
    /// up drift introduced by failed incremental pushes.
    pub fn rearm(&mut self) {
        if !self.is_running() {
            self.start();
        }
    }

    /// Runs one pass outside the timer (for assertions on a single
    /// deterministic pass).
    #[cfg(test)]
    pub async fn run_pass_now(&self) -> bool {
        run_pass(&self.repo, &self.switches).await
    }
}

/// One full pass: fetch desired state, reconcile every switch.
///
/// A failing switch does not short-circuit the others; each switch is
/// reconciled independently and the results are aggregated.
async fn run_pass(repo: &Repository, switches: &[Arc<Mutex<SwitchMgr>>]) -> bool {
    info!("Sync started");
    let nets = repo.networks();
    let ports = repo.ports();

    let mut clean = true;
    for switch in switches {
        let mut mgr = switch.lock().await;
        if !mgr.reconcile(&nets, &ports).await {
            warn!("Sync failed for switch {}", mgr.scope().switch_id);
            clean = false;
        }
    }
    clean
}
