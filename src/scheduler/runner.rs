//! Real-time simulation runner.
//!
//! The runner moves a [`Simulator`] into a single tokio task that waits on
//! one interval per enabled timer. Tick bodies run one at a time on that
//! task, so no two ticks ever interleave. After every tick a fresh
//! [`PipelineView`] is published on a watch channel.
//!
//! # Features
//!
//! - Graceful shutdown with broadcast channel
//! - Final simulator state handed back on shutdown
//! - Dropping the runner stops the task

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::RunnerError;
use crate::metrics::MetricsCollector;
use crate::pipeline::{PipelineView, Simulator};

use super::timer::TimerKind;

/// Handle to a simulator ticking on wall-clock time.
pub struct SimulationRunner {
    shutdown_tx: broadcast::Sender<()>,
    view_rx: watch::Receiver<PipelineView>,
    handle: Option<JoinHandle<Simulator>>,
}

impl SimulationRunner {
    /// Spawns the tick task. Must be called within a tokio runtime.
    ///
    /// Each timer first fires one period after start. The simulator clock
    /// continues from its current reading.
    pub fn start(mut simulator: Simulator) -> Self {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let (view_tx, view_rx) = watch::channel(simulator.view());
        let periods = simulator.config().periods;

        let handle = tokio::spawn(async move {
            let metrics = MetricsCollector::new();
            metrics.runner_started();

            let origin = simulator.now();
            let start = Instant::now();
            let mut timers: Vec<(TimerKind, Interval)> = TimerKind::enabled(&periods)
                .into_iter()
                .map(|(kind, period)| {
                    let mut interval = interval_at(start + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    (kind, interval)
                })
                .collect();

            info!(timers = timers.len(), "Simulation runner started");

            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit signal and when the handle is dropped.
                    _ = shutdown_rx.recv() => {
                        debug!("Simulation runner received shutdown signal");
                        break;
                    }
                    timer = next_tick(&mut timers) => {
                        simulator.advance_clock(origin + start.elapsed());
                        simulator.fire(timer);
                        view_tx.send_replace(simulator.view());
                    }
                }
            }

            metrics.runner_stopped();
            info!(
                spawned = simulator.lifetime().spawned,
                verified = simulator.lifetime().verified,
                flagged = simulator.lifetime().flagged,
                "Simulation runner stopped"
            );
            simulator
        });

        Self {
            shutdown_tx,
            view_rx,
            handle: Some(handle),
        }
    }

    /// Returns a receiver that observes every published view.
    pub fn subscribe(&self) -> watch::Receiver<PipelineView> {
        self.view_rx.clone()
    }

    /// Returns the most recently published view.
    pub fn latest(&self) -> PipelineView {
        self.view_rx.borrow().clone()
    }

    /// Returns whether the tick task is still owned by this handle.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the tick task and returns the final simulator.
    ///
    /// No tick runs after this returns.
    ///
    /// # Errors
    ///
    /// - `RunnerError::NotRunning` if the runner was already shut down.
    /// - `RunnerError::TaskPanicked` if the tick task panicked.
    pub async fn shutdown(&mut self) -> Result<Simulator, RunnerError> {
        let Some(handle) = self.handle.take() else {
            return Err(RunnerError::NotRunning);
        };

        info!("Initiating simulation runner shutdown");

        // Ignore send error - the task may have already stopped
        let _ = self.shutdown_tx.send(());

        handle
            .await
            .map_err(|e| RunnerError::TaskPanicked(e.to_string()))
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Waits for the first due timer, in tie-break order.
async fn next_tick(timers: &mut [(TimerKind, Interval)]) -> TimerKind {
    std::future::poll_fn(|cx| {
        for (kind, interval) in timers.iter_mut() {
            if interval.poll_tick(cx).is_ready() {
                return std::task::Poll::Ready(*kind);
            }
        }
        std::task::Poll::Pending
    })
    .await
}
