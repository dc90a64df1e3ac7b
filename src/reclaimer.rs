//! Background lease reclamation for workq.
//!
//! This module provides the [`Reclaimer`], the periodic task that returns
//! abandoned leases to their queues.
//!
//! ## What
//!
//! - [`Reclaimer`] wraps a [`WorkQueue`] clone and sweeps every queue on a
//!   fixed cadence, recycling messages whose lease has outlived the unack
//!   window.
//!
//! ## How
//!
//! Construct one over an engine, call [`start`], and call [`close`] during
//! shutdown to quiesce deterministically. Nothing is spawned until `start`
//! is called, so embedders and tests control exactly when sweeping begins.
//! A sweep that fails is logged and retried on the next tick; the task never
//! dies on a fault.
//!
//! [`start`]: Reclaimer::start
//! [`close`]: Reclaimer::close
//!
//! ### Example
//!
//! ```no_run
//! use workq::config::Config;
//! use workq::queue::WorkQueue;
//! use workq::reclaimer::Reclaimer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = WorkQueue::connect(&Config::default()).await?;
//!     let mut reclaimer = Reclaimer::new(queue.clone());
//!     reclaimer.start();
//!     // ... serve traffic ...
//!     reclaimer.close().await;
//!     Ok(())
//! }
//! ```

use crate::queue::WorkQueue;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Periodic unack sweep over every queue.
#[derive(Debug)]
pub struct Reclaimer {
    engine: WorkQueue,
    interval: Duration,
    task: Option<(watch::Sender<bool>, JoinHandle<()>)>,
}

impl Reclaimer {
    /// Build a reclaimer sweeping at the engine's configured cadence.
    pub fn new(engine: WorkQueue) -> Self {
        let interval = Duration::from_secs(engine.options().sweep_interval_seconds);
        Self::with_interval(engine, interval)
    }

    /// Build a reclaimer with an explicit sweep interval.
    pub fn with_interval(engine: WorkQueue, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            task: None,
        }
    }

    /// Spawn the sweep task. The first sweep runs one full interval after
    /// this call. Calling `start` on a running reclaimer is a no-op.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let engine = self.engine.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match engine.process_all_unacks().await {
                            Ok(reclaimed) if reclaimed > 0 => {
                                tracing::debug!("unack sweep recycled {reclaimed} messages");
                            }
                            Ok(_) => {}
                            Err(err) => {
                                tracing::error!("unack sweep failed: {err}");
                            }
                        }
                    }
                    // Closed channel means the handle was dropped; stop either way.
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        self.task = Some((shutdown_tx, handle));
        tracing::debug!("reclaimer started with interval {:?}", self.interval);
    }

    /// Whether the sweep task is currently running.
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Stop the sweep task and wait for it to exit. Idempotent; safe to
    /// call without a prior `start`.
    pub async fn close(&mut self) {
        if let Some((shutdown_tx, handle)) = self.task.take() {
            shutdown_tx.send(true).ok();
            handle.await.ok();
            tracing::debug!("reclaimer stopped");
        }
    }
}
