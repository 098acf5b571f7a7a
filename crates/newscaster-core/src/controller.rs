//! Start/stop lifecycle of the feed worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::models::ControllerState;
use crate::stats::StatsStore;
use crate::worker::{FeedWorker, Pipeline};

/// A running worker and the means to stop it.
struct Activation {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Worker tasks owned by the controller.
#[derive(Default)]
struct Lifecycle {
    active: Option<Activation>,
    /// Signalled worker that outlived the join timeout of `stop()`.
    detached: Option<JoinHandle<()>>,
}

/// Owns at most one background [`FeedWorker`].
///
/// Lifecycle misuse (starting twice, stopping while stopped) is reported
/// through the boolean return values rather than errors.
pub struct Controller {
    pipeline: Arc<Pipeline>,
    config: WorkerConfig,
    /// Mirrors `lifecycle.active.is_some()` for lock-free status reads.
    running: AtomicBool,
    lifecycle: Mutex<Lifecycle>,
}

impl Controller {
    /// Create a stopped controller.
    pub fn new(pipeline: Arc<Pipeline>, config: WorkerConfig) -> Self {
        Self {
            pipeline,
            config,
            running: AtomicBool::new(false),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Spawn the worker. Returns false if it is already running.
    ///
    /// A worker detached by an earlier `stop()` is given one more join
    /// timeout and then aborted, so two workers never run at once.
    pub async fn start(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.active.is_some() {
            debug!("Start requested while running");
            return false;
        }

        if let Some(handle) = lifecycle.detached.take() {
            self.reap(handle).await;
        }

        self.pipeline.stats().reset(Local::now());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let pipeline = Arc::clone(&self.pipeline);
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let mut worker = FeedWorker::new(pipeline, config, shutdown_rx);
            worker.run().await;
        });

        lifecycle.active = Some(Activation {
            shutdown_tx,
            handle,
        });
        self.running.store(true, Ordering::Release);

        info!("Controller started");
        true
    }

    /// Signal the worker and wait for it, up to the join timeout.
    /// Returns false if it was not running.
    pub async fn stop(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(Activation {
            shutdown_tx,
            mut handle,
        }) = lifecycle.active.take()
        else {
            debug!("Stop requested while stopped");
            return false;
        };

        self.running.store(false, Ordering::Release);
        let _ = shutdown_tx.send(true);

        match tokio::time::timeout(self.config.join_timeout, &mut handle).await {
            Ok(Ok(())) => debug!("Worker joined"),
            Ok(Err(e)) => warn!(error = %e, "Worker task ended abnormally"),
            Err(_) => {
                warn!(
                    timeout_ms = self.config.join_timeout.as_millis() as u64,
                    "Worker did not stop in time, detaching"
                );
                lifecycle.detached = Some(handle);
            }
        }

        info!("Controller stopped");
        true
    }

    /// Wait for a detached worker, aborting it after the join timeout.
    async fn reap(&self, mut handle: JoinHandle<()>) {
        if handle.is_finished() {
            return;
        }
        if tokio::time::timeout(self.config.join_timeout, &mut handle)
            .await
            .is_err()
        {
            warn!("Detached worker still running, aborting it");
            handle.abort();
            let _ = handle.await;
        }
    }

    /// Stop (if running) then start.
    pub async fn restart(&self) -> bool {
        self.stop().await;
        self.start().await
    }

    /// Current state, without waiting on a pending start or stop.
    pub fn status(&self) -> ControllerState {
        if self.running.load(Ordering::Acquire) {
            ControllerState::Running
        } else {
            ControllerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn stats(&self) -> &StatsStore {
        self.pipeline.stats()
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // Signal the worker if still running
        let lifecycle = self.lifecycle.get_mut();
        if let Some(activation) = lifecycle.active.take() {
            let _ = activation.shutdown_tx.send(true);
        }
        if let Some(handle) = lifecycle.detached.take() {
            handle.abort();
        }
    }
}
