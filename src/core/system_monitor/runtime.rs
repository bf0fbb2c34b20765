//! Background sampling loop.
//!
//! The sampler owns a small Tokio runtime that ticks once per interval,
//! asks its [`MetricsSource`] for a reading and publishes it on a watch
//! channel. A failed reading is published as all zeros and sampling goes on.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval, MissedTickBehavior};

use super::collector::MetricsSource;
use super::metrics::MetricsSnapshot;

/// Shared publishing end; receivers keep the last value after the sampler stops
pub type SnapshotSender = Arc<watch::Sender<MetricsSnapshot>>;

pub fn snapshot_channel() -> (SnapshotSender, watch::Receiver<MetricsSnapshot>) {
    let (tx, rx) = watch::channel(MetricsSnapshot::default());
    (Arc::new(tx), rx)
}

/// Running metrics sampler. Dropping it without [`MetricsSampler::stop`] also stops it.
pub struct MetricsSampler {
    shutdown_tx: broadcast::Sender<()>,
    runtime: Option<tokio::runtime::Runtime>,
}

impl MetricsSampler {
    /// Spawn the sampling task on a dedicated runtime thread.
    pub fn start(
        source: Box<dyn MetricsSource>,
        period: Duration,
        snapshot_tx: SnapshotSender,
    ) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .thread_name("metrics-sampler")
            .build()?;

        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

        runtime.spawn(sampling_task(source, period, snapshot_tx, shutdown_rx));

        log::debug!("Metrics sampler started ({:?} period)", period);

        Ok(Self {
            shutdown_tx,
            runtime: Some(runtime),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(runtime) = self.runtime.take() {
            // A sample in progress may be blocked on a child command; do not wait for it
            runtime.shutdown_background();
            log::debug!("Metrics sampler stopped");
        }
    }
}

impl Drop for MetricsSampler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn sampling_task(
    mut source: Box<dyn MetricsSource>,
    period: Duration,
    snapshot_tx: SnapshotSender,
    mut shutdown: broadcast::Receiver<()>,
) {
    let warmup = source.warmup();
    if !warmup.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(warmup) => {}
            _ = shutdown.recv() => return,
        }
    }

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = match source.sample() {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        log::warn!("Error collecting metrics: {}", e);
                        MetricsSnapshot::zeroed()
                    }
                };

                // send() only fails when every receiver is gone
                if snapshot_tx.send(snapshot).is_err() {
                    break;
                }
            }
            _ = shutdown.recv() => {
                break;
            }
        }
    }
}
