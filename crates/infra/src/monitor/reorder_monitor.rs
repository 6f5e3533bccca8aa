use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use forgepos_analytics::ReorderAnalysis;
use forgepos_core::Clock;

use crate::config::AnalyticsConfig;
use crate::service::AnalyticsService;
use crate::source::AnalyticsSource;

/// Destination of reorder analyses produced in the background.
pub trait ReorderAlertSink: Send + Sync + 'static {
    fn emit(&self, analysis: ReorderAnalysis);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryReorderAlertSink {
    inner: Mutex<Vec<ReorderAnalysis>>,
}

impl InMemoryReorderAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ReorderAnalysis> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn latest(&self) -> Option<ReorderAnalysis> {
        self.inner.lock().ok().and_then(|v| v.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReorderAlertSink for InMemoryReorderAlertSink {
    fn emit(&self, analysis: ReorderAnalysis) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.push(analysis);
        }
    }
}

/// Config for the periodic reorder analysis.
#[derive(Debug, Clone)]
pub struct ReorderMonitor {
    pub interval: Duration,
    /// Publish analyses that raised no alerts.
    pub emit_empty: bool,
}

impl Default for ReorderMonitor {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            emit_empty: false,
        }
    }
}

/// Handle for a running monitor (trigger + shutdown).
#[derive(Debug)]
pub struct ReorderMonitorHandle {
    trigger: mpsc::Sender<()>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ReorderMonitorHandle {
    /// Request an analysis now, e.g. after a batch of stock movements.
    ///
    /// Triggers are coalesced: while one is pending, further calls are no-ops.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the monitor and wait for the current run to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                warn!(error = %e, "reorder monitor task ended abnormally");
            }
        }
    }
}

impl ReorderMonitor {
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self {
            interval: config.monitor_interval(),
            ..Self::default()
        }
    }

    pub fn with_emit_empty(mut self, emit_empty: bool) -> Self {
        self.emit_empty = emit_empty;
        self
    }

    /// Spawn the monitor on the current tokio runtime.
    ///
    /// - Schedule: runs immediately, then every `interval`
    /// - Event-trigger: `handle.trigger()`
    /// - Failures: logged; the next tick runs again
    pub fn spawn<S, C, K>(
        &self,
        name: &'static str,
        service: Arc<AnalyticsService<S, C>>,
        sink: Arc<K>,
    ) -> ReorderMonitorHandle
    where
        S: AnalyticsSource + 'static,
        C: Clock + 'static,
        K: ReorderAlertSink,
    {
        let (trigger_tx, trigger_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let cfg = self.clone();
        let join = tokio::spawn(monitor_loop(name, cfg, shutdown_rx, trigger_rx, service, sink));

        ReorderMonitorHandle {
            trigger: trigger_tx,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }
}

async fn monitor_loop<S, C, K>(
    name: &'static str,
    cfg: ReorderMonitor,
    mut shutdown_rx: oneshot::Receiver<()>,
    mut trigger_rx: mpsc::Receiver<()>,
    service: Arc<AnalyticsService<S, C>>,
    sink: Arc<K>,
) where
    S: AnalyticsSource + 'static,
    C: Clock + 'static,
    K: ReorderAlertSink,
{
    info!(monitor = name, interval_secs = cfg.interval.as_secs(), "reorder monitor started");

    let mut ticker = time::interval(cfg.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {}
            Some(()) = trigger_rx.recv() => debug!(monitor = name, "reorder analysis triggered"),
        }

        match service.analyze_reorder_needs().await {
            Ok(analysis) if analysis.alerts.is_empty() && !cfg.emit_empty => {
                debug!(monitor = name, "no variants need reordering");
            }
            Ok(analysis) => {
                info!(
                    monitor = name,
                    critical = analysis.summary.critical,
                    total = analysis.summary.total,
                    "reorder analysis published"
                );
                sink.emit(analysis);
            }
            Err(e) => {
                warn!(monitor = name, error = %e, "reorder analysis failed; waiting for next tick");
            }
        }
    }

    info!(monitor = name, "reorder monitor stopped");
}
