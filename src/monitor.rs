//! MonitorController: the feed polling loop for one live display
//!
//! Owns the lifecycle of one live-feed display: fixed-period polling of
//! the vitals feed, severity reconciliation, rolling chart history,
//! connection tracking, and cooldown-gated SOS overlay control. All
//! state is owned by one controller instance and dies with it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::alert::{AlertPresenter, CooldownGate, SosAlert, DEFAULT_SOS_COOLDOWN};
use crate::channel::StateChannel;
use crate::classify::{self, SeverityThresholds};
use crate::feed::{seed_snapshot, FeedError, FeedSource};
use crate::history::{ChartPoint, RollingHistory, DEFAULT_CHART_CAPACITY};
use crate::types::FeedSnapshot;

/// Default feed polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

/// Whether this display consumes live data or sits on the seed dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Poll the feed at the configured period.
    Live,
    /// Present the seed dataset; never start a timer.
    Standby,
}

/// Configuration for one controller instance. Everything that was
/// ambient in the original display (timer period, cooldown, thresholds,
/// seed rows) is passed in here explicitly.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub mode: DisplayMode,
    /// How often to poll the feed while live.
    pub poll_interval: Duration,
    /// Minimum time between successive SOS overlays.
    pub sos_cooldown: Duration,
    /// Chart window capacity in samples.
    pub chart_capacity: usize,
    /// Abnormal-metric thresholds exposed to the presentation layer.
    pub thresholds: SeverityThresholds,
    /// Dataset presented before the first successful poll.
    pub seed: FeedSnapshot,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Live,
            poll_interval: DEFAULT_POLL_INTERVAL,
            sos_cooldown: DEFAULT_SOS_COOLDOWN,
            chart_capacity: DEFAULT_CHART_CAPACITY,
            thresholds: SeverityThresholds::default(),
            seed: seed_snapshot(),
        }
    }
}

/// Snapshot of everything the presentation layer consumes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonitorState {
    pub feed: FeedSnapshot,
    pub chart: Vec<ChartPoint>,
    pub connected: bool,
    pub overlay: Option<SosAlert>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Mutable controller state. One logical writer: every mutation happens
/// under the write lock inside a single poll application or dismissal.
struct Inner {
    feed: FeedSnapshot,
    history: RollingHistory,
    presenter: AlertPresenter,
    connected: bool,
    last_updated: Option<DateTime<Utc>>,
}

impl Inner {
    fn snapshot(&self) -> MonitorState {
        MonitorState {
            feed: self.feed.clone(),
            chart: self.history.points(),
            connected: self.connected,
            overlay: self.presenter.overlay().cloned(),
            last_updated: self.last_updated,
        }
    }
}

/// Live-feed ingestion and alert-state controller.
///
/// Two states: INACTIVE (no timer) and ACTIVE (timer at the configured
/// period). `start` enters ACTIVE only in `DisplayMode::Live`; `stop`
/// cancels the timer and discards any still-in-flight fetch result.
pub struct MonitorController {
    config: MonitorConfig,
    inner: RwLock<Inner>,
    channel: StateChannel<MonitorState>,
    active: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

impl MonitorController {
    pub fn new(config: MonitorConfig) -> Arc<Self> {
        let mut seed = config.seed.clone();
        classify::reconcile(&mut seed);

        let inner = Inner {
            feed: seed,
            history: RollingHistory::new(config.chart_capacity),
            presenter: AlertPresenter::new(CooldownGate::new(config.sos_cooldown)),
            connected: false,
            last_updated: None,
        };
        let channel = StateChannel::new("monitor_state", inner.snapshot());
        let (shutdown_tx, _) = broadcast::channel(1);

        Arc::new(Self {
            config,
            inner: RwLock::new(inner),
            channel,
            active: AtomicBool::new(false),
            shutdown_tx,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn thresholds(&self) -> &SeverityThresholds {
        &self.config.thresholds
    }

    /// Whether the poll timer is running.
    pub fn is_polling(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start the poll loop. A no-op in standby mode or when already
    /// active. The first fetch is issued immediately, then one per
    /// period. A fetch still outstanding when the next tick fires does
    /// not delay it; results are applied in completion order.
    pub fn start(self: &Arc<Self>, source: Arc<dyn FeedSource>) {
        if self.config.mode != DisplayMode::Live {
            log::info!("monitor in standby mode, not polling");
            return;
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!(
            "monitor polling every {} ms",
            self.config.poll_interval.as_millis()
        );

        let controller = Arc::clone(self);
        let period = self.config.poll_interval;
        let mut shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let controller = Arc::clone(&controller);
                        let source = Arc::clone(&source);
                        tokio::spawn(async move {
                            let result = source.fetch_latest().await;
                            controller.apply_poll(result).await;
                        });
                    }
                    _ = shutdown.recv() => break,
                }
            }
        });
    }

    /// Tear down: cancel the timer and mark the controller inactive so a
    /// fetch resolving after this point is discarded.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            log::info!("monitor stopped");
        }
        let _ = self.shutdown_tx.send(());
    }

    /// Apply one poll result. Runs in the task that owns the fetch, so
    /// overlapping fetches land here in completion order.
    async fn apply_poll(&self, result: Result<FeedSnapshot, FeedError>) {
        if !self.active.load(Ordering::SeqCst) {
            // Resolved after teardown: must not touch state.
            return;
        }

        match result {
            Ok(mut feed) => {
                classify::reconcile(&mut feed);
                let now = tokio::time::Instant::now().into_std();
                let captured_at = Utc::now();

                let state = {
                    let mut inner = self.inner.write().await;
                    inner.connected = true;
                    inner
                        .history
                        .push(ChartPoint::from_vitals(captured_at, &feed.vitals));
                    if inner.presenter.observe(now, &feed) {
                        let alert = inner.presenter.overlay().cloned();
                        if let Some(alert) = alert {
                            log::warn!(
                                "SOS overlay raised for {} in {}",
                                alert.wearer,
                                alert.sector
                            );
                        }
                    }
                    inner.feed = feed;
                    inner.last_updated = Some(captured_at);
                    inner.snapshot()
                };
                self.channel.update(state);
            }
            Err(e) => {
                // Keep showing last-known-good data; only flag staleness.
                log::warn!("poll failed: {}", e);
                let state = {
                    let mut inner = self.inner.write().await;
                    inner.connected = false;
                    inner.snapshot()
                };
                self.channel.update(state);
            }
        }
    }

    /// Explicit operator acknowledgment of the SOS overlay.
    pub async fn dismiss(&self) {
        let now = tokio::time::Instant::now().into_std();
        let state = {
            let mut inner = self.inner.write().await;
            inner.presenter.dismiss(now);
            inner.snapshot()
        };
        self.channel.update(state);
    }

    /// Current state snapshot (the seed dataset before the first poll).
    pub async fn state(&self) -> MonitorState {
        self.inner.read().await.snapshot()
    }

    /// Register a callback fired on every state change.
    pub fn subscribe(&self, callback: Box<dyn Fn(&MonitorState) + Send + Sync>) -> Uuid {
        self.channel.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: Uuid) {
        self.channel.unsubscribe(id);
    }

    /// Broadcast receiver of state changes for async consumers.
    pub fn updates(&self) -> broadcast::Receiver<MonitorState> {
        self.channel.watch()
    }
}
