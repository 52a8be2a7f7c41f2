//! End-to-end controller scenarios driven by a scripted feed source
//! under a paused tokio clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use kavalan::classify;
use kavalan::feed::{FeedError, FeedSource};
use kavalan::monitor::{DisplayMode, MonitorConfig, MonitorController, MonitorState};
use kavalan::types::{FeedSnapshot, GeoPoint, RiskZone, Severity, VitalSnapshot};

fn make_vital(id: &str, name: &str, sector: &str, status: Severity) -> VitalSnapshot {
    VitalSnapshot {
        user_id: id.to_string(),
        profile: String::new(),
        name: name.to_string(),
        sector: sector.to_string(),
        risk_zone: RiskZone::High,
        heart_rate: 120.0,
        gsr_fear_sweat_index: 3.6,
        kinetic_struggle_g_force: 2.4,
        status,
        threat_level: None,
        ai_assessment: String::new(),
        location: GeoPoint { lat: 0.0, lng: 0.0 },
        timestamp: Utc::now(),
    }
}

fn feed_of(vitals: Vec<VitalSnapshot>) -> FeedSnapshot {
    let mut feed = FeedSnapshot {
        feed_status: "LIVE".to_string(),
        total_active: 0,
        critical_count: 0,
        alert_count: 0,
        status: Severity::Safe,
        vitals,
    };
    classify::reconcile(&mut feed);
    feed
}

/// Feed source that replays a fixed script, one entry per fetch,
/// repeating the last entry once exhausted. `None` entries fail the poll.
struct ScriptedFeed {
    responses: Vec<Option<FeedSnapshot>>,
    cursor: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedFeed {
    fn new(responses: Vec<Option<FeedSnapshot>>) -> Arc<Self> {
        assert!(!responses.is_empty());
        Arc::new(Self {
            responses,
            cursor: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for ScriptedFeed {
    async fn fetch_latest(&self) -> Result<FeedSnapshot, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let i = self
            .cursor
            .fetch_add(1, Ordering::SeqCst)
            .min(self.responses.len() - 1);
        match &self.responses[i] {
            Some(feed) => Ok(feed.clone()),
            None => Err(FeedError::Transport("connection refused".to_string())),
        }
    }
}

/// Feed source whose response is held until the test releases it,
/// simulating a fetch still in flight at teardown.
struct SlowFeed {
    release: Notify,
    feed: FeedSnapshot,
}

#[async_trait]
impl FeedSource for SlowFeed {
    async fn fetch_latest(&self) -> Result<FeedSnapshot, FeedError> {
        self.release.notified().await;
        Ok(self.feed.clone())
    }
}

fn live_config(poll: Duration, cooldown: Duration) -> MonitorConfig {
    MonitorConfig {
        mode: DisplayMode::Live,
        poll_interval: poll,
        sos_cooldown: cooldown,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_seed_presented_before_first_poll() {
    let controller = MonitorController::new(MonitorConfig::default());
    let state = controller.state().await;

    assert!(!state.connected);
    assert!(state.chart.is_empty());
    assert!(state.overlay.is_none());
    assert_eq!(state.feed.vitals.len(), 4);
    assert_eq!(state.feed.status, Severity::Safe);
}

// Three polls escalating SAFE, SAFE, ALERT: overlay never shown, three
// points buffered.
#[tokio::test(start_paused = true)]
async fn test_escalation_without_critical_never_raises_overlay() {
    let source = ScriptedFeed::new(vec![
        Some(feed_of(vec![make_vital("1", "Meena S.", "Tambaram", Severity::Safe)])),
        Some(feed_of(vec![make_vital("1", "Meena S.", "Tambaram", Severity::Safe)])),
        Some(feed_of(vec![make_vital("1", "Meena S.", "Tambaram", Severity::Alert)])),
    ]);

    let controller = MonitorController::new(live_config(
        Duration::from_millis(2_000),
        Duration::from_millis(60_000),
    ));

    let seen: Arc<Mutex<Vec<MonitorState>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    controller.subscribe(Box::new(move |state| {
        seen_clone.lock().unwrap().push(state.clone());
    }));

    controller.start(source.clone());
    tokio::time::sleep(Duration::from_millis(5_000)).await;
    controller.stop();

    let state = controller.state().await;
    assert_eq!(source.calls(), 3);
    assert_eq!(state.chart.len(), 3);
    assert_eq!(state.feed.status, Severity::Alert);
    assert!(state.connected);
    assert!(state.overlay.is_none());
    assert!(
        seen.lock().unwrap().iter().all(|s| s.overlay.is_none()),
        "overlay must never have been shown"
    );
}

// Condensed cooldown window: the first critical fires, later criticals are
// suppressed inside the window, dismissal restarts the window, and the
// overlay fires again once the window elapses.
#[tokio::test(start_paused = true)]
async fn test_sos_fire_suppress_dismiss_refire() {
    let critical_a = feed_of(vec![make_vital("1", "Meena S.", "Tambaram", Severity::CriticalSos)]);
    let critical_b = feed_of(vec![make_vital("2", "Selvi K.", "Ambattur", Severity::CriticalSos)]);

    let source = ScriptedFeed::new(vec![Some(critical_a), Some(critical_b)]);
    let controller = MonitorController::new(live_config(
        Duration::from_millis(2_000),
        Duration::from_millis(7_000),
    ));

    controller.start(source.clone());

    // Polls at t=0 (wearer A), t=2s, t=4s (wearer B).
    tokio::time::sleep(Duration::from_millis(5_000)).await;
    let state = controller.state().await;
    let overlay = state.overlay.expect("first critical poll raises the overlay");
    assert_eq!(
        overlay.wearer, "Meena S.",
        "criticals inside the window must not re-trigger"
    );

    // Operator acknowledges at t=5s.
    controller.dismiss().await;
    assert!(controller.state().await.overlay.is_none());

    // Polls at t=6s, 8s, 10s land inside the restarted window.
    tokio::time::sleep(Duration::from_millis(6_000)).await;
    assert!(
        controller.state().await.overlay.is_none(),
        "dismissal suppresses re-trigger for a full window"
    );

    // Poll at t=14s is more than 7s past the dismissal: fires again.
    tokio::time::sleep(Duration::from_millis(4_000)).await;
    let overlay = controller
        .state()
        .await
        .overlay
        .expect("overlay fires again after the window");
    assert_eq!(overlay.wearer, "Selvi K.");

    controller.stop();
}

// A fetch in flight at teardown resolves afterwards and must
// not mutate any state.
#[tokio::test(start_paused = true)]
async fn test_in_flight_fetch_ignored_after_teardown() {
    let source = Arc::new(SlowFeed {
        release: Notify::new(),
        feed: feed_of(vec![make_vital("1", "Meena S.", "Tambaram", Severity::CriticalSos)]),
    });

    let controller = MonitorController::new(live_config(
        Duration::from_millis(2_000),
        Duration::from_millis(60_000),
    ));
    controller.start(source.clone());

    // The t=0 fetch is now parked inside the source.
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    controller.stop();
    let before = controller.state().await;

    source.release.notify_waiters();
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    let after = controller.state().await;
    assert_eq!(after, before, "no state mutation after teardown");
    assert!(after.chart.is_empty());
    assert!(after.overlay.is_none());
    assert!(!after.connected);
}

#[tokio::test(start_paused = true)]
async fn test_failed_poll_only_flips_connection_flag() {
    let source = ScriptedFeed::new(vec![
        Some(feed_of(vec![make_vital("1", "Meena S.", "Tambaram", Severity::Safe)])),
        None,
    ]);

    let controller = MonitorController::new(live_config(
        Duration::from_millis(2_000),
        Duration::from_millis(60_000),
    ));
    controller.start(source.clone());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    let healthy = controller.state().await;
    assert!(healthy.connected);
    assert_eq!(healthy.chart.len(), 1);

    // Poll at t=2s fails.
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    let degraded = controller.state().await;
    controller.stop();

    assert!(!degraded.connected);
    assert_eq!(degraded.feed, healthy.feed);
    assert_eq!(degraded.chart, healthy.chart);
    assert_eq!(degraded.overlay, healthy.overlay);
    assert_eq!(degraded.last_updated, healthy.last_updated);
}

#[tokio::test(start_paused = true)]
async fn test_zero_wearer_poll_still_appends_point() {
    let source = ScriptedFeed::new(vec![Some(feed_of(Vec::new()))]);

    let controller = MonitorController::new(live_config(
        Duration::from_millis(2_000),
        Duration::from_millis(60_000),
    ));
    controller.start(source.clone());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    let state = controller.state().await;
    controller.stop();

    assert!(state.connected);
    assert_eq!(state.feed.status, Severity::Safe);
    assert_eq!(state.chart.len(), 1, "time axis must not develop gaps");
    assert!(state.chart[0].heart_rate.is_empty());
    assert!(state.chart[0].fear_index.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_standby_mode_never_polls() {
    let source = ScriptedFeed::new(vec![Some(feed_of(vec![make_vital(
        "1",
        "Meena S.",
        "Tambaram",
        Severity::CriticalSos,
    )]))]);

    let config = MonitorConfig {
        mode: DisplayMode::Standby,
        poll_interval: Duration::from_millis(2_000),
        ..Default::default()
    };
    let controller = MonitorController::new(config);
    controller.start(source.clone());

    tokio::time::sleep(Duration::from_millis(10_000)).await;

    assert!(!controller.is_polling());
    assert_eq!(source.calls(), 0, "standby must never start a timer");
    let state = controller.state().await;
    assert!(!state.connected);
    assert!(state.chart.is_empty());
    assert_eq!(state.feed.feed_status, "STANDBY");
}

#[tokio::test(start_paused = true)]
async fn test_rolling_window_caps_at_capacity_under_polling() {
    let source = ScriptedFeed::new(vec![Some(feed_of(vec![make_vital(
        "1",
        "Meena S.",
        "Tambaram",
        Severity::Safe,
    )]))]);

    let mut config = live_config(Duration::from_millis(2_000), Duration::from_millis(60_000));
    config.chart_capacity = 5;
    let controller = MonitorController::new(config);
    controller.start(source.clone());

    // 12 polls at t=0..22s against a capacity of 5.
    tokio::time::sleep(Duration::from_millis(23_000)).await;
    let state = controller.state().await;
    controller.stop();

    assert_eq!(source.calls(), 12);
    assert_eq!(state.chart.len(), 5);
    // Window contents are the most recent points in insertion order.
    for pair in state.chart.windows(2) {
        assert!(pair[0].time <= pair[1].time);
    }
}
