// src/bin/kavalan_monitor.rs
//! Terminal monitor for the Kavalan Sentinel vitals feed: polls the feed
//! service and prints grid status, raising an SOS banner when a wearer
//! goes critical. Ctrl+C dismisses any visible overlay, a second Ctrl+C
//! stops the monitor.

use std::sync::Arc;

use anyhow::Result;

use kavalan::feed::HttpFeedSource;
use kavalan::monitor::{MonitorConfig, MonitorController, MonitorState};

fn print_state(state: &MonitorState) {
    let link = if state.connected { "LIVE" } else { "STALE" };
    println!(
        "[{}] {} | sentinels: {} | alert: {} | critical: {}",
        link,
        state.feed.status.as_str(),
        state.feed.total_active,
        state.feed.alert_count,
        state.feed.critical_count,
    );

    if let Some(alert) = &state.overlay {
        println!("==============================================");
        println!("  CRITICAL SOS / HIGH-STRESS BIO-SIGNATURE DETECTED");
        println!("  SENTINEL: {}", alert.wearer);
        println!("  LOCATION: {}", alert.sector);
        println!("  (Ctrl+C to acknowledge)");
        println!("==============================================");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    println!("Polling Kavalan feed at {}", base_url);

    let controller = MonitorController::new(MonitorConfig::default());
    let source = Arc::new(HttpFeedSource::new(&base_url));

    controller.subscribe(Box::new(print_state));
    controller.start(source);

    // First Ctrl+C acknowledges a visible overlay, second one exits.
    tokio::signal::ctrl_c().await?;
    if controller.state().await.overlay.is_some() {
        println!("Acknowledging SOS overlay");
        controller.dismiss().await;
        tokio::signal::ctrl_c().await?;
    }

    controller.stop();
    println!("Monitor stopped");
    Ok(())
}
