use crate::report::document::build_report;
use crate::report::overwatch::OverwatchClient;
use crate::stats::{PathAggregator, StatusAggregator};

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, watch};
use tokio::time::sleep;

/// Snapshots both aggregators into a report document on every tick and
/// pushes it to the monitoring endpoint. Sink failures are logged; the
/// next tick retries with fresh data.
pub async fn report_to_overwatch(
    client: OverwatchClient,
    status: Arc<Mutex<StatusAggregator>>,
    paths: Arc<Mutex<PathAggregator>>,
    mut server_errors: watch::Receiver<bool>,
    host: String,
    interval: Duration,
) -> anyhow::Result<()> {
    loop {
        wait_for_tick(&mut server_errors, interval).await;

        let now = Instant::now();
        let status_count = status.lock().await.report(now);
        let path_status_count = paths.lock().await.report(now);
        let report = build_report(status_count, path_status_count, &host, interval, Utc::now());

        if let Err(e) = client.send_report(&report).await {
            tracing::warn!(error = %e, "failed to push overwatch report");
        }
    }
}

/// Waits out one report interval. While no server error is inside the
/// window, the first one to arrive ends the wait early so bad news goes
/// out ahead of the steady cadence; once errors are present the fixed
/// interval applies, so an ongoing outage does not flood the sink.
async fn wait_for_tick(server_errors: &mut watch::Receiver<bool>, interval: Duration) {
    if *server_errors.borrow_and_update() {
        sleep(interval).await;
        return;
    }

    // Whether the flag source was torn down; handled after the select so the
    // non-Send watch::Ref guard is never held across an await.
    let mut flag_lost = false;
    tokio::select! {
        _ = sleep(interval) => {}
        result = server_errors.wait_for(|active| *active) => {
            if result.is_ok() {
                tracing::info!("server error observed; reporting early");
            } else {
                flag_lost = true;
            }
        }
    }
    if flag_lost {
        // Flag source is gone; the supervisor is tearing down.
        sleep(interval).await;
    }
}
