//! End-to-end harness: raw lines through the format registry, the
//! fan-out channel and both aggregators into a report document.

use logwatch_core::parser::{AccessLogRecord, LineFormatRegistry};
use logwatch_core::pubsub::PubSub;
use logwatch_core::report::build_report;
use logwatch_core::stats::{Aggregator, PathAggregator, StatusAggregator};

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, mpsc};

const LINES: &[&str] = &[
    r#"84.22.97.60 - - [04/Feb/2020:11:02:10 +0000] "GET / HTTP/1.1" 200 396 "-" "Mozilla/5.0 zgrab/0.x""#,
    r#"84.22.97.60 - - [04/Feb/2020:11:02:11 +0000] "GET /campaigns/1234 HTTP/1.1" 200 512 "-" "Mozilla/5.0 zgrab/0.x""#,
    r#"84.22.97.60 - - [04/Feb/2020:11:02:12 +0000] "GET /campaigns/5678 HTTP/1.1" 200 512 "-" "Mozilla/5.0 zgrab/0.x""#,
    r#"84.22.97.60 - - [04/Feb/2020:11:02:13 +0000] "GET /broken HTTP/1.1" 502 166 "-" "Mozilla/5.0 zgrab/0.x""#,
];

#[test]
fn zgrab_line_parses_end_to_end() {
    let registry = LineFormatRegistry::builtin().unwrap();
    let record = registry.parse(LINES[0]).unwrap();

    assert_eq!(record.method, "GET");
    assert_eq!(record.path, "/");
    assert_eq!(record.status, 200);
    assert_eq!(record.body_bytes_sent, 396);
    assert_eq!(record.referer, None);
    assert_eq!(record.time_utc, Utc.with_ymd_and_hms(2020, 2, 4, 11, 2, 10).unwrap());
}

async fn consume<A: Aggregator + 'static>(
    mut records: mpsc::Receiver<Arc<AccessLogRecord>>,
    aggregator: Arc<Mutex<A>>,
    now: Instant,
) {
    while let Some(record) = records.recv().await {
        aggregator.lock().await.update(&record, now);
    }
}

#[tokio::test]
async fn lines_flow_into_a_report_document() {
    let registry = LineFormatRegistry::builtin().unwrap();
    let mut records: PubSub<Arc<AccessLogRecord>> = PubSub::new(16);

    let status = Arc::new(Mutex::new(StatusAggregator::new()));
    let paths = Arc::new(Mutex::new(PathAggregator::new()));
    let server_errors = status.lock().await.subscribe_server_errors();

    let t0 = Instant::now();
    let status_task = tokio::spawn(consume(records.subscribe(), status.clone(), t0));
    let paths_task = tokio::spawn(consume(records.subscribe(), paths.clone(), t0));

    for line in LINES {
        let record = registry.parse(line).unwrap();
        records.publish(Arc::new(record)).await;
    }

    // Closing the channel ends the consumer loops, like a supervisor
    // shutdown would.
    drop(records);
    status_task.await.unwrap();
    paths_task.await.unwrap();

    // The 502 tripped the server-error flag.
    assert!(*server_errors.borrow());

    let now = t0 + Duration::from_secs(1);
    let status_count = status.lock().await.report(now);
    let path_status_count = paths.lock().await.report(now);

    assert_eq!(status_count["total"]["200"], json!(3));
    assert_eq!(status_count["total"]["502"], json!(1));
    assert_eq!(
        status_count["last_5_min"]["502"],
        json!({"__value": 1, "__check": {"state": "red"}}),
    );

    assert_eq!(
        path_status_count["total"]["200"],
        json!({"/": 1, "/campaigns/<n>": 2}),
    );
    assert_eq!(path_status_count["total"]["502"], json!({"/broken": 1}));

    let report = build_report(
        status_count,
        path_status_count,
        "edge-1.example.com",
        Duration::from_secs(30),
        Utc.with_ymd_and_hms(2020, 2, 4, 11, 2, 14).unwrap(),
    );

    assert_eq!(report["label"], json!({"agent": "log-monitor", "host": "edge-1.example.com"}));
    assert_eq!(report["state"]["status_count"]["total"]["200"], json!(3));
    assert_eq!(
        report["state"]["path_status_count"]["last_5_min"]["200"],
        json!({"/": 1, "/campaigns/<n>": 2}),
    );
    assert!(report["state"]["watchdog"]["__watchdog"]["deadline"].is_i64());
}

#[tokio::test]
async fn late_subscribers_miss_earlier_records() {
    let registry = LineFormatRegistry::builtin().unwrap();
    let mut records: PubSub<Arc<AccessLogRecord>> = PubSub::new(16);

    let mut early = records.subscribe();
    records
        .publish(Arc::new(registry.parse(LINES[0]).unwrap()))
        .await;

    let mut late = records.subscribe();
    records
        .publish(Arc::new(registry.parse(LINES[3]).unwrap()))
        .await;

    assert_eq!(early.recv().await.unwrap().status, 200);
    assert_eq!(early.recv().await.unwrap().status, 502);

    assert_eq!(late.recv().await.unwrap().status, 502);
    drop(records);
    assert!(late.recv().await.is_none());
}
