use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};
use std::time::Duration;

/// Agent name in the report label.
pub const AGENT_LABEL: &str = "log-monitor";

/// Slack added on top of the report interval before the external monitor
/// may consider this agent dead: one missed tick is not an outage.
const WATCHDOG_GRACE: Duration = Duration::from_secs(60);

/// Assembles the document pushed to the monitoring endpoint on each tick.
pub fn build_report(
    status_count: Value,
    path_status_count: Value,
    host: &str,
    report_interval: Duration,
    now: DateTime<Utc>,
) -> Value {
    let deadline_ms =
        now.timestamp_millis() + (report_interval + WATCHDOG_GRACE).as_millis() as i64;

    json!({
        "date": now.to_rfc3339_opts(SecondsFormat::Micros, true),
        "label": {
            "agent": AGENT_LABEL,
            "host": host,
        },
        "state": {
            "pid": std::process::id(),
            "watchdog": {
                "__watchdog": {
                    "deadline": deadline_ms,
                },
            },
            "status_count": status_count,
            "path_status_count": path_status_count,
        },
    })
}

/// Host for the report label: the configured override, or this machine's
/// hostname.
pub fn report_host(override_host: Option<&str>) -> String {
    if let Some(host) = override_host {
        return host.to_string();
    }
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}
