use crate::parser::AccessLogRecord;
use crate::stats::window::RollingCounter;
use crate::stats::{Aggregator, STATS_WINDOW};

use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tokio::sync::watch;

/// Status codes that always appear in reports, with a zero count when
/// nothing was observed.
pub const TRACKED_STATUS_CODES: &[u16] = &[200, 301, 304, 308, 400, 404, 500, 502, 503, 504];

/// Subset of tracked codes that trips the server-error flag and carries a
/// red/green check in the report.
pub const SERVER_ERROR_STATUS_CODES: &[u16] = &[500, 502, 503, 504];

/// Counts HTTP status codes, all-time and over the trailing window.
///
/// Owns a watch flag that is true whenever any server-error status has a
/// non-zero window count; the report scheduler uses it to wake early on
/// the first error of a quiet period.
pub struct StatusAggregator {
    total: HashMap<u16, u64>,
    rolling: RollingCounter<u16>,
    server_errors: watch::Sender<bool>,
}

impl StatusAggregator {
    pub fn new() -> Self {
        let mut total = HashMap::new();
        let mut rolling = RollingCounter::new(STATS_WINDOW);
        for &status in TRACKED_STATUS_CODES {
            total.insert(status, 0);
            rolling.seed(status);
        }
        let (server_errors, _) = watch::channel(false);

        Self {
            total,
            rolling,
            server_errors,
        }
    }

    pub fn subscribe_server_errors(&self) -> watch::Receiver<bool> {
        self.server_errors.subscribe()
    }

    fn refresh_server_error_flag(&self) {
        let active = SERVER_ERROR_STATUS_CODES
            .iter()
            .any(|status| self.rolling.get(status) > 0);
        self.server_errors.send_if_modified(|current| {
            let changed = *current != active;
            *current = active;
            changed
        });
    }

    /// The `status_count` fragment of the report document.
    pub fn report(&mut self, now: Instant) -> Value {
        self.rolling.evict(now);
        self.refresh_server_error_flag();

        let mut total = Map::new();
        for (status, count) in sorted(&self.total) {
            total.insert(status.to_string(), json!(count));
        }

        let mut last_5_min = Map::new();
        for (status, count) in sorted(self.rolling.counts()) {
            let value = if SERVER_ERROR_STATUS_CODES.contains(&status) {
                json!({
                    "__value": count,
                    "__check": {
                        "state": if count == 0 { "green" } else { "red" },
                    },
                })
            } else {
                json!(count)
            };
            last_5_min.insert(status.to_string(), value);
        }

        json!({
            "total": total,
            "last_5_min": last_5_min,
        })
    }
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator for StatusAggregator {
    fn update(&mut self, record: &AccessLogRecord, now: Instant) {
        *self.total.entry(record.status).or_insert(0) += 1;
        self.rolling.record(record.status, now);
        self.refresh_server_error_flag();
    }
}

fn sorted(counts: &HashMap<u16, u64>) -> impl Iterator<Item = (u16, u64)> {
    counts
        .iter()
        .map(|(&status, &count)| (status, count))
        .collect::<BTreeMap<_, _>>()
        .into_iter()
}
