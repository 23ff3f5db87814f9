use crate::parser::AccessLogRecord;
use crate::stats::window::{RollingCounter, TopCounter};
use crate::stats::{Aggregator, STATS_WINDOW};
use crate::stats::status::TRACKED_STATUS_CODES;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Keys kept per status in the all-time counter before compaction.
pub const PATH_RETENTION: usize = 10_000;

/// Paths reported per status code.
pub const TOP_PATHS: usize = 5;

static HEX32_LOWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{32}$").expect("hard-coded pattern")
});
static HEX32_UPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-F]{32}$").expect("hard-coded pattern")
});
static UUID_LOWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("hard-coded pattern")
});
static UUID_UPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12}$")
        .expect("hard-coded pattern")
});
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("hard-coded pattern"));

/// Collapses identifier segments so request paths stay low-cardinality
/// while the route shape survives. The query string is dropped first,
/// then every `/`-delimited segment is checked on its own, which makes
/// the rewrite idempotent even for adjacent identifier segments.
pub fn unify_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or("");
    path.split('/')
        .map(unify_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn unify_segment(segment: &str) -> &str {
    if HEX32_LOWER.is_match(segment) || UUID_LOWER.is_match(segment) {
        "<uuid>"
    } else if HEX32_UPPER.is_match(segment) || UUID_UPPER.is_match(segment) {
        "<UUID>"
    } else if DECIMAL.is_match(segment) {
        "<n>"
    } else {
        segment
    }
}

/// Counts normalized request paths per status code, all-time (compacted
/// above [`PATH_RETENTION`] keys) and over the trailing window.
pub struct PathAggregator {
    total: HashMap<u16, TopCounter<String>>,
    rolling: RollingCounter<(u16, String)>,
    retain: usize,
}

impl PathAggregator {
    pub fn new() -> Self {
        Self::with_retention(PATH_RETENTION)
    }

    pub fn with_retention(retain: usize) -> Self {
        let mut total = HashMap::new();
        for &status in TRACKED_STATUS_CODES {
            total.insert(status, TopCounter::new(retain));
        }

        Self {
            total,
            rolling: RollingCounter::new(STATS_WINDOW),
            retain,
        }
    }

    /// Normalized path, prefixed with the virtual host when the record
    /// carries one so multi-tenant paths stay distinguishable.
    fn counting_key(record: &AccessLogRecord) -> String {
        let path = unify_path(&record.path);
        match &record.host {
            Some(host) => format!("{host}{path}"),
            None => path,
        }
    }

    /// The `path_status_count` fragment of the report document.
    pub fn report(&mut self, now: Instant) -> Value {
        self.rolling.evict(now);

        let mut total = Map::new();
        for (status, counter) in self
            .total
            .iter()
            .collect::<BTreeMap<_, _>>()
        {
            let mut paths = Map::new();
            for (path, count) in counter.most_common(TOP_PATHS) {
                paths.insert(path.clone(), json!(count));
            }
            total.insert(status.to_string(), Value::Object(paths));
        }

        // Group window counts by status, keeping tracked statuses present
        // even when their window is empty.
        let mut by_status: BTreeMap<u16, Vec<(&String, u64)>> = TRACKED_STATUS_CODES
            .iter()
            .map(|&status| (status, Vec::new()))
            .collect();
        for ((status, path), &count) in self.rolling.counts() {
            by_status.entry(*status).or_default().push((path, count));
        }

        let mut last_5_min = Map::new();
        for (status, mut paths) in by_status {
            paths.sort_by(|(pa, ca), (pb, cb)| cb.cmp(ca).then_with(|| pa.cmp(pb)));
            paths.truncate(TOP_PATHS);
            let mut fragment = Map::new();
            for (path, count) in paths {
                fragment.insert(path.clone(), json!(count));
            }
            last_5_min.insert(status.to_string(), Value::Object(fragment));
        }

        json!({
            "total": total,
            "last_5_min": last_5_min,
        })
    }
}

impl Default for PathAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator for PathAggregator {
    fn update(&mut self, record: &AccessLogRecord, now: Instant) {
        let key = Self::counting_key(record);
        self.total
            .entry(record.status)
            .or_insert_with(|| TopCounter::new(self.retain))
            .record(key.clone());
        self.rolling.record((record.status, key), now);
    }
}
