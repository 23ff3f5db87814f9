mod reader;

pub use reader::FileReader;

use crate::conf::expand_globs;
use crate::parser::{AccessLogRecord, LineFormatRegistry};
use crate::pubsub::PubSub;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cadence at which all watched files are polled for new lines.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Tails every path matched by the configured globs and publishes each
/// parsed record to the fan-out channel.
///
/// Globs are re-expanded on every poll so files created after startup are
/// picked up; a path that cannot be opened is retried on the next cycle.
/// Lines that match no known grammar are dropped and logged.
pub async fn tail_files(
    globs: Vec<String>,
    registry: Arc<LineFormatRegistry>,
    mut records: PubSub<Arc<AccessLogRecord>>,
) -> anyhow::Result<()> {
    let mut readers: HashMap<PathBuf, FileReader> = HashMap::new();
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match expand_globs(&globs) {
            Ok(paths) => {
                for path in paths {
                    readers
                        .entry(path.clone())
                        .or_insert_with(|| FileReader::new(path));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "access log glob expansion failed");
            }
        }

        for reader in readers.values_mut() {
            let now = Instant::now();
            for raw in reader.read_lines(now) {
                let line = String::from_utf8_lossy(&raw);
                match registry.parse(&line) {
                    Ok(record) => records.publish(Arc::new(record)).await,
                    Err(e) => {
                        tracing::debug!(
                            path = %reader.path().display(),
                            error = %e,
                            "dropping unparseable log line",
                        );
                    }
                }
            }
        }
    }
}
