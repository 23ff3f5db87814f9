mod path;
mod status;
#[cfg(test)]
mod tests;
mod window;

use crate::parser::AccessLogRecord;
use std::time::{Duration, Instant};

/// Trailing window over which "recent" counts are reported.
pub const STATS_WINDOW: Duration = Duration::from_secs(300);

/// A statistics consumer fed from its own fan-out subscription.
pub trait Aggregator: Send {
    fn update(&mut self, record: &AccessLogRecord, now: Instant);
}

pub use path::{PATH_RETENTION, PathAggregator, TOP_PATHS, unify_path};
pub use status::{SERVER_ERROR_STATUS_CODES, StatusAggregator, TRACKED_STATUS_CODES};
pub use window::{RollingCounter, TopCounter};
