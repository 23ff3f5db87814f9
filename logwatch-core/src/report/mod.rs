mod document;
mod overwatch;
mod scheduler;
mod sentry;

pub use document::{AGENT_LABEL, build_report, report_host};
pub use overwatch::{OverwatchClient, OverwatchError};
pub use scheduler::report_to_overwatch;
pub use sentry::{SentryClient, SentryError, report_server_errors};
