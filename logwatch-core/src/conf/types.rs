use serde::{Deserialize, Serialize};

/// Tailed when no `access_logs` entry is configured.
pub const DEFAULT_ACCESS_LOG: &str = "/var/log/nginx/access.log";

const DEFAULT_REPORT_INTERVAL_S: u64 = 30;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Ordered glob patterns for the access logs to tail.
    #[serde(default)]
    pub access_logs: Vec<String>,

    #[serde(default)]
    pub overwatch: OverwatchConfig,

    #[serde(default)]
    pub sentry: SentryConfig,

    /// Report label host override; defaults to the machine hostname.
    #[serde(default)]
    pub host: Option<String>,
}

impl Config {
    pub fn access_log_globs(&self) -> Vec<String> {
        if self.access_logs.is_empty() {
            vec![DEFAULT_ACCESS_LOG.to_string()]
        } else {
            self.access_logs.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverwatchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub report_url: Option<String>,

    #[serde(default)]
    pub report_token: Option<String>,

    #[serde(default = "default_report_interval")]
    pub report_interval_s: u64,
}

impl OverwatchConfig {
    /// Reporting runs only when enabled and fully configured.
    pub fn is_active(&self) -> bool {
        self.enabled && self.report_url.is_some() && self.report_token.is_some()
    }
}

impl Default for OverwatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            report_url: None,
            report_token: None,
            report_interval_s: DEFAULT_REPORT_INTERVAL_S,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SentryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub dsn: Option<String>,
}

impl SentryConfig {
    pub fn is_active(&self) -> bool {
        self.enabled && self.dsn.is_some()
    }
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dsn: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_report_interval() -> u64 {
    DEFAULT_REPORT_INTERVAL_S
}
