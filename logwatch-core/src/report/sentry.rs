use crate::parser::AccessLogRecord;

use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

#[derive(Debug, Error)]
pub enum SentryError {
    #[error("invalid sentry DSN {dsn:?}")]
    InvalidDsn { dsn: String },

    #[error("failed to post event to {url}: {source}")]
    Send {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("event POST to {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Minimal client for the Sentry store endpoint.
///
/// A DSN `https://KEY@host/PROJECT` maps to the store URL
/// `https://host/api/PROJECT/store/` with the key carried in the
/// `X-Sentry-Auth` header.
pub struct SentryClient {
    http: reqwest::Client,
    store_url: String,
    public_key: String,
}

impl SentryClient {
    pub fn from_dsn(dsn: &str) -> Result<Self, SentryError> {
        let invalid = || SentryError::InvalidDsn {
            dsn: dsn.to_string(),
        };

        let parsed = Url::parse(dsn).map_err(|_| invalid())?;
        let public_key = parsed.username();
        let host = parsed.host_str().ok_or_else(invalid)?;
        let project = parsed.path().trim_matches('/');
        if public_key.is_empty() || project.is_empty() || project.contains('/') {
            return Err(invalid());
        }

        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let store_url = format!("{}://{}/api/{}/store/", parsed.scheme(), authority, project);

        Ok(Self {
            http: reqwest::Client::new(),
            store_url,
            public_key: public_key.to_string(),
        })
    }

    pub async fn report(&self, record: &AccessLogRecord) -> Result<(), SentryError> {
        let event = json!({
            "message": format!("{} {} -> {}", record.method, record.path, record.status),
            "level": "error",
            "logger": "logwatch",
            "platform": "other",
            "timestamp": record.time_utc.to_rfc3339(),
            "extra": {
                "status": record.status,
                "path": record.path,
                "method": record.method,
                "host": record.host,
                "remote_addr": record.remote_addr,
                "user_agent": record.user_agent,
            },
        });

        let auth = format!(
            "Sentry sentry_version=7, sentry_client=logwatch/0.3, sentry_key={}",
            self.public_key,
        );

        let response = self
            .http
            .post(&self.store_url)
            .header("X-Sentry-Auth", auth)
            .json(&event)
            .send()
            .await
            .map_err(|e| SentryError::Send {
                url: self.store_url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(SentryError::Status {
                url: self.store_url.clone(),
                status: response.status(),
            });
        }
        Ok(())
    }
}

/// Forwards every server-error record from its own subscription to the
/// error-reporting endpoint. Push failures are logged; the loop only ends
/// when the subscription closes.
pub async fn report_server_errors(
    client: SentryClient,
    mut records: mpsc::Receiver<Arc<AccessLogRecord>>,
) -> anyhow::Result<()> {
    while let Some(record) = records.recv().await {
        if record.status < 500 {
            continue;
        }
        if let Err(e) = client.report(&record).await {
            tracing::warn!(error = %e, "failed to report server error");
        }
    }
    tracing::debug!("error report subscription closed");
    Ok(())
}
