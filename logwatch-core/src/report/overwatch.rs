use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use std::time::Duration;
use thiserror::Error;

const REPORT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum OverwatchError {
    #[error("failed to post report to {url}: {source}")]
    Send {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("report POST to {url} returned {status}")]
    Status { url: String, status: StatusCode },
}

/// Pushes report documents to the Overwatch endpoint.
pub struct OverwatchClient {
    http: reqwest::Client,
    report_url: String,
    report_token: String,
}

impl OverwatchClient {
    pub fn new(report_url: impl Into<String>, report_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            report_url: report_url.into(),
            report_token: report_token.into(),
        }
    }

    pub async fn send_report(&self, report: &serde_json::Value) -> Result<(), OverwatchError> {
        let response = self
            .http
            .post(&self.report_url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("token {}", self.report_token))
            .timeout(REPORT_TIMEOUT)
            .json(report)
            .send()
            .await
            .map_err(|e| OverwatchError::Send {
                url: self.report_url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(OverwatchError::Status {
                url: self.report_url.clone(),
                status: response.status(),
            });
        }

        tracing::debug!(url = %self.report_url, "overwatch report delivered");
        Ok(())
    }
}
