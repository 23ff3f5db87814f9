use crate::conf::Config;
use crate::parser::{AccessLogRecord, LineFormatRegistry};
use crate::pubsub::PubSub;
use crate::report::{
    OverwatchClient, SentryClient, report_host, report_server_errors, report_to_overwatch,
};
use crate::stats::{Aggregator, PathAggregator, StatusAggregator};
use crate::tailer::tail_files;

use anyhow::{Context, anyhow};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;

/// Capacity of each fan-out subscription queue.
const SUBSCRIPTION_CAPACITY: usize = 1000;

/// Wires up and runs the agent: the tailer, one consumer loop per
/// aggregator, the report scheduler and the error reporter, all in one
/// `JoinSet`.
///
/// The first task to terminate, successfully or not, takes the whole
/// process down: a dead tailer must not leave the agent reporting frozen
/// statistics. A shutdown signal cancels everything and exits cleanly.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let registry = Arc::new(LineFormatRegistry::builtin()?);
    let mut records: PubSub<Arc<AccessLogRecord>> = PubSub::new(SUBSCRIPTION_CAPACITY);

    let status = Arc::new(Mutex::new(StatusAggregator::new()));
    let paths = Arc::new(Mutex::new(PathAggregator::new()));
    let server_errors = status.lock().await.subscribe_server_errors();

    let mut tasks: JoinSet<anyhow::Result<()>> = JoinSet::new();

    tasks.spawn(consume_records("status", records.subscribe(), status.clone()));
    tasks.spawn(consume_records("path", records.subscribe(), paths.clone()));

    if config.sentry.enabled {
        if let Some(dsn) = &config.sentry.dsn {
            let client = SentryClient::from_dsn(dsn)?;
            tasks.spawn(report_server_errors(client, records.subscribe()));
            tracing::debug!("sentry integration enabled");
        }
    }

    if config.overwatch.enabled {
        if let (Some(url), Some(token)) = (
            &config.overwatch.report_url,
            &config.overwatch.report_token,
        ) {
            let client = OverwatchClient::new(url, token);
            let host = report_host(config.host.as_deref());
            let interval = Duration::from_secs(config.overwatch.report_interval_s);
            tasks.spawn(report_to_overwatch(
                client,
                status.clone(),
                paths.clone(),
                server_errors,
                host,
                interval,
            ));
            tracing::debug!("overwatch integration enabled");
        }
    }

    tasks.spawn(tail_files(config.access_log_globs(), registry, records));

    let outcome = tokio::select! {
        joined = tasks.join_next() => match joined {
            Some(Ok(Ok(()))) => Err(anyhow!("worker task finished unexpectedly")),
            Some(Ok(Err(e))) => Err(e.context("worker task failed")),
            Some(Err(e)) => Err(anyhow::Error::new(e).context("worker task aborted")),
            None => Err(anyhow!("no worker tasks were started")),
        },
        signal = tokio::signal::ctrl_c() => {
            signal
                .context("failed to listen for shutdown signal")
                .map(|_| tracing::info!("shutdown signal received; stopping"))
        }
    };

    shutdown(tasks).await;
    outcome
}

/// Cancels every remaining task and waits for it to wind down, logging
/// anything that went wrong on the way out instead of propagating it.
async fn shutdown(mut tasks: JoinSet<anyhow::Result<()>>) {
    tasks.abort_all();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "task failed during shutdown"),
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::warn!(error = %e, "task panicked during shutdown"),
        }
    }
}

/// Feeds one aggregator from its own subscription. Ends when the
/// subscription closes, which the supervisor treats as a reason to stop.
async fn consume_records<A>(
    name: &'static str,
    mut records: mpsc::Receiver<Arc<AccessLogRecord>>,
    aggregator: Arc<Mutex<A>>,
) -> anyhow::Result<()>
where
    A: Aggregator + 'static,
{
    while let Some(record) = records.recv().await {
        aggregator.lock().await.update(&record, Instant::now());
    }
    tracing::debug!(consumer = name, "record subscription closed");
    Ok(())
}
