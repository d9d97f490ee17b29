//! Polling scheduler that drives reconciliation cycles.
//!
//! One background task runs a cycle, sleeps `poll_interval`, and repeats.
//! A stop request is observed between cycles: the loop runs one final
//! cycle (persistence included) and exits, so a cycle is never cut short.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use guildlink_core::ReconciliationService;
//! use guildlink_infra::observability::metrics::LinkingMetrics;
//! use guildlink_infra::scheduling::{LinkScheduler, LinkSchedulerConfig, SchedulerResult};
//!
//! # async fn example(service: Arc<ReconciliationService>) -> SchedulerResult<()> {
//! let metrics = Arc::new(LinkingMetrics::new());
//! let mut scheduler = LinkScheduler::new(service, LinkSchedulerConfig::default(), metrics);
//!
//! scheduler.start()?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use guildlink_core::ReconciliationService;
use guildlink_domain::constants::DEFAULT_POLL_INTERVAL_SECS;
use guildlink_domain::LinkingConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::log_metric;
use crate::observability::metrics::LinkingMetrics;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the link scheduler.
#[derive(Debug, Clone)]
pub struct LinkSchedulerConfig {
    /// Sleep between cycles.
    pub poll_interval: Duration,
    /// How long `stop` waits for the final cycle to finish.
    pub join_timeout: Duration,
}

impl Default for LinkSchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            join_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&LinkingConfig> for LinkSchedulerConfig {
    fn from(config: &LinkingConfig) -> Self {
        Self { poll_interval: config.poll_interval(), ..Self::default() }
    }
}

/// Link scheduler with explicit lifecycle management.
pub struct LinkScheduler {
    service: Arc<ReconciliationService>,
    config: LinkSchedulerConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    metrics: Arc<LinkingMetrics>,
}

impl LinkScheduler {
    pub fn new(
        service: Arc<ReconciliationService>,
        config: LinkSchedulerConfig,
        metrics: Arc<LinkingMetrics>,
    ) -> Self {
        Self {
            service,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
            metrics,
        }
    }

    /// Spawn the polling task. The first cycle runs immediately.
    ///
    /// # Errors
    /// [`SchedulerError::AlreadyRunning`] if a task is already active.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let service = Arc::clone(&self.service);
        let metrics = Arc::clone(&self.metrics);
        let poll_interval = self.config.poll_interval;
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::poll_loop(service, poll_interval, cancel, metrics).await;
        });

        self.task_handle = Some(handle);
        info!(poll_interval_ms = poll_interval.as_millis(), "link_scheduler.started");
        Ok(())
    }

    /// Request a stop and wait for the final cycle to complete.
    ///
    /// # Errors
    /// - [`SchedulerError::NotRunning`] if nothing was started
    /// - [`SchedulerError::Timeout`] if the final cycle outlives `join_timeout`
    /// - [`SchedulerError::TaskJoinFailed`] if the task panicked
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(handle) = self.task_handle.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let join_timeout = self.config.join_timeout;
        tokio::time::timeout(join_timeout, handle)
            .await
            .map_err(|_| SchedulerError::Timeout { duration: join_timeout })??;

        info!("link_scheduler.stopped");
        Ok(())
    }

    /// Returns true while the polling task is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    async fn poll_loop(
        service: Arc<ReconciliationService>,
        poll_interval: Duration,
        cancel: CancellationToken,
        metrics: Arc<LinkingMetrics>,
    ) {
        loop {
            Self::run_cycle(&service, &metrics).await;

            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("link_scheduler.final_cycle");
                    Self::run_cycle(&service, &metrics).await;
                    break;
                }
                () = tokio::time::sleep(poll_interval) => {}
            }
        }
    }

    async fn run_cycle(service: &ReconciliationService, metrics: &LinkingMetrics) {
        let report = service.run_cycle().await;
        log_metric(metrics.record_cycle(&report), "linking.cycle");
    }
}

impl Drop for LinkScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("LinkScheduler dropped while running; cancelling task");
            self.cancellation.cancel();
        }
    }
}
