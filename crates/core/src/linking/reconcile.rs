//! One reconciliation cycle: promote, expire or keep each pending session.
//!
//! The cycle snapshots the registry into batches. Within a batch every fetch
//! runs concurrently and is bounded by `fetch_timeout`; results are then
//! applied one at a time. After the last batch the linked store is persisted
//! whether or not anything changed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use guildlink_common::{states_match, Clock};
use guildlink_domain::constants::{DEFAULT_BATCH_SIZE, DEFAULT_FETCH_TIMEOUT_SECS};
use guildlink_domain::{Credential, CredentialRow, GuildLinkError, LinkingConfig, PendingSession};
use tracing::{debug, info, instrument, warn};

use super::linked_store::LinkedStore;
use super::ports::CredentialStore;
use super::session_registry::SessionRegistry;

/// Outcome for one pending session at one instant.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The external flow completed for this session's state.
    Promote(Credential),
    /// The session's expiry has passed without a matching credential.
    Expire,
    /// Not ready yet; look again next cycle.
    Pending,
}

/// Decide what to do with `session` given the row observed for its guild.
///
/// Promotion is checked first and requires `now < expires_at`, expiry
/// requires `now >= expires_at`, so at most one of them ever applies.
pub fn decide(
    session: &PendingSession,
    row: Option<&CredentialRow>,
    now: DateTime<Utc>,
) -> Decision {
    if !session.is_expired_at(now) {
        if let Some(CredentialRow { credential: Some(credential), state: Some(state), .. }) = row {
            if states_match(state, &session.expected_state) {
                return Decision::Promote(credential.clone());
            }
        }
        return Decision::Pending;
    }
    Decision::Expire
}

/// Tunables for [`ReconciliationService`].
#[derive(Debug, Clone)]
pub struct ReconciliationConfig {
    /// Sessions whose fetches run concurrently.
    pub batch_size: usize,
    /// Bound on each credential-store fetch.
    pub fetch_timeout: Duration,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl From<&LinkingConfig> for ReconciliationConfig {
    fn from(config: &LinkingConfig) -> Self {
        Self { batch_size: config.batch_size, fetch_timeout: config.fetch_timeout() }
    }
}

/// Summary of one cycle, fed to metrics and logs.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Registry size when the cycle began.
    pub pending_before: usize,
    /// Registry batches walked.
    pub batches: usize,
    /// Sessions linked this cycle.
    pub promoted: usize,
    /// Sessions dropped at or past their deadline.
    pub expired: usize,
    /// Sessions left for the next cycle, failed fetches included.
    pub still_pending: usize,
    /// Fetches that returned a store error.
    pub fetch_failures: usize,
    /// Fetches cut off by the timeout.
    pub fetch_timeouts: usize,
    /// Promotions or expiries skipped because the guild re-registered
    /// while the cycle was running.
    pub superseded: usize,
    /// The snapshot was rewritten after the last batch.
    pub persisted: bool,
    /// Why the snapshot write failed, when it did.
    pub persist_error: Option<GuildLinkError>,
    /// Wall time spent in the cycle.
    pub duration: Duration,
}

enum FetchOutcome {
    Row(Option<CredentialRow>),
    Failed(GuildLinkError),
    TimedOut,
    Skipped,
}

/// Drives promotion and expiry of pending sessions.
pub struct ReconciliationService {
    registry: Arc<SessionRegistry>,
    linked: Arc<LinkedStore>,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    config: ReconciliationConfig,
}

impl ReconciliationService {
    /// Wire the service to its registry, store and clock.
    pub fn new(
        registry: Arc<SessionRegistry>,
        linked: Arc<LinkedStore>,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        config: ReconciliationConfig,
    ) -> Self {
        Self { registry, linked, store, clock, config }
    }

    /// Run a single cycle over every session registered at call time.
    ///
    /// Never fails: per-session store errors count as "not ready" and a
    /// persistence error is carried in the report.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let now = self.clock.now();
        let mut report =
            CycleReport { pending_before: self.registry.len(), ..CycleReport::default() };

        for batch in self.registry.snapshot_batches(self.config.batch_size) {
            report.batches += 1;
            let outcomes = join_all(batch.iter().map(|session| self.fetch(session, now))).await;

            for (session, outcome) in batch.iter().zip(outcomes) {
                self.apply(session, outcome, now, &mut report);
            }
        }

        match self.linked.persist().await {
            Ok(()) => report.persisted = true,
            Err(err) => {
                warn!(error = %err, "linking.cycle.persist_failed");
                report.persist_error = Some(err);
            }
        }

        report.duration = started.elapsed();
        if report.pending_before > 0 {
            info!(
                pending_before = report.pending_before,
                promoted = report.promoted,
                expired = report.expired,
                still_pending = report.still_pending,
                fetch_failures = report.fetch_failures,
                fetch_timeouts = report.fetch_timeouts,
                persisted = report.persisted,
                duration_ms = report.duration.as_millis(),
                "linking.cycle.completed"
            );
        } else {
            debug!(persisted = report.persisted, "linking.cycle.idle");
        }
        report
    }

    async fn fetch(&self, session: &PendingSession, now: DateTime<Utc>) -> FetchOutcome {
        // An expired session can only expire; skip the round trip.
        if session.is_expired_at(now) {
            return FetchOutcome::Skipped;
        }

        match tokio::time::timeout(self.config.fetch_timeout, self.store.fetch(&session.guild_id))
            .await
        {
            Ok(Ok(row)) => FetchOutcome::Row(row),
            Ok(Err(err)) => FetchOutcome::Failed(err),
            Err(_) => FetchOutcome::TimedOut,
        }
    }

    fn apply(
        &self,
        session: &PendingSession,
        outcome: FetchOutcome,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        let guild_id = session.guild_id.as_str();
        let row = match outcome {
            FetchOutcome::Row(row) => row,
            FetchOutcome::Skipped => None,
            FetchOutcome::Failed(err) => {
                warn!(guild_id, error = %err, "linking.fetch.failed");
                report.fetch_failures += 1;
                None
            }
            FetchOutcome::TimedOut => {
                warn!(
                    guild_id,
                    timeout_ms = self.config.fetch_timeout.as_millis(),
                    "linking.fetch.timed_out"
                );
                report.fetch_timeouts += 1;
                None
            }
        };

        match decide(session, row.as_ref(), now) {
            Decision::Promote(credential) => {
                if self.registry.remove_if_current(session) {
                    self.linked.link(guild_id, credential);
                    info!(guild_id, "linking.session.promoted");
                    report.promoted += 1;
                } else {
                    debug!(guild_id, "linking.session.superseded");
                    report.superseded += 1;
                }
            }
            Decision::Expire => {
                if self.registry.remove_if_current(session) {
                    info!(guild_id, expires_at = %session.expires_at, "linking.session.expired");
                    report.expired += 1;
                } else {
                    report.superseded += 1;
                }
            }
            Decision::Pending => report.still_pending += 1,
        }
    }
}
