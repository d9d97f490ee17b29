//! Shared test helpers for `guildlink-core` integration tests.
//!
//! In-memory stand-ins for every port so scenarios can focus on the
//! promote / expire decisions instead of storage plumbing.

#![allow(dead_code)]

pub mod repositories;

use std::sync::Arc;

use chrono::Duration;
use guildlink_common::testing::MockClock;
use guildlink_core::{LinkedStore, ReconciliationConfig, ReconciliationService, SessionRegistry};
use guildlink_domain::Credential;

pub use repositories::{InMemoryCredentialStore, InMemoryDirectory, InMemorySnapshot};

/// Everything a reconciliation scenario needs, wired together.
pub struct Harness {
    pub clock: MockClock,
    pub registry: Arc<SessionRegistry>,
    pub linked: Arc<LinkedStore>,
    pub store: Arc<InMemoryCredentialStore>,
    pub snapshot: Arc<InMemorySnapshot>,
    pub service: ReconciliationService,
}

impl Harness {
    pub fn new(batch_size: usize) -> Self {
        Self::with_config(ReconciliationConfig { batch_size, ..ReconciliationConfig::default() })
    }

    pub fn with_config(config: ReconciliationConfig) -> Self {
        let clock = MockClock::new();
        let registry =
            Arc::new(SessionRegistry::new(Duration::seconds(500), Arc::new(clock.clone())));
        let snapshot = Arc::new(InMemorySnapshot::default());
        let linked = Arc::new(LinkedStore::new(snapshot.clone()));
        let store = Arc::new(InMemoryCredentialStore::default());
        let service = ReconciliationService::new(
            registry.clone(),
            linked.clone(),
            store.clone(),
            Arc::new(clock.clone()),
            config,
        );
        Self { clock, registry, linked, store, snapshot, service }
    }
}

pub fn credential(token: &str) -> Credential {
    Credential {
        token: Some(token.to_string()),
        refresh_token: Some(format!("{token}-refresh")),
        token_uri: Some("https://oauth2.googleapis.com/token".to_string()),
        client_id: Some("client".to_string()),
        client_secret: Some("secret".to_string()),
        scopes: Some(vec!["https://www.googleapis.com/auth/calendar".to_string()]),
        ..Credential::default()
    }
}
