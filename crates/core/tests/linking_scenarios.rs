//! End-to-end reconciliation scenarios against in-memory ports.

mod support;

use std::sync::Arc;
use std::time::Duration;

use guildlink_core::{GuildDirectory, LinkingService, ReconciliationConfig};
use guildlink_domain::GuildLinkError;
use support::{credential, Harness, InMemoryDirectory};

#[tokio::test]
async fn completed_authorization_is_promoted() {
    let h = Harness::new(10);
    let session = h.registry.register("G1");
    h.store.complete("G1", &session.expected_state, credential("t1"));

    let report = h.service.run_cycle().await;

    assert_eq!(report.promoted, 1);
    assert!(report.persisted);
    assert_eq!(h.linked.get("G1"), Some(credential("t1")));
    assert!(h.registry.get("G1").is_none());
    assert_eq!(h.snapshot.stored().get("G1"), Some(&credential("t1")));
}

#[tokio::test]
async fn expired_session_is_dropped_even_with_matching_row() {
    let h = Harness::new(10);
    let session = h.registry.register("G2");
    h.store.complete("G2", &session.expected_state, credential("t2"));
    h.clock.advance(chrono::Duration::seconds(501));

    let report = h.service.run_cycle().await;

    assert_eq!(report.expired, 1);
    assert_eq!(report.promoted, 0);
    assert!(h.registry.get("G2").is_none());
    assert!(!h.linked.contains("G2"));
    assert!(h.store.fetched().is_empty());
}

#[tokio::test]
async fn session_is_expired_exactly_at_its_deadline() {
    let h = Harness::new(10);
    let session = h.registry.register("G2");
    h.store.complete("G2", &session.expected_state, credential("t2"));
    h.clock.advance(chrono::Duration::seconds(500));

    let report = h.service.run_cycle().await;
    assert_eq!((report.promoted, report.expired), (0, 1));
    assert!(!h.linked.contains("G2"));
}

#[tokio::test]
async fn only_the_latest_registration_promotes() {
    let h = Harness::new(10);
    let first = h.registry.register("G3");
    let second = h.registry.register("G3");

    h.store.complete("G3", &first.expected_state, credential("stale"));
    let report = h.service.run_cycle().await;
    assert_eq!(report.promoted, 0);
    assert_eq!(report.still_pending, 1);
    assert!(!h.linked.contains("G3"));

    h.store.complete("G3", &second.expected_state, credential("fresh"));
    let report = h.service.run_cycle().await;
    assert_eq!(report.promoted, 1);
    assert_eq!(h.linked.get("G3"), Some(credential("fresh")));
}

#[tokio::test]
async fn every_batch_is_processed_in_one_cycle() {
    let h = Harness::new(2);
    for i in 0..5 {
        let guild = format!("G{i}");
        let session = h.registry.register(&guild);
        if i % 2 == 0 {
            h.store.complete(&guild, &session.expected_state, credential(&guild));
        }
    }

    let report = h.service.run_cycle().await;

    assert_eq!(report.batches, 3);
    assert_eq!(report.promoted, 3);
    assert_eq!(report.still_pending, 2);
    assert_eq!(h.linked.len(), 3);
    assert_eq!(h.registry.len(), 2);
    assert!(h.registry.get("G1").is_some());
    assert!(h.registry.get("G3").is_some());
}

#[tokio::test]
async fn fetch_failure_does_not_abort_the_batch() {
    let h = Harness::new(10);
    let ok = h.registry.register("ok");
    h.registry.register("broken");
    h.store.complete("ok", &ok.expected_state, credential("t"));
    h.store.fail_fetches_for("broken");

    let report = h.service.run_cycle().await;

    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.promoted, 1);
    assert!(h.linked.contains("ok"));
    assert!(h.registry.get("broken").is_some());
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_times_out_as_not_ready() {
    let h = Harness::with_config(ReconciliationConfig {
        batch_size: 10,
        fetch_timeout: Duration::from_secs(1),
    });
    let slow = h.registry.register("slow");
    h.store.complete("slow", &slow.expected_state, credential("t"));
    h.store.delay_fetches_for("slow", Duration::from_secs(30));

    let report = h.service.run_cycle().await;

    assert_eq!(report.fetch_timeouts, 1);
    assert_eq!(report.still_pending, 1);
    assert!(!h.linked.contains("slow"));
}

#[tokio::test(start_paused = true)]
async fn re_registration_during_fetch_keeps_the_new_session() {
    let h = Harness::new(10);
    let stale = h.registry.register("g1");
    h.store.complete("g1", &stale.expected_state, credential("t"));
    h.store.delay_fetches_for("g1", Duration::from_secs(2));

    let reregister = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        h.registry.register("g1")
    };
    let (report, fresh) = tokio::join!(h.service.run_cycle(), reregister);

    assert_eq!(report.promoted, 0);
    assert_eq!(report.superseded, 1);
    assert!(!h.linked.contains("g1"));
    assert_eq!(h.registry.get("g1"), Some(fresh));
    assert_eq!(h.registry.len(), 1);
}

#[tokio::test]
async fn snapshot_is_rewritten_every_cycle() {
    let h = Harness::new(10);
    h.service.run_cycle().await;
    h.service.run_cycle().await;
    assert_eq!(h.snapshot.saves(), 2);
}

#[tokio::test]
async fn persistence_failure_keeps_promotions() {
    let h = Harness::new(10);
    let session = h.registry.register("G1");
    h.store.complete("G1", &session.expected_state, credential("t1"));
    h.snapshot.set_fail_saves(true);

    let report = h.service.run_cycle().await;

    assert!(!report.persisted);
    assert!(matches!(report.persist_error, Some(GuildLinkError::Persistence(_))));
    assert!(h.linked.contains("G1"));

    h.snapshot.set_fail_saves(false);
    assert!(h.service.run_cycle().await.persisted);
    assert!(h.snapshot.stored().contains_key("G1"));
}

#[tokio::test]
async fn pending_without_credential_survives_until_expiry() {
    let h = Harness::new(10);
    h.registry.register("G1");

    assert_eq!(h.service.run_cycle().await.still_pending, 1);
    h.clock.advance(chrono::Duration::seconds(499));
    assert_eq!(h.service.run_cycle().await.still_pending, 1);
    h.clock.advance(chrono::Duration::seconds(1));
    assert_eq!(h.service.run_cycle().await.expired, 1);
    assert!(h.registry.is_empty());
}

#[tokio::test]
async fn directory_requires_a_linked_guild() {
    let h = Harness::new(10);
    let directory = GuildDirectory::new(h.linked.clone(), Arc::new(InMemoryDirectory::default()));

    let err = directory.add_member_email("G1", "m1", "a@example.com").await.expect_err("unlinked");
    assert!(matches!(err, GuildLinkError::NotLinked(_)));
    assert!(matches!(
        directory.get_member_emails("G1").await,
        Err(GuildLinkError::NotLinked(_))
    ));

    let session = h.registry.register("G1");
    h.store.complete("G1", &session.expected_state, credential("t1"));
    h.service.run_cycle().await;

    assert!(directory.get_member_emails("G1").await.expect("linked").is_empty());
    directory.add_member_email("G1", "m1", "  a@example.com ").await.expect("added");
    let emails = directory.get_member_emails("G1").await.expect("listed");
    assert_eq!(emails.get("m1").map(String::as_str), Some("a@example.com"));
}

#[tokio::test]
async fn directory_rejects_duplicates_across_guilds() {
    let h = Harness::new(10);
    h.linked.link("G1", credential("t1"));
    h.linked.link("G2", credential("t2"));
    let directory = GuildDirectory::new(h.linked.clone(), Arc::new(InMemoryDirectory::default()));

    directory.add_member_email("G1", "m1", "a@example.com").await.expect("added");

    let err = directory.add_member_email("G2", "m1", "b@example.com").await.expect_err("dup");
    assert!(matches!(err, GuildLinkError::DuplicateMember(_)));

    let err = directory.add_member_email("G2", "m2", "a@example.com").await.expect_err("dup");
    assert!(matches!(err, GuildLinkError::DuplicateEmail(_)));

    let err = directory.add_member_email("G2", "m2", "nope").await.expect_err("invalid");
    assert!(matches!(err, GuildLinkError::InvalidInput(_)));
}

#[tokio::test]
async fn revoke_clears_every_trace() {
    let h = Harness::new(10);
    let linking = LinkingService::new(
        h.registry.clone(),
        h.linked.clone(),
        h.store.clone(),
        "http://localhost:5000/",
    )
    .expect("service");

    let start = linking.start_authorization("G1").await.expect("started");
    h.store.complete("G1", &start.state, credential("t1"));
    h.service.run_cycle().await;
    assert!(linking.linked_credential("G1").is_some());

    assert!(linking.revoke("G1").await.expect("revoked"));
    assert!(linking.linked_credential("G1").is_none());
    assert!(h.store.row("G1").is_none());
    assert!(!h.snapshot.stored().contains_key("G1"));

    assert!(!linking.revoke("G1").await.expect("second revoke is a no-op"));
}

#[tokio::test]
async fn revoke_cancels_a_pending_session() {
    let h = Harness::new(10);
    let linking = LinkingService::new(
        h.registry.clone(),
        h.linked.clone(),
        h.store.clone(),
        "http://localhost:5000/",
    )
    .expect("service");

    let start = linking.start_authorization("G1").await.expect("started");
    assert!(!linking.revoke("G1").await.expect("revoked"));
    assert_eq!(linking.pending_count(), 0);

    h.store.complete("G1", &start.state, credential("late"));
    assert_eq!(h.service.run_cycle().await.promoted, 0);
}
