// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster lifecycle specs
//!
//! A cluster is created, becomes ready, has its lifespan edited, and is torn
//! down either on request or by the expiration sweep.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn created_cluster_is_creating_until_provisioned() {
    let harness = TestHarness::new();

    let run = create_cluster(&harness, "demo-1").await;
    assert_eq!(harness.service.info("demo-1").await.unwrap().status, ClusterStatus::Creating);

    provision(&harness, &run);
    let cluster = harness.service.info("demo-1").await.unwrap();
    assert_eq!(cluster.status, ClusterStatus::Ready);
    assert_eq!(cluster.owner, OWNER);
    assert_eq!(cluster.flavor, TEST_FLAVOR);
    assert_eq!(cluster.lifespan, 3 * HOUR);
}

#[tokio::test]
async fn lifespan_edits_accumulate() {
    let harness = TestHarness::new();
    let run = create_cluster(&harness, "demo-1").await;
    provision(&harness, &run);

    let service = &harness.service;
    let left = service.lifespan("demo-1", LifespanMethod::Add, 2 * HOUR, OWNER).await.unwrap();
    assert_eq!(left, 5 * HOUR);

    harness.advance(HOUR);
    let left = service.lifespan("demo-1", LifespanMethod::Subtract, HOUR, OWNER).await.unwrap();
    assert_eq!(left, 3 * HOUR);

    let cluster = service.info("demo-1").await.unwrap();
    assert_eq!(cluster.lifespan, 4 * HOUR);
}

#[tokio::test]
async fn subtracting_more_than_remains_expires_immediately() {
    let harness = TestHarness::new();
    let run = create_cluster(&harness, "demo-1").await;
    provision(&harness, &run);

    let service = &harness.service;
    let edit = service.lifespan("demo-1", LifespanMethod::Subtract, 10 * HOUR, OWNER);
    let left = edit.await.unwrap();
    assert_eq!(left, Duration::ZERO);

    harness.advance(Duration::from_secs(1));
    let report = service.sweep_expired().await.unwrap();
    assert_eq!(report.acted, 1);
    assert_eq!(service.info("demo-1").await.unwrap().status, ClusterStatus::Destroying);
}

#[tokio::test]
async fn delete_tears_down_and_frees_the_id() {
    let harness = TestHarness::new();
    let run = create_cluster(&harness, "demo-1").await;
    provision(&harness, &run);

    harness.service.delete("demo-1", OWNER).await.unwrap();
    assert_eq!(harness.service.info("demo-1").await.unwrap().status, ClusterStatus::Destroying);

    let err = harness.service.create(create_request("demo-1")).await.unwrap_err();
    assert!(matches!(err, ClusterError::Conflict(_)));

    finish(&harness, &run);
    harness.advance(Duration::from_secs(1));
    let second = create_cluster(&harness, "demo-1").await;
    assert_ne!(second, run);

    assert_eq!(
        harness.audit.calls(),
        vec![
            AuditCall::Created {
                cluster_id: "demo-1".to_string(),
                workflow_name: run.clone(),
                flavor: TEST_FLAVOR.to_string(),
                actor: OWNER.to_string(),
            },
            AuditCall::Deleted { cluster_id: "demo-1".to_string(), workflow_name: run },
            AuditCall::Created {
                cluster_id: "demo-1".to_string(),
                workflow_name: second,
                flavor: TEST_FLAVOR.to_string(),
                actor: OWNER.to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn expiration_sweep_resumes_only_expired_ready_clusters() {
    let harness = TestHarness::new();
    let short = create_cluster(&harness, "short").await;
    let long = create_cluster(&harness, "long").await;
    create_cluster(&harness, "booting").await;
    provision(&harness, &short);
    provision(&harness, &long);
    harness.service.lifespan("long", LifespanMethod::Replace, 8 * HOUR, OWNER).await.unwrap();

    harness.advance(4 * HOUR);
    let report = harness.service.sweep_expired().await.unwrap();

    assert_eq!(report, SweepReport { scanned: 3, acted: 1, failed: 0 });
    let resumed: Vec<_> = harness
        .backend
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            BackendCall::Resume { run } => Some(run),
            _ => None,
        })
        .collect();
    assert_eq!(resumed, vec![short]);
}

#[tokio::test]
async fn listing_hides_expired_and_foreign_clusters_by_default() {
    let harness = TestHarness::new();
    let mine = create_cluster(&harness, "mine").await;
    provision(&harness, &mine);
    let mut theirs = create_request("theirs");
    theirs.owner = "other@example.com".to_string();
    harness.service.create(theirs).await.unwrap();
    create_cluster(&harness, "gone").await;
    harness.service.lifespan("gone", LifespanMethod::Replace, HOUR, OWNER).await.unwrap();
    harness.advance(2 * HOUR);

    let filter = ListFilter { requester: OWNER.to_string(), ..ListFilter::default() };
    let ids: Vec<String> =
        harness.service.list(&filter).await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["mine".to_string()]);

    let filter = ListFilter { all: true, expired: true, ..filter };
    let mut ids: Vec<String> =
        harness.service.list(&filter).await.unwrap().into_iter().map(|c| c.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["gone".to_string(), "mine".to_string(), "theirs".to_string()]);
}
