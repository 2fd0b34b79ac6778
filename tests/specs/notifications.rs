// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification specs
//!
//! Owners hear about each lifecycle stage exactly once, no matter how many
//! sweeps run in between.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn owner_hears_about_each_stage_once() {
    let harness = TestHarness::new();
    harness.chat.add_user("U42", OWNER);
    let run = create_cluster(&harness, "demo-1").await;
    let sweep = || harness.service.sweep_notifications();

    sweep().await.unwrap();
    sweep().await.unwrap();
    assert_eq!(stored_notification(&harness, &run), "creating");

    provision(&harness, &run);
    sweep().await.unwrap();
    assert_eq!(stored_notification(&harness, &run), "ready");

    harness.advance(2 * HOUR + Duration::from_secs(40 * 60));
    sweep().await.unwrap();
    sweep().await.unwrap();
    assert_eq!(stored_notification(&harness, &run), "nearing_expiry");

    harness.advance(HOUR);
    harness.service.sweep_expired().await.unwrap();
    sweep().await.unwrap();
    assert_eq!(stored_notification(&harness, &run), "destroyed");

    finish(&harness, &run);
    sweep().await.unwrap();

    let lines: Vec<String> =
        harness.chat.calls().iter().map(|call| first_line(call).to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "<@U42> - Your *demo-1* cluster is being created. :rocket:".to_string(),
            "<@U42> - Your *demo-1* cluster is now ready! :parrot:".to_string(),
            "<@U42> - Your *demo-1* cluster has about *20m remaining*. :skull_and_crossbones:"
                .to_string(),
            ":skull_and_crossbones: The *demo-1* cluster has been destroyed.".to_string(),
        ]
    );
}

#[tokio::test]
async fn extending_a_nearly_expired_cluster_is_silent() {
    let harness = TestHarness::new();
    let run = create_cluster(&harness, "demo-1").await;
    provision(&harness, &run);
    harness.service.sweep_notifications().await.unwrap();
    harness.advance(2 * HOUR + Duration::from_secs(40 * 60));
    harness.service.sweep_notifications().await.unwrap();
    assert_eq!(stored_notification(&harness, &run), "nearing_expiry");
    let sent = harness.chat.calls().len();

    harness.service.lifespan("demo-1", LifespanMethod::Add, 2 * HOUR, OWNER).await.unwrap();
    let report = harness.service.sweep_notifications().await.unwrap();

    assert_eq!(report.acted, 0);
    assert_eq!(harness.chat.calls().len(), sent);
    assert_eq!(stored_notification(&harness, &run), "ready");
}

#[tokio::test]
async fn failure_is_reported_with_its_cause() {
    let harness = TestHarness::new();
    let run = create_cluster(&harness, "demo-1").await;
    harness.service.sweep_notifications().await.unwrap();

    stall(&harness, &run, "Back-off pulling image: ImagePullBackOff");
    harness.service.sweep_notifications().await.unwrap();

    let calls = harness.chat.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        first_line(&calls[1]),
        "<@> - Your *demo-1* cluster has failed! Workflow node `create` has encountered an \
         image pull back-off. :fire:"
    );
    assert_eq!(stored_notification(&harness, &run), "failed");
    assert!(harness.audit.calls().contains(&AuditCall::Deleted {
        cluster_id: "demo-1".to_string(),
        workflow_name: run.clone(),
    }));
}

#[tokio::test]
async fn opted_out_clusters_stay_silent() {
    let harness = TestHarness::new();
    let mut request = create_request("quiet");
    request.no_slack = true;
    harness.service.create(request).await.unwrap();

    harness.service.sweep_notifications().await.unwrap();

    assert!(harness.chat.calls().is_empty());
}

#[tokio::test]
async fn direct_messages_reach_the_owner() {
    let harness = TestHarness::new();
    harness.chat.add_user("U42", OWNER);
    let mut request = create_request("demo-1");
    request.slack_dm = true;
    harness.service.create(request).await.unwrap();

    harness.service.sweep_notifications().await.unwrap();

    assert!(matches!(
        harness.chat.calls().as_slice(),
        [ChatCall::Direct { user_id, .. }] if user_id == "U42"
    ));
}
