// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Create specs
//!
//! Requests are checked against the flavor's parameter contract and the id
//! namespace before any run is submitted.

use crate::prelude::*;
use similar_asserts::assert_eq;

fn field_of(err: &ClusterError) -> &str {
    match err {
        ClusterError::Validation { field, .. } => field.as_str(),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn hardcoded_parameters_cannot_be_overridden() {
    let harness = TestHarness::new();
    let mut request = create_request("demo-1");
    request.parameters.insert("region".to_string(), "eu-west1".to_string());

    let err = harness.service.create(request).await.unwrap_err();

    assert_eq!(field_of(&err), "region");
    assert_eq!(err.to_string(), "rejecting an internal parameter: \"region\"");
    assert!(harness.backend.runs().is_empty());
}

#[tokio::test]
async fn unknown_parameters_are_rejected() {
    let harness = TestHarness::new();
    let mut request = create_request("demo-1");
    request.parameters.insert("gpu".to_string(), "true".to_string());

    let err = harness.service.create(request).await.unwrap_err();

    assert_eq!(field_of(&err), "gpu");
    assert_eq!(err.to_string(), "passed parameter \"gpu\" is not defined for this flavor");
}

#[tokio::test]
async fn names_must_be_dns_friendly() {
    let harness = TestHarness::new();

    for name in ["x", "Has-Caps", "9lives", "ends-with-", "this-name-is-far-too-long-to-accept"] {
        let err = harness.service.create(create_request(name)).await.unwrap_err();
        assert_eq!(field_of(&err), "name", "name {name:?}");
    }
    assert!(harness.backend.runs().is_empty());
}

#[tokio::test]
async fn live_ids_cannot_be_reused() {
    let harness = TestHarness::new();
    let run = create_cluster(&harness, "demo-1").await;
    provision(&harness, &run);

    let err = harness.service.create(create_request("demo-1")).await.unwrap_err();

    assert_eq!(err.to_string(), "An infra cluster ID \"demo-1\" already exists in state READY.");
    assert_eq!(harness.backend.runs().len(), 1);
}

#[tokio::test]
async fn failed_ids_can_be_reused() {
    let harness = TestHarness::new();
    let run = create_cluster(&harness, "demo-1").await;
    stall(&harness, &run, "ErrImagePull");

    harness.advance(Duration::from_secs(1));
    let retry = create_cluster(&harness, "demo-1").await;

    assert_ne!(retry, run);
    let cluster = harness.service.info("demo-1").await.unwrap();
    assert_eq!(cluster.status, ClusterStatus::Creating);
}

#[tokio::test]
async fn run_parameters_follow_flavor_order() {
    let harness = TestHarness::new();
    let mut request = create_request("demo-1");
    request.parameters.insert("nodes".to_string(), "7".to_string());

    harness.service.create(request).await.unwrap();

    let parameters: Vec<(String, String)> = harness
        .backend
        .run("demo-1-00001")
        .unwrap()
        .parameters
        .into_iter()
        .map(|p| (p.name, p.value))
        .collect();
    assert_eq!(
        parameters,
        vec![
            ("name".to_string(), "demo-1".to_string()),
            ("nodes".to_string(), "7".to_string()),
            ("region".to_string(), "us-central1".to_string()),
        ]
    );
}
