// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn read_records(path: &std::path::Path) -> Vec<AuditRecord> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn appends_one_line_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlAuditSink::new(dir.path().join("audit/clusters.jsonl"), "staging");

    sink.insert_cluster_creation_record("demo-1", "demo-1-x7k2p", "gke-default", "dev@example.com")
        .await
        .unwrap();
    sink.insert_cluster_deletion_record("demo-1", "demo-1-x7k2p").await.unwrap();

    let records = read_records(sink.path());
    assert_eq!(records.len(), 2);
    match &records[0] {
        AuditRecord::ClusterCreated { environment, cluster_id, flavor, actor, .. } => {
            assert_eq!(environment, "staging");
            assert_eq!(cluster_id, "demo-1");
            assert_eq!(flavor, "gke-default");
            assert_eq!(actor, "dev@example.com");
        }
        other => panic!("unexpected record: {other:?}"),
    }
    assert!(matches!(
        &records[1],
        AuditRecord::ClusterDeleted { workflow_name, .. } if workflow_name == "demo-1-x7k2p"
    ));
}

#[tokio::test]
async fn records_are_tagged_by_event() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlAuditSink::new(dir.path().join("clusters.jsonl"), "prod");
    sink.insert_cluster_deletion_record("demo-1", "demo-1-x7k2p").await.unwrap();

    let line = std::fs::read_to_string(sink.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(value["event"], "cluster_deleted");
    assert_eq!(value["environment"], "prod");
}

#[tokio::test]
async fn unwritable_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be
    let sink = JsonlAuditSink::new(dir.path(), "prod");
    assert!(sink.insert_cluster_deletion_record("demo-1", "demo-1-x7k2p").await.is_err());
}

#[tokio::test]
async fn fake_records_attempts_even_when_failing() {
    let sink = FakeAuditSink::new();
    sink.fail(true);
    assert!(sink.insert_cluster_deletion_record("demo-1", "run").await.is_err());
    assert_eq!(
        sink.calls(),
        vec![AuditCall::Deleted { cluster_id: "demo-1".to_string(), workflow_name: "run".to_string() }]
    );
}
