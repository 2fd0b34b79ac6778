// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! infra-core: pure lifecycle logic for self-service clusters
//!
//! Everything here works on a [`WorkflowSnapshot`] and plain values; no I/O.

pub mod macros;

pub mod artifact;
pub mod clock;
pub mod cluster;
pub mod duration;
pub mod flavor;
pub mod lifespan;
pub mod metadata;
pub mod naming;
pub mod notification;
pub mod parameters;
pub mod status;
pub mod template;
pub mod time_fmt;
pub mod workflow;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{exposure, resolve_location, Artifact, ArtifactLocation, Exposure};
pub use clock::{Clock, FakeClock, SystemClock};
pub use cluster::{Cluster, TrackedCluster};
pub use duration::{format_duration, parse_duration, DurationParseError};
pub use flavor::{ArtifactTag, Availability, Flavor, FlavorArtifact, FlavorParameter, ParameterKind};
pub use lifespan::{compute_lifespan, LifespanMethod, NEAR_EXPIRY};
pub use metadata::{AnnotationPatch, NewClusterMetadata, RunMetadata};
pub use naming::{validate_cluster_name, NameError};
pub use notification::{next_notification, MessageKind, NotificationPhase, Transition};
pub use parameters::{reconcile_parameters, ParameterError};
pub use status::{failure_details, infer_status, ClusterStatus, StatusError};
pub use template::TemplateData;
pub use time_fmt::format_expiration;
#[cfg(any(test, feature = "test-support"))]
pub use workflow::{NodeStatusBuilder, WorkflowSnapshotBuilder};
pub use workflow::{
    GcsLocation, NodePhase, NodeStatus, NodeType, OutputArtifact, SnapshotError, WorkflowParameter,
    WorkflowPhase, WorkflowSnapshot,
};
