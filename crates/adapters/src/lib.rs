// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the workflow backend, pod logs, chat,
//! artifact storage, audit records and the flavor catalogue.

pub mod audit;
pub mod chat;
pub mod flavor;
pub mod logs;
pub mod signer;
pub mod workflow;

pub use audit::{AuditError, AuditSink, DisabledAuditSink, JsonlAuditSink};
pub use chat::{ChatClient, ChatError, ChatMessage, ChatUser, DisabledChatClient, SlackChatClient};
pub use flavor::{FlavorEntry, FlavorRegistry, RegistryError, StaticFlavorRegistry};
pub use logs::{KubePodLogs, PodLogs};
pub use signer::{DisabledSigner, GcsSigner, SignerError, UrlSigner};
pub use workflow::{BackendError, KubeWorkflowBackend, RunHandle, RunRequest, WorkflowBackend};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use audit::{AuditCall, FakeAuditSink};
#[cfg(any(test, feature = "test-support"))]
pub use chat::{ChatCall, FakeChatClient};
#[cfg(any(test, feature = "test-support"))]
pub use logs::FakePodLogs;
#[cfg(any(test, feature = "test-support"))]
pub use signer::FakeSigner;
#[cfg(any(test, feature = "test-support"))]
pub use workflow::{BackendCall, FakeWorkflowBackend};
