// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat adapters for lifecycle notifications
//!
//! Messages go either to the configured broadcast channel or straight to the
//! cluster owner, who is found in the chat directory by email address.

mod slack;

pub use slack::SlackChatClient;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ChatCall, FakeChatClient};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from chat operations
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Request(String),
    #[error("chat API error: {0}")]
    Api(String),
}

/// A message made of `mrkdwn` sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sections: Vec<String>,
}

impl ChatMessage {
    pub fn new(sections: Vec<String>) -> Self {
        Self { sections }
    }

    /// Plain-text rendering for clients that cannot show blocks
    pub fn fallback_text(&self) -> String {
        self.sections.join("\n")
    }
}

/// A member of the chat directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: String,
    pub email: String,
}

/// Adapter for posting chat messages
#[async_trait]
pub trait ChatClient: Send + Sync + 'static {
    /// Post to the broadcast channel
    async fn post_message(&self, message: &ChatMessage) -> Result<(), ChatError>;

    /// Post a direct message to `user`
    async fn post_message_to_user(
        &self,
        user: &ChatUser,
        message: &ChatMessage,
    ) -> Result<(), ChatError>;

    /// Find a directory member by email
    fn lookup_user(&self, email: &str) -> Option<ChatUser>;
}

/// Chat client used when no chat integration is configured. Accepts and
/// drops every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledChatClient;

#[async_trait]
impl ChatClient for DisabledChatClient {
    async fn post_message(&self, _message: &ChatMessage) -> Result<(), ChatError> {
        Ok(())
    }

    async fn post_message_to_user(
        &self,
        _user: &ChatUser,
        _message: &ChatMessage,
    ) -> Result<(), ChatError> {
        Ok(())
    }

    fn lookup_user(&self, _email: &str) -> Option<ChatUser> {
        None
    }
}
