// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ChatClient, ChatError, ChatMessage, ChatUser};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Recorded chat delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    Broadcast { message: ChatMessage },
    Direct { user_id: String, message: ChatMessage },
}

impl ChatCall {
    pub fn message(&self) -> &ChatMessage {
        match self {
            Self::Broadcast { message } | Self::Direct { message, .. } => message,
        }
    }
}

#[derive(Default)]
struct FakeChatState {
    users: HashMap<String, ChatUser>,
    calls: Vec<ChatCall>,
    fail_broadcast: bool,
    fail_direct: bool,
}

/// Fake chat client for testing
#[derive(Clone, Default)]
pub struct FakeChatClient {
    inner: Arc<Mutex<FakeChatState>>,
}

impl FakeChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory member
    pub fn add_user(&self, id: &str, email: &str) {
        self.inner
            .lock()
            .users
            .insert(email.to_string(), ChatUser { id: id.to_string(), email: email.to_string() });
    }

    pub fn fail_broadcast(&self, fail: bool) {
        self.inner.lock().fail_broadcast = fail;
    }

    pub fn fail_direct(&self, fail: bool) {
        self.inner.lock().fail_direct = fail;
    }

    /// Successfully delivered messages
    pub fn calls(&self) -> Vec<ChatCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl ChatClient for FakeChatClient {
    async fn post_message(&self, message: &ChatMessage) -> Result<(), ChatError> {
        let mut state = self.inner.lock();
        if state.fail_broadcast {
            return Err(ChatError::Api("channel_not_found".to_string()));
        }
        state.calls.push(ChatCall::Broadcast { message: message.clone() });
        Ok(())
    }

    async fn post_message_to_user(
        &self,
        user: &ChatUser,
        message: &ChatMessage,
    ) -> Result<(), ChatError> {
        let mut state = self.inner.lock();
        if state.fail_direct {
            return Err(ChatError::Api("user_not_found".to_string()));
        }
        state.calls.push(ChatCall::Direct { user_id: user.id.clone(), message: message.clone() });
        Ok(())
    }

    fn lookup_user(&self, email: &str) -> Option<ChatUser> {
        self.inner.lock().users.get(email).cloned()
    }
}
