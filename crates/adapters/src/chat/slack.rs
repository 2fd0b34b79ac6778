// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slack Web API client.
//!
//! The user directory is cached by email address. The cache is filled once
//! at construction (a failure there aborts startup) and refreshed in the
//! background every hour; background failures are logged and the stale cache
//! stays in use.

use super::{ChatClient, ChatError, ChatMessage, ChatUser};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

/// How often the user directory cache is refreshed
pub const USER_CACHE_REFRESH: Duration = Duration::from_secs(60 * 60);

const USERS_PAGE_LIMIT: &str = "200";

#[derive(Debug, Clone, Deserialize)]
struct SlackEnvelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct EmptyData {}

#[derive(Debug, Clone, Deserialize)]
struct UsersListData {
    #[serde(default)]
    members: Vec<SlackMember>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackMember {
    id: String,
    #[serde(default)]
    profile: SlackProfile,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct SlackProfile {
    #[serde(default)]
    email: String,
}

/// Slack client posting to one broadcast channel
#[derive(Clone)]
pub struct SlackChatClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    channel: String,
    users: Arc<RwLock<HashMap<String, ChatUser>>>,
}

impl SlackChatClient {
    /// Create a client and fill the user cache.
    pub async fn connect(
        token: &str,
        channel: &str,
        api_base: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Request(e.to_string()))?;
        let client = Self {
            http,
            api_base: api_base
                .filter(|base| !base.trim().is_empty())
                .unwrap_or(DEFAULT_SLACK_API_BASE)
                .to_string(),
            token: token.to_string(),
            channel: channel.to_string(),
            users: Arc::new(RwLock::new(HashMap::new())),
        };

        let count = client.refresh_users().await?;
        tracing::debug!(users = count, "fetched Slack users");
        Ok(client)
    }

    /// Refresh the user cache every [`USER_CACHE_REFRESH`] until the task is
    /// aborted.
    pub fn spawn_user_refresh(&self) -> tokio::task::JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(USER_CACHE_REFRESH);
            // First tick completes immediately; the cache is already warm
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = client.refresh_users().await {
                    tracing::error!(error = %e, "failed to refresh Slack user cache");
                }
            }
        })
    }

    /// Reload every page of the user directory. Returns the number of users
    /// with an email address.
    pub async fn refresh_users(&self) -> Result<usize, ChatError> {
        let mut fetched = HashMap::new();
        let mut cursor = String::new();
        loop {
            let mut query = vec![("limit", USERS_PAGE_LIMIT.to_string())];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.clone()));
            }
            let envelope: SlackEnvelope<UsersListData> = self.get("users.list", &query).await?;
            let data = check(envelope, "users.list")?;
            for member in data.members {
                if member.profile.email.is_empty() {
                    continue;
                }
                let email = member.profile.email;
                fetched.insert(email.clone(), ChatUser { id: member.id, email });
            }
            cursor = data.response_metadata.next_cursor;
            if cursor.trim().is_empty() {
                break;
            }
        }

        let count = fetched.len();
        self.users.write().extend(fetched);
        Ok(count)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ChatError> {
        let mut url = self.endpoint(path);
        if !query.is_empty() {
            let encoded = query
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url = format!("{url}?{encoded}");
        }
        self.http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?
            .json::<T>()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))
    }

    async fn post_to(&self, channel: &str, message: &ChatMessage) -> Result<(), ChatError> {
        let envelope: SlackEnvelope<EmptyData> = self
            .http
            .post(self.endpoint("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&message_payload(channel, message))
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;
        check(envelope, "chat.postMessage").map(|_| ())
    }
}

fn check<T>(envelope: SlackEnvelope<T>, method: &str) -> Result<T, ChatError> {
    if envelope.ok {
        Ok(envelope.data)
    } else {
        Err(ChatError::Api(envelope.error.unwrap_or_else(|| format!("{method} failed"))))
    }
}

/// Request body of `chat.postMessage`
fn message_payload(channel: &str, message: &ChatMessage) -> Value {
    let blocks: Vec<Value> = message
        .sections
        .iter()
        .map(|section| json!({ "type": "section", "text": { "type": "mrkdwn", "text": section } }))
        .collect();
    json!({ "channel": channel, "text": message.fallback_text(), "blocks": blocks })
}

#[async_trait]
impl ChatClient for SlackChatClient {
    async fn post_message(&self, message: &ChatMessage) -> Result<(), ChatError> {
        self.post_to(&self.channel, message).await
    }

    async fn post_message_to_user(
        &self,
        user: &ChatUser,
        message: &ChatMessage,
    ) -> Result<(), ChatError> {
        self.post_to(&user.id, message).await
    }

    fn lookup_user(&self, email: &str) -> Option<ChatUser> {
        self.users.read().get(email).cloned()
    }
}

#[cfg(test)]
#[path = "slack_tests.rs"]
mod tests;
