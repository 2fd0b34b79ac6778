// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat message templates for lifecycle notifications.
//!
//! Each message is a list of `mrkdwn` sections. Sections that render blank
//! (for example the login hint when a cluster exposes no URL) are dropped.

use crate::notification::MessageKind;

pub const DEFAULT_PORTAL_URL: &str = "https://infra.rox.systems";

/// Values substituted into the templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData {
    pub description: String,
    pub flavor: String,
    pub id: String,
    /// Pre-formatted remaining time, e.g. `2h15m remaining`
    pub remaining: String,
    pub url: String,
    pub owner_email: String,
    /// Chat directory id of the owner, blank when not found
    pub owner_chat_id: String,
    pub failure_details: Option<String>,
    pub portal_url: String,
}

impl TemplateData {
    fn subject(&self) -> String {
        if self.description.is_empty() {
            format!("*{}*", self.id)
        } else {
            format!("*{}*", self.description)
        }
    }

    fn portal_link(&self) -> String {
        let base = if self.portal_url.is_empty() { DEFAULT_PORTAL_URL } else { &self.portal_url };
        format!(":link: Or go to: {}/cluster/{}", base.trim_end_matches('/'), self.id)
    }
}

/// Render the sections of a message.
pub fn render(kind: MessageKind, data: &TemplateData) -> Vec<String> {
    let owner = &data.owner_chat_id;
    let subject = data.subject();
    let id = &data.id;

    let sections = match kind {
        MessageKind::Failed => {
            let details = match &data.failure_details {
                Some(details) if !details.is_empty() => format!(" {details}"),
                _ => String::new(),
            };
            vec![format!("<@{owner}> - Your {subject} cluster has failed!{details} :fire:")]
        }
        MessageKind::Destroyed => {
            vec![format!(":skull_and_crossbones: The {subject} cluster has been destroyed.")]
        }
        MessageKind::Ready => vec![
            format!("<@{owner}> - Your {subject} cluster is now ready! :parrot:"),
            if data.url.is_empty() {
                String::new()
            } else {
                format!(":earth_americas: Browse to *{}* to login.", data.url)
            },
            format!(":clock2: This cluster has about *{}* before it is destroyed.", data.remaining),
            format!(
                ":thinking_face: To view cluster *info*, you can run:\n```$ infractl get {id}```"
            ),
            format!(":pencil: To read cluster *logs*, you can run:\n```$ infractl logs {id}```"),
            format!(
                ":package: To download cluster *artifacts*, you can run:\n\
                 ```$ infractl artifacts {id}```"
            ),
        ],
        MessageKind::Creating => vec![
            format!("<@{owner}> - Your {subject} cluster is being created. :rocket:"),
            format!(":clock2: This cluster has about *{}* before it is destroyed.", data.remaining),
            format!(
                ":thinking_face: To view cluster *info*, you can run:\n ```$ infractl get {id}```"
            ),
            data.portal_link(),
        ],
        MessageKind::NearingExpiry => vec![
            format!(
                "<@{owner}> - Your {subject} cluster has about *{}*. :skull_and_crossbones:",
                data.remaining
            ),
            format!(
                ":clock2: To buy more time, you can run:\n```$ infractl lifespan {id} '+1h'```"
            ),
            data.portal_link(),
        ],
    };

    sections.into_iter().filter(|section| !section.trim().is_empty()).collect()
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
