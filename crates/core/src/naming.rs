// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster id validation.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 28;

/// Lowercase alphanumerics and `-`, starting with a letter, ending with a
/// letter or digit.
#[allow(clippy::expect_used)]
static CLUSTER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z](?:[-a-z0-9]{1,26}[a-z0-9]))$").expect("constant regex pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("cluster name too short")]
    TooShort,
    #[error("cluster name too long")]
    TooLong,
    #[error(
        "the name does not match the requirements. Only lowercase letters, numbers, and '-' \
         allowed, must start with a letter and end with a letter or number"
    )]
    InvalidCharacters,
}

pub fn validate_cluster_name(name: &str) -> Result<(), NameError> {
    if name.len() < MIN_NAME_LEN {
        return Err(NameError::TooShort);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }
    if !CLUSTER_NAME.is_match(name) {
        return Err(NameError::InvalidCharacters);
    }
    Ok(())
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
