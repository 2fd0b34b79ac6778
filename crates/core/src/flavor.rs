// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flavor definitions: the catalogue of cluster kinds users can request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maturity classification of a flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Alpha,
    Beta,
    Stable,
    Default,
}

crate::simple_display! {
    Availability {
        Alpha => "alpha",
        Beta => "beta",
        Stable => "stable",
        Default => "default",
    }
}

/// How a declared parameter gets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Must be supplied; the declared value is only an example
    Required,
    /// May be supplied; the declared value is the default
    Optional,
    /// Fixed by the flavor; users may not override it
    Hardcoded,
}

crate::simple_display! {
    ParameterKind {
        Required => "required",
        Optional => "optional",
        Hardcoded => "hardcoded",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorParameter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_kind")]
    pub kind: ParameterKind,
    /// Example, default, or fixed value depending on `kind`
    #[serde(default)]
    pub value: String,
    /// Position among the flavor's parameters
    #[serde(default)]
    pub order: i32,
}

fn default_kind() -> ParameterKind {
    ParameterKind::Required
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactTag {
    /// Contents are the cluster's login URL
    Url,
    /// Contents are connection instructions
    Connect,
    /// Never shown to users
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorArtifact {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<ArtifactTag>,
}

impl FlavorArtifact {
    pub fn has_tag(&self, tag: ArtifactTag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub availability: Availability,
    #[serde(default)]
    pub parameters: Vec<FlavorParameter>,
    #[serde(default)]
    pub artifacts: Vec<FlavorArtifact>,
    /// Alternative ids the flavor can be requested by
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Flavor {
    pub fn artifact(&self, name: &str) -> Option<&FlavorArtifact> {
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }

    pub fn answers_to(&self, id: &str) -> bool {
        self.id == id || self.aliases.iter().any(|alias| alias == id)
    }
}
