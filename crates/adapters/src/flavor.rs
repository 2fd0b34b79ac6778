// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flavor catalogue: each flavor paired with the workflow it submits.

use infra_core::{Availability, Flavor};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors from building the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate flavor id {0:?}")]
    Duplicate(String),
    #[error("both {0:?} and {1:?} configured as default flavors")]
    MultipleDefaults(String, String),
    #[error("no default flavor configured")]
    NoDefault,
    #[error("flavor {flavor:?} workflow had duplicate parameter {parameter:?}")]
    DuplicateWorkflowParameter { flavor: String, parameter: String },
    #[error("flavor {flavor:?} workflow had parameter {parameter:?} but manifest did not")]
    UndeclaredParameter { flavor: String, parameter: String },
    #[error("flavor {flavor:?} manifest had parameter {parameter:?} but workflow did not")]
    MissingWorkflowParameter { flavor: String, parameter: String },
}

/// A flavor and the workflow manifest submitted for it
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorEntry {
    pub flavor: Flavor,
    pub template: Value,
}

/// Read access to the flavor catalogue
pub trait FlavorRegistry: Send + Sync + 'static {
    /// Look up by id or alias
    fn get(&self, id: &str) -> Option<FlavorEntry>;

    /// All flavors, most available first, then by id
    fn list(&self) -> Vec<Flavor>;

    fn default_flavor(&self) -> Option<FlavorEntry>;
}

/// Catalogue fixed at startup
#[derive(Debug, Clone, Default)]
pub struct StaticFlavorRegistry {
    entries: BTreeMap<String, FlavorEntry>,
    default_id: Option<String>,
}

impl StaticFlavorRegistry {
    /// Build and validate a catalogue. Exactly one flavor must be the default.
    pub fn new(entries: Vec<FlavorEntry>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for entry in entries {
            registry.add(entry)?;
        }
        if registry.default_id.is_none() {
            return Err(RegistryError::NoDefault);
        }
        Ok(registry)
    }

    fn add(&mut self, entry: FlavorEntry) -> Result<(), RegistryError> {
        let id = entry.flavor.id.clone();
        if self.entries.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        check_workflow_equivalence(&entry)?;

        if entry.flavor.availability == Availability::Default {
            if let Some(existing) = &self.default_id {
                return Err(RegistryError::MultipleDefaults(existing.clone(), id));
            }
            self.default_id = Some(id.clone());
            tracing::info!(flavor = %id, name = %entry.flavor.name, "registered default flavor");
        } else {
            tracing::info!(flavor = %id, name = %entry.flavor.name, "registered flavor");
        }

        self.entries.insert(id, entry);
        Ok(())
    }
}

/// The flavor's declared parameters and the workflow's arguments must name
/// the same set.
fn check_workflow_equivalence(entry: &FlavorEntry) -> Result<(), RegistryError> {
    let flavor = &entry.flavor.id;
    let spec = entry.template.get("spec").unwrap_or(&entry.template);
    let arguments = spec
        .pointer("/arguments/parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut workflow_params = BTreeSet::new();
    for name in arguments.iter().filter_map(|param| param.get("name").and_then(Value::as_str)) {
        if !workflow_params.insert(name) {
            return Err(RegistryError::DuplicateWorkflowParameter {
                flavor: flavor.clone(),
                parameter: name.to_string(),
            });
        }
    }

    let declared: BTreeSet<&str> =
        entry.flavor.parameters.iter().map(|param| param.name.as_str()).collect();
    if let Some(name) = workflow_params.difference(&declared).next() {
        return Err(RegistryError::UndeclaredParameter {
            flavor: flavor.clone(),
            parameter: name.to_string(),
        });
    }
    if let Some(name) = declared.difference(&workflow_params).next() {
        return Err(RegistryError::MissingWorkflowParameter {
            flavor: flavor.clone(),
            parameter: name.to_string(),
        });
    }
    Ok(())
}

impl FlavorRegistry for StaticFlavorRegistry {
    fn get(&self, id: &str) -> Option<FlavorEntry> {
        self.entries
            .get(id)
            .or_else(|| self.entries.values().find(|entry| entry.flavor.answers_to(id)))
            .cloned()
    }

    fn list(&self) -> Vec<Flavor> {
        let mut flavors: Vec<Flavor> =
            self.entries.values().map(|entry| entry.flavor.clone()).collect();
        flavors.sort_by(|a, b| b.availability.cmp(&a.availability).then_with(|| a.id.cmp(&b.id)));
        flavors
    }

    fn default_flavor(&self) -> Option<FlavorEntry> {
        self.default_id.as_deref().and_then(|id| self.entries.get(id)).cloned()
    }
}

#[cfg(test)]
#[path = "flavor_tests.rs"]
mod tests;
