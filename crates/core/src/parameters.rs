// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconcile user-supplied parameters against a flavor's declared contract.

use crate::flavor::{FlavorParameter, ParameterKind};
use crate::workflow::WorkflowParameter;
use std::collections::BTreeMap;
use thiserror::Error;

/// A parameter set that does not satisfy the flavor's contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("rejecting an internal parameter: {0:?}")]
    Internal(String),
    #[error("parameter {0:?} was not provided")]
    Missing(String),
    #[error("passed parameter {0:?} is not defined for this flavor")]
    Undefined(String),
}

impl ParameterError {
    /// Name of the offending parameter
    pub fn parameter(&self) -> &str {
        match self {
            Self::Internal(name) | Self::Missing(name) | Self::Undefined(name) => name,
        }
    }
}

/// Build the run parameters for a flavor.
///
/// Declared parameters are resolved in ascending `order` (declaration order
/// breaks ties). Either every declared parameter resolves and no unknown key
/// was supplied, or the first offending parameter is reported.
pub fn reconcile_parameters(
    declared: &[FlavorParameter],
    supplied: &BTreeMap<String, String>,
) -> Result<Vec<WorkflowParameter>, ParameterError> {
    let mut ordered: Vec<&FlavorParameter> = declared.iter().collect();
    ordered.sort_by_key(|parameter| parameter.order);

    let mut resolved = Vec::with_capacity(ordered.len());
    for parameter in ordered {
        let value = match (parameter.kind, supplied.get(&parameter.name)) {
            (ParameterKind::Hardcoded, Some(_)) => {
                return Err(ParameterError::Internal(parameter.name.clone()))
            }
            (ParameterKind::Hardcoded, None) => parameter.value.clone(),
            (ParameterKind::Optional, Some(value)) => value.clone(),
            (ParameterKind::Optional, None) => parameter.value.clone(),
            (ParameterKind::Required, Some(value)) => value.clone(),
            (ParameterKind::Required, None) => {
                return Err(ParameterError::Missing(parameter.name.clone()))
            }
        };
        resolved.push(WorkflowParameter {
            name: parameter.name.clone(),
            value,
            description: parameter.description.clone(),
        });
    }

    for name in supplied.keys() {
        let user_settable = declared
            .iter()
            .any(|parameter| &parameter.name == name && parameter.kind != ParameterKind::Hardcoded);
        if !user_settable {
            return Err(ParameterError::Undefined(name.clone()));
        }
    }

    Ok(resolved)
}

#[cfg(test)]
#[path = "parameters_tests.rs"]
mod tests;
