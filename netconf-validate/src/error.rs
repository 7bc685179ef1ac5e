//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

use netconf_xml::NodeId;
use tracing::warn;

/// One validation failure against a bound element (`spec.md` §4.C).
/// `error-tag` values follow RFC 6241 §A.3, matched to the NETCONF
/// `error-type=application` errors this crate can raise.
#[derive(Debug, Clone)]
pub enum ValidationError {
    MissingMandatory { node: NodeId, name: String },
    InvalidValue { node: NodeId, reason: String },
}

impl ValidationError {
    pub fn error_tag(&self) -> &'static str {
        match self {
            ValidationError::MissingMandatory { .. } => "missing-element",
            ValidationError::InvalidValue { .. } => "invalid-value",
        }
    }

    pub fn log(&self) {
        match self {
            ValidationError::MissingMandatory { name, .. } => {
                warn!(%name, "{}", self);
            }
            ValidationError::InvalidValue { reason, .. } => {
                warn!(%reason, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingMandatory { name, .. } => {
                write!(f, "missing mandatory element '{name}'")
            }
            ValidationError::InvalidValue { reason, .. } => {
                write!(f, "invalid value: {reason}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
