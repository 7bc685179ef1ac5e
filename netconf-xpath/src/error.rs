//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

#[derive(Debug, Clone)]
pub enum Error {
    Syntax { pos: usize, reason: String },
    /// An expression prefix has no binding in the supplied namespace
    /// context (`spec.md` §4.D, "an unbound prefix is a
    /// namespace-unresolved error").
    NamespaceUnresolved(String),
    UnknownFunction(String),
    ArityMismatch { function: String, expected: usize, found: usize },
}

impl Error {
    pub fn log(&self) {
        warn!("{}", self);
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Syntax { pos, reason } => write!(f, "XPath syntax error at {pos}: {reason}"),
            Error::NamespaceUnresolved(prefix) => {
                write!(f, "namespace prefix '{prefix}' is not bound")
            }
            Error::UnknownFunction(name) => write!(f, "unknown XPath function '{name}'"),
            Error::ArityMismatch {
                function,
                expected,
                found,
            } => write!(
                f,
                "function '{function}' expects {expected} argument(s), found {found}"
            ),
        }
    }
}

impl std::error::Error for Error {}
