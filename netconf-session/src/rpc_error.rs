//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! `<rpc-error>` construction and the three-valued propagation result
//! (`spec.md` §7).

use netconf_xml::document::{Document, NodeId};

use crate::error::Error;

/// A structured NETCONF error, built into an `<rpc-error>` fragment
/// rather than propagated as a Rust error (`spec.md` §7, RFC 6241 §A.3
/// tag values).
#[derive(Debug, Clone)]
pub struct RpcError {
    pub error_type: &'static str,
    pub error_tag: &'static str,
    pub error_severity: &'static str,
    pub error_app_tag: Option<String>,
    pub error_path: Option<String>,
    pub error_message: Option<String>,
}

impl RpcError {
    pub fn new(error_type: &'static str, error_tag: &'static str) -> RpcError {
        RpcError {
            error_type,
            error_tag,
            error_severity: "error",
            error_app_tag: None,
            error_path: None,
            error_message: None,
        }
    }

    pub fn application(error_tag: &'static str) -> RpcError {
        RpcError::new("application", error_tag)
    }

    pub fn protocol(error_tag: &'static str) -> RpcError {
        RpcError::new("protocol", error_tag)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> RpcError {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> RpcError {
        self.error_path = Some(path.into());
        self
    }

    /// Appends this error as an `<rpc-error>` child element of `parent`.
    pub fn append_to(&self, doc: &mut Document, parent: NodeId) -> NodeId {
        let rpc_error = doc.new_element("rpc-error", None, Some(parent));
        doc.append_child(parent, rpc_error);

        append_leaf(doc, rpc_error, "error-type", self.error_type);
        append_leaf(doc, rpc_error, "error-tag", self.error_tag);
        append_leaf(doc, rpc_error, "error-severity", self.error_severity);
        if let Some(app_tag) = &self.error_app_tag {
            append_leaf(doc, rpc_error, "error-app-tag", app_tag);
        }
        if let Some(path) = &self.error_path {
            append_leaf(doc, rpc_error, "error-path", path);
        }
        if let Some(message) = &self.error_message {
            append_leaf(doc, rpc_error, "error-message", message);
        }
        rpc_error
    }
}

fn append_leaf(doc: &mut Document, parent: NodeId, name: &str, text: &str) {
    let leaf = doc.new_element(name, None, Some(parent));
    doc.append_child(parent, leaf);
    let body = doc.new_body(text, leaf);
    doc.append_child(leaf, body);
}

/// The three-valued propagation result handlers and leaf helpers return
/// (`spec.md` §7): success, a soft failure already carrying its
/// `<rpc-error>`, or a hard failure that unwinds to the session loop.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Soft(RpcError),
    Hard(Error),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Soft(error) => Outcome::Soft(error),
            Outcome::Hard(error) => Outcome::Hard(error),
        }
    }
}
