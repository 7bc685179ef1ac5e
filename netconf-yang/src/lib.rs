//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! In-memory YANG statement model.
//!
//! This is deliberately not a conformant YANG 1.1 compiler: it understands
//! only the statement keywords a NETCONF core needs to bind and validate
//! configuration data against (`spec.md` §3/§4.B), plus `uses`/`grouping`
//! (needed by [`lookup::find_syntax`]) and `rpc`/`action`/`input`/`output`
//! (needed for the `RPC` binding mode). Anything else is kept as an opaque
//! child per RFC 7950's "unknown statement" leniency rather than rejected.

pub mod error;
pub mod keyword;
pub mod loader;
pub mod lookup;
pub mod statement;
pub mod typedesc;

pub use error::Error;
pub use keyword::Keyword;
pub use statement::{Statement, StatementId};
pub use typedesc::TypeDesc;

use std::collections::HashMap;

/// A loaded set of YANG modules, read-only after [`loader::load_dir`] or
/// [`loader::load_str`] return it.
///
/// Matches `SPEC_FULL.md` §3's "Context handle": sessions hold this behind
/// an `Arc` and never mutate it.
#[derive(Debug, Default)]
pub struct YangSpec {
    modules: statement::Arena,
    /// Top-level module statement ids, in load order.
    module_ids: Vec<StatementId>,
    /// `(namespace-uri, local-name)` -> top-level schema node, for binding
    /// mode `TOP`.
    top_index: HashMap<(String, String), StatementId>,
    /// `(namespace-uri, local-name)` -> `rpc`/`action` schema node, for
    /// binding mode `RPC`.
    rpc_index: HashMap<(String, String), StatementId>,
    /// module argument (name) -> declared namespace URI.
    namespaces: HashMap<String, String>,
    /// module argument (name) -> declared prefix.
    prefixes: HashMap<String, String>,
    /// module argument (name) -> raw source text, for `get-schema`
    /// (`SPEC_FULL.md` "SUPPLEMENTED FEATURES" §3).
    sources: HashMap<String, String>,
}

impl YangSpec {
    pub fn statement(&self, id: StatementId) -> &Statement {
        self.modules.get(id)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Statement> {
        self.module_ids.iter().map(|id| self.modules.get(*id))
    }

    /// Resolves a top-level data node by `(namespace-uri, local-name)`.
    pub fn find_topnode(&self, namespace: &str, local_name: &str) -> Option<StatementId> {
        self.top_index
            .get(&(namespace.to_string(), local_name.to_string()))
            .copied()
    }

    /// Resolves a top-level `rpc`/`action` by `(namespace-uri, local-name)`.
    pub fn find_rpc(&self, namespace: &str, local_name: &str) -> Option<StatementId> {
        self.rpc_index
            .get(&(namespace.to_string(), local_name.to_string()))
            .copied()
    }

    /// The namespace URI a module declares via its `namespace` statement.
    pub fn namespace_of_module(&self, module_name: &str) -> Option<&str> {
        self.namespaces.get(module_name).map(String::as_str)
    }

    /// The prefix a module declares via its `prefix` statement.
    pub fn prefix_of_module(&self, module_name: &str) -> Option<&str> {
        self.prefixes.get(module_name).map(String::as_str)
    }

    /// The raw source text of a loaded module, for `get-schema` (RFC 6022
    /// §3.1). `None` if no module by that name was loaded.
    pub fn source_text(&self, module_name: &str) -> Option<&str> {
        self.sources.get(module_name).map(String::as_str)
    }

    pub(crate) fn arena(&self) -> &statement::Arena {
        &self.modules
    }

    pub(crate) fn arena_mut(&mut self) -> &mut statement::Arena {
        &mut self.modules
    }
}
