//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Evaluation context threaded through `eval`: the context node,
//! `position()`/`last()`, and the namespace context (`spec.md` §4.D).

use netconf_xml::document::Document;
use netconf_xml::namespace::Nsc;
use netconf_xml::NodeId;

#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub doc: &'a Document,
    pub node: NodeId,
    pub position: usize,
    pub size: usize,
    pub nsc: &'a Nsc,
}

impl<'a> EvalContext<'a> {
    pub fn new(doc: &'a Document, node: NodeId, nsc: &'a Nsc) -> EvalContext<'a> {
        EvalContext {
            doc,
            node,
            position: 1,
            size: 1,
            nsc,
        }
    }

    pub fn with_node(&self, node: NodeId, position: usize, size: usize) -> EvalContext<'a> {
        EvalContext {
            doc: self.doc,
            node,
            position,
            size,
            nsc: self.nsc,
        }
    }
}
