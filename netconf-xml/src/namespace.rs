//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Namespace resolution by walking ancestors for `xmlns[:prefix]`
//! attributes (`spec.md` §3, invariant (iv)) and the namespace context
//! (nsc) used by XPath canonicalization.

use std::collections::HashMap;

use crate::document::{Document, Node, NodeId};

/// A mapping from optional prefix (`None` = default namespace) to URI
/// (`spec.md` §3, "Namespace context (nsc)").
pub type Nsc = HashMap<Option<String>, String>;

/// Resolves `node`'s own namespace URI by walking ancestors (including
/// itself) looking for a matching `xmlns`/`xmlns:prefix` attribute.
pub fn resolve_namespace(doc: &Document, node: NodeId) -> Option<String> {
    let prefix = doc.node(node).prefix().map(str::to_string);
    resolve_prefix(doc, node, prefix.as_deref())
}

/// Resolves `prefix` (`None` = default namespace) starting the ancestor
/// walk at `node`.
pub fn resolve_prefix(doc: &Document, node: NodeId, prefix: Option<&str>) -> Option<String> {
    let mut current = Some(node);
    while let Some(id) = current {
        if doc.node(id).is_element() {
            for attr_id in doc.attributes(id) {
                if let Node::Attribute {
                    name,
                    prefix: attr_prefix,
                    value,
                } = doc.node(attr_id)
                {
                    let declares = match (attr_prefix.as_deref(), prefix) {
                        (None, None) => name == "xmlns",
                        (Some("xmlns"), Some(p)) => name == p,
                        _ => false,
                    };
                    if declares {
                        return Some(value.clone());
                    }
                }
            }
        }
        current = doc.parent(id);
    }
    None
}

/// Builds the full namespace context visible at `node` by walking every
/// ancestor's `xmlns` declarations, closest scope winning.
pub fn context_at(doc: &Document, node: NodeId) -> Nsc {
    let mut nsc = Nsc::new();
    let mut current = Some(node);
    while let Some(id) = current {
        if doc.node(id).is_element() {
            for attr_id in doc.attributes(id) {
                if let Node::Attribute {
                    name,
                    prefix: attr_prefix,
                    value,
                } = doc.node(attr_id)
                {
                    match attr_prefix.as_deref() {
                        None if name == "xmlns" => {
                            nsc.entry(None).or_insert_with(|| value.clone());
                        }
                        Some("xmlns") => {
                            nsc.entry(Some(name.clone())).or_insert_with(|| value.clone());
                        }
                        _ => {}
                    }
                }
            }
        }
        current = doc.parent(id);
    }
    nsc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn resolves_default_namespace_from_ancestor() {
        let (doc, root) = parse(r#"<a xmlns="urn:test"><b/></a>"#).unwrap();
        let b = doc.find_element_child(root, "b").unwrap();
        assert_eq!(resolve_namespace(&doc, b), Some("urn:test".to_string()));
    }

    #[test]
    fn resolves_prefixed_namespace() {
        let (doc, root) = parse(r#"<x:a xmlns:x="urn:test"><x:b/></x:a>"#).unwrap();
        let b = doc.find_element_child(root, "b").unwrap();
        assert_eq!(resolve_namespace(&doc, b), Some("urn:test".to_string()));
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let (doc, root) = parse(r#"<a xmlns="urn:outer"><b xmlns="urn:inner"/></a>"#).unwrap();
        let b = doc.find_element_child(root, "b").unwrap();
        assert_eq!(resolve_namespace(&doc, b), Some("urn:inner".to_string()));
    }
}
