//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Structural diff between two bound XML trees, using YANG list keys as
//! identity (`spec.md` §4.E).
//!
//! Grounded on clixon's `xml_diff1`: two independent walks, one rooted at
//! each tree, each looking up its peer in the other tree by the identity
//! rule for the bound schema kind. Two-pass rather than one symmetric
//! walk because `first`/`second`/`changed` preserve first-encounter order
//! within their own source tree, which a single merged walk cannot give
//! both sides at once.

use std::collections::HashSet;

use netconf_xml::document::Document;
use netconf_xml::NodeId;
use netconf_yang::keyword::Keyword;
use netconf_yang::{lookup, StatementId, YangSpec};

/// The three output vectors of [`diff`] (`spec.md` §4.E).
#[derive(Debug, Default)]
pub struct DiffResult {
    /// Elements present only in the first tree.
    pub first: Vec<NodeId>,
    /// Elements present only in the second tree.
    pub second: Vec<NodeId>,
    /// Paired leaves/leaf-lists present in both trees whose body text
    /// differs: `(node in first tree, node in second tree)`.
    pub changed: Vec<(NodeId, NodeId)>,
}

/// Diffs `t1` (rooted at `root1`) against `t2` (rooted at `root2`).
pub fn diff(
    doc1: &Document,
    root1: NodeId,
    doc2: &Document,
    root2: NodeId,
    spec: &YangSpec,
) -> DiffResult {
    let mut result = DiffResult::default();
    walk_first(doc1, root1, doc2, root2, spec, &mut result);
    walk_second(doc1, root1, doc2, root2, spec, &mut result);
    result
}

fn walk_first(
    doc1: &Document,
    node1: NodeId,
    doc2: &Document,
    node2: NodeId,
    spec: &YangSpec,
    result: &mut DiffResult,
) {
    let mut consumed = HashSet::new();
    for child1 in doc1.element_children(node1) {
        match find_peer(doc1, child1, doc2, node2, spec, &consumed) {
            Some(peer) => {
                consumed.insert(peer);
                match bound_keyword(doc1, child1, spec) {
                    Some(Keyword::Leaf) | Some(Keyword::LeafList) => {
                        if doc1.body_text(child1) != doc2.body_text(peer) {
                            result.changed.push((child1, peer));
                        }
                    }
                    _ => walk_first(doc1, child1, doc2, peer, spec, result),
                }
            }
            None => result.first.push(child1),
        }
    }
}

fn walk_second(
    doc1: &Document,
    node1: NodeId,
    doc2: &Document,
    node2: NodeId,
    spec: &YangSpec,
    result: &mut DiffResult,
) {
    let mut consumed = HashSet::new();
    for child2 in doc2.element_children(node2) {
        match find_peer(doc2, child2, doc1, node1, spec, &consumed) {
            Some(peer) => {
                consumed.insert(peer);
                if !matches!(bound_keyword(doc2, child2, spec), Some(Keyword::Leaf) | Some(Keyword::LeafList)) {
                    walk_second(doc1, peer, doc2, child2, spec, result);
                }
            }
            None => result.second.push(child2),
        }
    }
}

fn bound_keyword(doc: &Document, node: NodeId, spec: &YangSpec) -> Option<Keyword> {
    doc.binding(node).map(|id| spec.statement(id).keyword.clone())
}

/// Finds `node`'s peer among `candidate_parent`'s (unconsumed) children in
/// the other document, per the identity rule for `node`'s bound kind
/// (`spec.md` §4.E):
/// - `LEAF`/`CONTAINER`: local-name equality.
/// - `LIST`: local-name plus equal key-tuple values.
/// - `LEAF-LIST`: identical body text.
fn find_peer(
    doc: &Document,
    node: NodeId,
    other_doc: &Document,
    candidate_parent: NodeId,
    spec: &YangSpec,
    consumed: &HashSet<NodeId>,
) -> Option<NodeId> {
    let local_name = doc.node(node).local_name()?;
    let keyword = bound_keyword(doc, node, spec);
    let list_schema = match keyword {
        Some(Keyword::List) => doc.binding(node),
        _ => None,
    };
    let this_key = list_schema.map(|schema| key_tuple(doc, spec, schema, node));

    for candidate in other_doc.element_children(candidate_parent) {
        if consumed.contains(&candidate) {
            continue;
        }
        if other_doc.node(candidate).local_name() != Some(local_name) {
            continue;
        }
        match keyword {
            Some(Keyword::List) => {
                if let Some(schema) = list_schema {
                    if key_tuple(other_doc, spec, schema, candidate) == *this_key.as_ref().unwrap()
                    {
                        return Some(candidate);
                    }
                }
            }
            Some(Keyword::LeafList) => {
                if doc.body_text(node) == other_doc.body_text(candidate) {
                    return Some(candidate);
                }
            }
            _ => return Some(candidate),
        }
    }
    None
}

fn key_tuple(doc: &Document, spec: &YangSpec, list_schema: StatementId, entry: NodeId) -> Vec<String> {
    lookup::keys_of(spec, list_schema)
        .iter()
        .map(|key_name| match doc.find_element_child(entry, key_name) {
            Some(leaf) => doc.body_text(leaf),
            None => String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use netconf_xml::bind::{bind, BindMode, BindOptions};
    use netconf_xml::parser::parse;
    use netconf_yang::loader::load_str;

    const YANG: &str = r#"
        module test {
          namespace "urn:test";
          prefix "t";

          container top {
            leaf a { type string; }
            leaf b { type string; }
            leaf c { type string; }
            leaf-list tag { type string; }
            list interface {
              key "name";
              leaf name { type string; }
              leaf mtu { type uint16; }
            }
          }
        }
    "#;

    fn bind_all(doc: &Document, node: NodeId, spec: &YangSpec) {
        if doc.binding(node).is_some() {
            bind(doc, node, spec, BindMode::Parent, BindOptions::default());
        }
        for child in doc.element_children(node) {
            bind_all(doc, child, spec);
        }
    }

    fn parse_and_bind(xml: &str, spec: &YangSpec) -> (Document, NodeId) {
        let (doc, root) = parse(xml).unwrap();
        bind(&doc, root, spec, BindMode::Top, BindOptions::default());
        bind_all(&doc, root, spec);
        (doc, root)
    }

    #[test]
    fn added_changed_and_removed_are_detected() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, YANG).unwrap();
        let (doc1, root1) = parse_and_bind(
            r#"<top xmlns="urn:test"><a>1</a><b>2</b></top>"#,
            &spec,
        );
        let (doc2, root2) = parse_and_bind(
            r#"<top xmlns="urn:test"><a>1</a><b>3</b><c>4</c></top>"#,
            &spec,
        );

        let result = diff(&doc1, root1, &doc2, root2, &spec);
        assert!(result.first.is_empty());
        assert_eq!(result.second.len(), 1);
        assert_eq!(doc2.node(result.second[0]).local_name(), Some("c"));
        assert_eq!(result.changed.len(), 1);
        let (c1, c2) = result.changed[0];
        assert_eq!(doc1.body_text(c1), "2");
        assert_eq!(doc2.body_text(c2), "3");
    }

    #[test]
    fn list_entries_matched_by_key_not_position() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, YANG).unwrap();
        let (doc1, root1) = parse_and_bind(
            r#"<top xmlns="urn:test">
                 <interface><name>eth0</name><mtu>1500</mtu></interface>
                 <interface><name>eth1</name><mtu>1400</mtu></interface>
               </top>"#,
            &spec,
        );
        let (doc2, root2) = parse_and_bind(
            r#"<top xmlns="urn:test">
                 <interface><name>eth1</name><mtu>1400</mtu></interface>
                 <interface><name>eth0</name><mtu>9000</mtu></interface>
               </top>"#,
            &spec,
        );

        let result = diff(&doc1, root1, &doc2, root2, &spec);
        assert!(result.first.is_empty());
        assert!(result.second.is_empty());
        assert_eq!(result.changed.len(), 1);
        let (c1, _c2) = result.changed[0];
        assert_eq!(doc1.body_text(c1), "1500");
    }

    #[test]
    fn duplicate_leaf_list_values_are_not_collapsed() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, YANG).unwrap();
        let (doc1, root1) = parse_and_bind(
            r#"<top xmlns="urn:test"><tag>x</tag><tag>x</tag></top>"#,
            &spec,
        );
        let (doc2, root2) = parse_and_bind(r#"<top xmlns="urn:test"><tag>x</tag></top>"#, &spec);

        let result = diff(&doc1, root1, &doc2, root2, &spec);
        assert_eq!(result.first.len(), 1);
        assert!(result.second.is_empty());
        assert!(result.changed.is_empty());
    }
}
