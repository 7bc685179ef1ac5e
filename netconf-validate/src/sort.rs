//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Key-aware, schema-position-aware child reordering (`spec.md` §4.C,
//! "Mandatory ordering").
//!
//! Reordering is identity-preserving: children are never reallocated,
//! only the parent's child-id list is permuted (`spec.md` §4.E, "Sort...
//! Uses identity-preserving reshuffling (no node allocation)").

use std::cmp::Ordering;

use netconf_xml::document::Document;
use netconf_xml::NodeId;
use netconf_yang::keyword::Keyword;
use netconf_yang::typedesc::Value;
use netconf_yang::{lookup, StatementId, YangSpec};

/// Recursively reorders every element's children beneath (and including)
/// `root` to match `spec`. Idempotent: sorting an already-sorted tree is a
/// no-op (`spec.md` §8, invariant 2).
pub fn sort(doc: &mut Document, root: NodeId, spec: &YangSpec) {
    let elems: Vec<NodeId> = doc.element_children(root).collect();
    for child in &elems {
        sort(doc, *child, spec);
    }
    sort_own_children(doc, root, spec);
}

fn sort_own_children(doc: &mut Document, node: NodeId, spec: &YangSpec) {
    let parent_schema = doc.binding(node);
    let attrs: Vec<NodeId> = doc.attributes(node).collect();
    let mut elems: Vec<NodeId> = doc.element_children(node).collect();

    elems.sort_by(|a, b| compare(doc, spec, parent_schema, *a, *b));

    let mut new_children = attrs;
    new_children.extend(elems);
    doc.set_children(node, new_children);
}

fn compare(
    doc: &Document,
    spec: &YangSpec,
    parent_schema: Option<StatementId>,
    a: NodeId,
    b: NodeId,
) -> Ordering {
    let pos_a = schema_position(doc, spec, parent_schema, a);
    let pos_b = schema_position(doc, spec, parent_schema, b);
    let primary = pos_a.cmp(&pos_b);
    if primary != Ordering::Equal {
        return primary;
    }

    let schema_a = doc.binding(a);
    match schema_a.map(|id| spec.statement(id).keyword.clone()) {
        Some(Keyword::List) => {
            let schema_id = schema_a.unwrap();
            key_tuple(doc, spec, schema_id, a).cmp_collate(&key_tuple(doc, spec, schema_id, b))
        }
        Some(Keyword::LeafList) => {
            let schema_id = schema_a.unwrap();
            let va = lookup::type_of(spec, schema_id)
                .validate(&doc.body_text(a))
                .unwrap_or_else(|_| Value::String(doc.body_text(a)));
            let vb = lookup::type_of(spec, schema_id)
                .validate(&doc.body_text(b))
                .unwrap_or_else(|_| Value::String(doc.body_text(b)));
            va.collate(&vb)
        }
        _ => Ordering::Equal,
    }
}

/// The index of `child`'s bound schema node among `parent_schema`'s
/// children, i.e. its declared position. Unbound children sort last,
/// after every declared child, preserving their relative input order
/// (the enclosing `sort_by` is stable).
fn schema_position(
    doc: &Document,
    spec: &YangSpec,
    parent_schema: Option<StatementId>,
    child: NodeId,
) -> usize {
    let (parent_schema, child_schema) = match (parent_schema, doc.binding(child)) {
        (Some(p), Some(c)) => (p, c),
        _ => return usize::MAX,
    };
    spec.statement(parent_schema)
        .children
        .iter()
        .position(|id| *id == child_schema)
        .unwrap_or(usize::MAX)
}

struct KeyTuple(Vec<Value>);

impl KeyTuple {
    fn cmp_collate(&self, other: &KeyTuple) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let ord = a.collate(b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

fn key_tuple(doc: &Document, spec: &YangSpec, list_schema: StatementId, entry: NodeId) -> KeyTuple {
    let mut values = Vec::new();
    for key_name in lookup::keys_of(spec, list_schema) {
        let value = match doc.find_element_child(entry, &key_name) {
            Some(leaf) => {
                let leaf_schema = doc.binding(leaf);
                match leaf_schema {
                    Some(id) => lookup::type_of(spec, id)
                        .validate(&doc.body_text(leaf))
                        .unwrap_or_else(|_| Value::String(doc.body_text(leaf))),
                    None => Value::String(doc.body_text(leaf)),
                }
            }
            None => Value::String(String::new()),
        };
        values.push(value);
    }
    KeyTuple(values)
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

          container interfaces {
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

    #[test]
    fn list_entries_sorted_by_key() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, YANG).unwrap();
        let (mut doc, root) = parse(
            r#"<interfaces xmlns="urn:test">
                 <interface><name>eth1</name><mtu>1500</mtu></interface>
                 <interface><name>eth0</name><mtu>1500</mtu></interface>
               </interfaces>"#,
        )
        .unwrap();
        bind(&doc, root, &spec, BindMode::Top, BindOptions::default());
        bind_all(&doc, root, &spec);

        sort(&mut doc, root, &spec);

        let entries: Vec<NodeId> = doc.element_children(root).collect();
        let names: Vec<String> = entries
            .iter()
            .map(|e| doc.body_text(doc.find_element_child(*e, "name").unwrap()))
            .collect();
        assert_eq!(names, vec!["eth0".to_string(), "eth1".to_string()]);
    }

    #[test]
    fn sort_is_idempotent() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, YANG).unwrap();
        let (mut doc, root) = parse(
            r#"<interfaces xmlns="urn:test">
                 <interface><name>eth1</name><mtu>1500</mtu></interface>
                 <interface><name>eth0</name><mtu>1500</mtu></interface>
               </interfaces>"#,
        )
        .unwrap();
        bind(&doc, root, &spec, BindMode::Top, BindOptions::default());
        bind_all(&doc, root, &spec);

        sort(&mut doc, root, &spec);
        let once = netconf_xml::encode::to_string(&doc, root, netconf_xml::encode::DEPTH_UNBOUNDED, false);
        sort(&mut doc, root, &spec);
        let twice = netconf_xml::encode::to_string(&doc, root, netconf_xml::encode::DEPTH_UNBOUNDED, false);
        assert_eq!(once, twice);
    }
}
