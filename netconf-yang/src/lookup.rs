//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The lookup surface the core consumes, verbatim from `spec.md` §4.B.

use std::sync::Arc;

use crate::keyword::Keyword;
use crate::statement::StatementId;
use crate::typedesc::{self, TypeDesc};
use crate::YangSpec;

/// `find_child(node, keyword, argument?)` — first matching child.
pub fn find_child(
    spec: &YangSpec,
    node: StatementId,
    keyword: &Keyword,
    argument: Option<&str>,
) -> Option<StatementId> {
    spec.statement(node).children.iter().copied().find(|id| {
        let child = spec.statement(*id);
        if &child.keyword != keyword {
            return false;
        }
        match argument {
            Some(arg) => child.argument == arg,
            None => true,
        }
    })
}

/// `find_syntax(node, local-name)` — resolve a local name among
/// schema-visible children, including those reachable via `uses`/`grouping`.
///
/// `grouping` definitions live as siblings of the `uses` statement that
/// references them (searched from `node`'s parent chain is out of scope
/// for this minimal loader; groupings referenced by a bare name are looked
/// up among `node`'s own children and, failing that, among the top-level
/// siblings of the module `node` belongs to).
pub fn find_syntax(spec: &YangSpec, node: StatementId, local_name: &str) -> Option<StatementId> {
    for id in spec.statement(node).children.clone() {
        let child = spec.statement(id);
        if local_name_of(&child.argument) == local_name
            && matches!(
                child.keyword,
                Keyword::Container
                    | Keyword::List
                    | Keyword::Leaf
                    | Keyword::LeafList
                    | Keyword::Input
                    | Keyword::Output
            )
        {
            return Some(id);
        }
        if child.keyword == Keyword::Uses {
            let grouping_arg = child.argument.clone();
            if let Some(found) = resolve_through_grouping(spec, node, &grouping_arg, local_name) {
                return Some(found);
            }
        }
    }
    None
}

fn resolve_through_grouping(
    spec: &YangSpec,
    scope: StatementId,
    grouping_name: &str,
    local_name: &str,
) -> Option<StatementId> {
    let grouping_name = local_name_of(grouping_name);
    let find_in = |ids: &[StatementId]| -> Option<StatementId> {
        ids.iter().copied().find(|id| {
            let s = spec.statement(*id);
            s.keyword == Keyword::Grouping && s.argument == grouping_name
        })
    };
    let grouping = find_in(&spec.statement(scope).children)
        .or_else(|| spec.modules().find_map(|m| find_in(&m.children)))?;
    find_syntax(spec, grouping, local_name)
}

fn local_name_of(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

/// `keys_of(list-node)` — the ordered key-leaf names.
pub fn keys_of(spec: &YangSpec, list_node: StatementId) -> Vec<String> {
    match find_child(spec, list_node, &Keyword::Key, None) {
        Some(key_id) => spec
            .statement(key_id)
            .argument
            .split_whitespace()
            .map(String::from)
            .collect(),
        None => Vec::new(),
    }
}

/// `is_mandatory(leaf)`.
pub fn is_mandatory(spec: &YangSpec, leaf: StatementId) -> bool {
    match find_child(spec, leaf, &Keyword::Mandatory, None) {
        Some(id) => spec.statement(id).argument == "true",
        None => false,
    }
}

/// `type_of(leaf)` — a type descriptor able to validate a text value.
///
/// The descriptor is cached on the statement by the loader
/// (`spec.md` §3, "a leaf's type descriptor is resolved eagerly"); this
/// falls back to [`crate::typedesc::TypeDesc::Opaque`] for a leaf whose
/// `type` statement the loader never saw (e.g. a synthetic/test node).
pub fn type_of(spec: &YangSpec, leaf: StatementId) -> Arc<TypeDesc> {
    let statement = spec.statement(leaf);
    let cached = statement.typedesc.borrow().clone();
    cached.unwrap_or_else(|| Arc::new(typedesc::TypeDesc::Opaque))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;

    const YANG: &str = r#"
        module m {
          namespace "urn:m";
          prefix "m";

          grouping common {
            leaf name { type string; }
          }

          list interface {
            key "name";
            uses common;
            leaf mtu { type uint16; }
          }
        }
    "#;

    #[test]
    fn find_syntax_resolves_through_uses() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, YANG).unwrap();
        let list_id = spec.find_topnode("urn:m", "interface").unwrap();
        let name_id = find_syntax(&spec, list_id, "name").expect("resolved via uses/grouping");
        assert_eq!(spec.statement(name_id).keyword, Keyword::Leaf);
    }

    #[test]
    fn keys_of_lists_key_leaves() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, YANG).unwrap();
        let list_id = spec.find_topnode("urn:m", "interface").unwrap();
        assert_eq!(keys_of(&spec, list_id), vec!["name".to_string()]);
    }
}
