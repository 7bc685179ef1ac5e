//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! A curly-brace diagnostic renderer, supplementing the two XML
//! pretty-printers named in `spec.md` §4.A.
//!
//! Grounded on clixon's `clixon_xml_map.c::xml2txt`, which renders the
//! same tree as `name value { children }` for human-readable debug dumps
//! rather than as wire XML. Used only by `Debug`/`tracing` output, never
//! serialized onto the wire.

use crate::document::{Document, Node, NodeId};

const INDENT: &str = "  ";

/// Renders `id` and its subtree in the `name value { children }` debug
/// form.
pub fn to_debug_text(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, 0, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, level: usize, out: &mut String) {
    let indent = INDENT.repeat(level);
    match doc.node(id) {
        Node::Element { name, prefix, .. } => {
            out.push_str(&indent);
            match prefix {
                Some(p) => out.push_str(&format!("{p}:{name}")),
                None => out.push_str(name),
            }

            let body = doc.body_text(id);
            let element_children: Vec<NodeId> = doc
                .element_children(id)
                .filter(|c| !matches!(doc.node(*c), Node::Body { .. }))
                .collect();

            if !body.trim().is_empty() {
                out.push(' ');
                out.push_str(body.trim());
            }

            for attr in doc.attributes(id) {
                if let Node::Attribute { name, value, .. } = doc.node(attr) {
                    out.push(' ');
                    out.push_str(name);
                    out.push('=');
                    out.push_str(value);
                }
            }

            if element_children.is_empty() {
                out.push('\n');
                return;
            }
            out.push_str(" {\n");
            for child in element_children {
                write_node(doc, child, level + 1, out);
            }
            out.push_str(&indent);
            out.push_str("}\n");
        }
        Node::Body { text } => {
            if !text.trim().is_empty() {
                out.push_str(&indent);
                out.push_str(text.trim());
                out.push('\n');
            }
        }
        Node::Attribute { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn renders_nested_elements_as_braces() {
        let (doc, root) = parse("<a><b>1</b><c/></a>").unwrap();
        let out = to_debug_text(&doc, root);
        assert!(out.starts_with("a {\n"));
        assert!(out.contains("b 1\n"));
        assert!(out.contains("c\n"));
    }
}
