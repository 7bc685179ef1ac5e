//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Character-data encoder and the two pretty-printers (`spec.md` §4.A).
//!
//! Both sinks named in the spec — "stream-to-file-descriptor" and
//! "append-to-growable-buffer" — are the same code path here: any
//! `std::io::Write` works, and a `Vec<u8>` is itself a growable buffer
//! that implements `Write`, so a single generic `write_node` serves both.

use std::io::{self, Write};

use crate::document::{Document, Node, NodeId};

/// `depth = -1` means unbounded, `0` suppresses the node, `1` emits the
/// node but not its descendants (`spec.md` §4.A).
pub const DEPTH_UNBOUNDED: i32 = -1;

const INDENT: &str = "   ";

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serializes `id` (and, if `pretty`, indents its descendants) to `w`.
pub fn write_node<W: Write>(
    w: &mut W,
    doc: &Document,
    id: NodeId,
    depth: i32,
    pretty: bool,
) -> io::Result<()> {
    write_node_at(w, doc, id, depth, pretty, 0)
}

/// Serializes `id` into an in-memory buffer; the "append-to-growable-
/// buffer" sink of `spec.md` §4.A.
pub fn to_string(doc: &Document, id: NodeId, depth: i32, pretty: bool) -> String {
    let mut buf = Vec::new();
    write_node(&mut buf, doc, id, depth, pretty)
        .expect("writing to an in-memory Vec<u8> never fails");
    String::from_utf8(buf).expect("encoder only emits valid UTF-8")
}

fn write_node_at<W: Write>(
    w: &mut W,
    doc: &Document,
    id: NodeId,
    depth: i32,
    pretty: bool,
    level: usize,
) -> io::Result<()> {
    if depth == 0 {
        return Ok(());
    }
    let next_depth = if depth < 0 { DEPTH_UNBOUNDED } else { depth - 1 };

    match doc.node(id) {
        Node::Element { name, prefix, .. } => {
            write!(w, "<")?;
            write_qname(w, prefix.as_deref(), name)?;
            for attr_id in doc.attributes(id) {
                if let Node::Attribute {
                    name, prefix, value, ..
                } = doc.node(attr_id)
                {
                    write!(w, " ")?;
                    write_qname(w, prefix.as_deref(), name)?;
                    write!(w, "=\"{}\"", escape_attr(value))?;
                }
            }

            let element_children: Vec<NodeId> = doc.element_children(id).collect();
            let has_body_or_children = !element_children.is_empty();
            if !has_body_or_children || next_depth == 0 {
                write!(w, "/>")?;
                return Ok(());
            }
            write!(w, ">")?;

            let has_element_child = element_children
                .iter()
                .any(|c| matches!(doc.node(*c), Node::Element { .. }));

            for child in &element_children {
                match doc.node(*child) {
                    Node::Body { text } => {
                        write!(w, "{}", escape_text(text))?;
                    }
                    Node::Element { .. } => {
                        if pretty {
                            write!(w, "\n{}", INDENT.repeat(level + 1))?;
                        }
                        write_node_at(w, doc, *child, next_depth, pretty, level + 1)?;
                    }
                    Node::Attribute { .. } => unreachable!("filtered out by element_children"),
                }
            }

            if pretty && has_element_child {
                write!(w, "\n{}", INDENT.repeat(level))?;
            }
            write!(w, "</")?;
            write_qname(w, prefix.as_deref(), name)?;
            write!(w, ">")?;
            Ok(())
        }
        Node::Attribute { .. } => Ok(()),
        Node::Body { text } => write!(w, "{}", escape_text(text)),
    }
}

fn write_qname<W: Write>(w: &mut W, prefix: Option<&str>, name: &str) -> io::Result<()> {
    match prefix {
        Some(p) => write!(w, "{p}:{name}"),
        None => write!(w, "{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn empty_element_is_self_closed() {
        let (doc, root) = parse("<a></a>").unwrap();
        assert_eq!(to_string(&doc, root, DEPTH_UNBOUNDED, false), "<a/>");
    }

    #[test]
    fn pretty_print_indents_element_siblings_only() {
        let (doc, root) = parse("<a><b>1</b><c/></a>").unwrap();
        let out = to_string(&doc, root, DEPTH_UNBOUNDED, true);
        assert_eq!(out, "<a>\n   <b>1</b>\n   <c/>\n</a>");
    }

    #[test]
    fn depth_one_suppresses_descendants() {
        let (doc, root) = parse("<a><b><c/></b></a>").unwrap();
        assert_eq!(to_string(&doc, root, 1, false), "<a/>");
    }

    #[test]
    fn depth_zero_suppresses_node() {
        let (doc, root) = parse("<a><b/></a>").unwrap();
        assert_eq!(to_string(&doc, root, 0, false), "");
    }

    #[test]
    fn escapes_reserved_characters() {
        let (doc, root) = parse(r#"<a x="&quot;&amp;&quot;">&lt;&amp;&gt;</a>"#).unwrap();
        let out = to_string(&doc, root, DEPTH_UNBOUNDED, false);
        assert_eq!(out, r#"<a x="&quot;&amp;&quot;">&lt;&amp;&gt;</a>"#);
    }
}
