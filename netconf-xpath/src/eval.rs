//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Location-path and expression evaluation (`spec.md` §4.D).
//!
//! Step evaluation produces a nodeset; predicates are filtered
//! left-to-right, each one evaluated in a context that updates
//! `position()`/`last()`. A predicate that yields a number `n` behaves as
//! `position() = n` (`spec.md` §4.D).

use netconf_xml::document::{Document, Node};
use netconf_xml::namespace::resolve_namespace;
use netconf_xml::NodeId;

use crate::ast::{Axis, BinOp, Expr, LocationPath, NameMatch, NodeTest, Step};
use crate::context::EvalContext;
use crate::error::Error;
use crate::eval_function;
use crate::value::Value;

/// The string-value of a node: for an element, the concatenation, in
/// document order, of all descendant text; for an attribute, its value;
/// for a body (text) node, its own text. This differs from
/// [`Document::body_text`], which only concatenates an element's direct
/// `Body` children.
pub fn string_value(doc: &Document, node: NodeId) -> String {
    match doc.node(node) {
        Node::Attribute { value, .. } => value.clone(),
        Node::Body { text } => text.clone(),
        Node::Element { .. } => {
            let mut out = String::new();
            collect_text(doc, node, &mut out);
            out
        }
    }
}

fn collect_text(doc: &Document, node: NodeId, out: &mut String) {
    for child in doc.element_children(node) {
        match doc.node(child) {
            Node::Body { text } => out.push_str(text),
            Node::Element { .. } => collect_text(doc, child, out),
            Node::Attribute { .. } => {}
        }
    }
}

/// Evaluates `expr` in `ctx`, returning a [`Value`].
pub fn eval(expr: &Expr, ctx: &EvalContext) -> Result<Value, Error> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Literal(s) => Ok(Value::String(s.clone())),
        Expr::Path(path) => Ok(Value::Nodeset(eval_location_path(path, ctx)?)),
        Expr::FunctionCall(name, args) => eval_function::call(name, args, ctx),
        Expr::Negate(inner) => {
            let v = eval(inner, ctx)?;
            Ok(Value::Number(-v.to_number(ctx.doc)))
        }
        Expr::Union(lhs, rhs) => {
            let mut left = eval(lhs, ctx)?.into_nodeset()?;
            let right = eval(rhs, ctx)?.into_nodeset()?;
            for id in right {
                if !left.contains(&id) {
                    left.push(id);
                }
            }
            left.sort();
            left.dedup();
            Ok(Value::Nodeset(left))
        }
        Expr::Binary(op, lhs, rhs) => eval_binary(*op, lhs, rhs, ctx),
    }
}

impl Value {
    fn into_nodeset(self) -> Result<Vec<NodeId>, Error> {
        match self {
            Value::Nodeset(nodes) => Ok(nodes),
            other => Err(Error::Syntax {
                pos: 0,
                reason: format!("expected a nodeset, found {other:?}"),
            }),
        }
    }
}

fn eval_binary(op: BinOp, lhs: &Expr, rhs: &Expr, ctx: &EvalContext) -> Result<Value, Error> {
    match op {
        BinOp::And => {
            let l = eval(lhs, ctx)?;
            if !l.to_boolean() {
                return Ok(Value::Boolean(false));
            }
            Ok(Value::Boolean(eval(rhs, ctx)?.to_boolean()))
        }
        BinOp::Or => {
            let l = eval(lhs, ctx)?;
            if l.to_boolean() {
                return Ok(Value::Boolean(true));
            }
            Ok(Value::Boolean(eval(rhs, ctx)?.to_boolean()))
        }
        BinOp::Eq | BinOp::Ne => {
            let l = eval(lhs, ctx)?;
            let r = eval(rhs, ctx)?;
            let eq = compare_equality(&l, &r, ctx.doc);
            Ok(Value::Boolean(if op == BinOp::Eq { eq } else { !eq }))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let l = eval(lhs, ctx)?.to_number(ctx.doc);
            let r = eval(rhs, ctx)?.to_number(ctx.doc);
            // NaN comparisons are false (`spec.md` §4.D).
            let result = match op {
                BinOp::Lt => l < r,
                BinOp::Le => l <= r,
                BinOp::Gt => l > r,
                BinOp::Ge => l >= r,
                _ => unreachable!(),
            };
            Ok(Value::Boolean(result))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            let l = eval(lhs, ctx)?.to_number(ctx.doc);
            let r = eval(rhs, ctx)?.to_number(ctx.doc);
            // Division/modulo by zero follow IEEE-754 float semantics
            // (`f64` division never panics): +/-Infinity or NaN.
            let result = match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                BinOp::Mod => l % r,
                _ => unreachable!(),
            };
            Ok(Value::Number(result))
        }
    }
}

/// `=`/`!=` between a nodeset and anything compares string-values of each
/// node against the other side; between two non-nodesets it follows the
/// usual XPath 1.0 type-coercion-to-the-other-side's-type rule.
fn compare_equality(l: &Value, r: &Value, doc: &Document) -> bool {
    match (l, r) {
        (Value::Nodeset(ln), Value::Nodeset(rn)) => ln.iter().any(|a| {
            rn.iter()
                .any(|b| string_value(doc, *a) == string_value(doc, *b))
        }),
        (Value::Nodeset(nodes), other) | (other, Value::Nodeset(nodes)) => match other {
            Value::Number(n) => nodes.iter().any(|id| {
                string_value(doc, *id).trim().parse::<f64>().ok() == Some(*n)
            }),
            Value::Boolean(b) => *b == Value::Nodeset(nodes.clone()).to_boolean(),
            Value::String(s) => nodes.iter().any(|id| &string_value(doc, *id) == s),
            Value::Nodeset(_) => unreachable!(),
        },
        (Value::Boolean(_), _) | (_, Value::Boolean(_)) => l.to_boolean() == r.to_boolean(),
        (Value::Number(_), _) | (_, Value::Number(_)) => l.to_number(doc) == r.to_number(doc),
        (Value::String(a), Value::String(b)) => a == b,
    }
}

fn eval_location_path(path: &LocationPath, ctx: &EvalContext) -> Result<Vec<NodeId>, Error> {
    let mut current = if path.absolute {
        vec![root_of(ctx.doc, ctx.node)]
    } else {
        vec![ctx.node]
    };
    for step in &path.steps {
        current = eval_step(step, &current, ctx)?;
    }
    Ok(current)
}

fn root_of(doc: &Document, node: NodeId) -> NodeId {
    let mut current = node;
    while let Some(parent) = doc.parent(current) {
        current = parent;
    }
    current
}

fn eval_step(step: &Step, input: &[NodeId], ctx: &EvalContext) -> Result<Vec<NodeId>, Error> {
    let mut candidates = Vec::new();
    for &node in input {
        for candidate in axis_candidates(step.axis, node, ctx.doc) {
            if matches_test(&step.test, candidate, ctx)? {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
    }
    for predicate in &step.predicates {
        candidates = apply_predicate(predicate, candidates, ctx)?;
    }
    Ok(candidates)
}

fn axis_candidates(axis: Axis, node: NodeId, doc: &Document) -> Vec<NodeId> {
    match axis {
        Axis::Child => doc.element_children(node).collect(),
        Axis::Attribute => doc.attributes(node).collect(),
        Axis::SelfAxis => vec![node],
        Axis::Parent => doc.parent(node).into_iter().collect(),
        Axis::DescendantOrSelf => {
            let mut out = vec![node];
            collect_descendants(doc, node, &mut out);
            out
        }
    }
}

fn collect_descendants(doc: &Document, node: NodeId, out: &mut Vec<NodeId>) {
    for child in doc.element_children(node) {
        out.push(child);
        if doc.node(child).is_element() {
            collect_descendants(doc, child, out);
        }
    }
}

fn matches_test(test: &NodeTest, node: NodeId, ctx: &EvalContext) -> Result<bool, Error> {
    match test {
        NodeTest::AnyNode => Ok(true),
        NodeTest::Text => Ok(doc_is_body(ctx.doc, node)),
        NodeTest::AnyElement => Ok(doc_is_element_or_attribute(ctx.doc, node)),
        NodeTest::Name { prefix, local } => {
            if !doc_is_element_or_attribute(ctx.doc, node) {
                return Ok(false);
            }
            let local_matches = match local {
                NameMatch::Any => true,
                NameMatch::Local(name) => ctx.doc.node(node).local_name() == Some(name.as_str()),
            };
            if !local_matches {
                return Ok(false);
            }
            match prefix {
                None => Ok(true),
                Some(p) => {
                    let want_ns = ctx
                        .nsc
                        .get(&Some(p.clone()))
                        .cloned()
                        .ok_or_else(|| Error::NamespaceUnresolved(p.clone()))?;
                    Ok(resolve_namespace(ctx.doc, node) == Some(want_ns))
                }
            }
        }
    }
}

fn doc_is_body(doc: &Document, node: NodeId) -> bool {
    doc.node(node).is_body()
}

fn doc_is_element_or_attribute(doc: &Document, node: NodeId) -> bool {
    doc.node(node).is_element() || doc.node(node).is_attribute()
}

fn apply_predicate(
    predicate: &Expr,
    candidates: Vec<NodeId>,
    ctx: &EvalContext,
) -> Result<Vec<NodeId>, Error> {
    let size = candidates.len();
    let mut out = Vec::new();
    for (i, node) in candidates.iter().enumerate() {
        let step_ctx = ctx.with_node(*node, i + 1, size);
        let value = eval(predicate, &step_ctx)?;
        let keep = match value {
            Value::Number(n) => (n as usize) == i + 1 && n.fract() == 0.0,
            other => other.to_boolean(),
        };
        if keep {
            out.push(*node);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use netconf_xml::namespace::context_at;
    use netconf_xml::parser::parse as parse_xml;

    fn eval_str(xml: &str, expr: &str) -> Value {
        let (doc, root) = parse_xml(xml).unwrap();
        let nsc = context_at(&doc, root);
        let ctx = EvalContext::new(&doc, root, &nsc);
        let ast = parse(expr).unwrap();
        eval(&ast, &ctx).unwrap()
    }

    #[test]
    fn string_value_concatenates_descendant_text() {
        let (doc, root) = parse_xml("<a><b>x</b><c>y</c></a>").unwrap();
        assert_eq!(string_value(&doc, root), "xy");
    }

    #[test]
    fn absolute_path_selects_matching_children() {
        let value = eval_str("<a><b>1</b><b>2</b></a>", "/a/b");
        match value {
            Value::Nodeset(nodes) => assert_eq!(nodes.len(), 2),
            _ => panic!("expected a nodeset"),
        }
    }

    #[test]
    fn numeric_predicate_selects_position() {
        let value = eval_str("<a><b>1</b><b>2</b><b>3</b></a>", "/a/b[2]");
        match value {
            Value::Nodeset(nodes) => assert_eq!(nodes.len(), 1),
            _ => panic!("expected a nodeset"),
        }
    }

    #[test]
    fn equality_predicate_matches_key_value() {
        let xml = r#"<interfaces><interface><name>eth0</name></interface><interface><name>eth1</name></interface></interfaces>"#;
        let value = eval_str(xml, "/interfaces/interface[name='eth1']/name");
        let (doc, _) = parse_xml(xml).unwrap();
        match value {
            Value::Nodeset(nodes) => {
                assert_eq!(nodes.len(), 1);
                assert_eq!(string_value(&doc, nodes[0]), "eth1");
            }
            _ => panic!("expected a nodeset"),
        }
    }

    #[test]
    fn division_by_zero_is_infinite_not_panicking() {
        let value = eval_str("<a/>", "1 div 0");
        match value {
            Value::Number(n) => assert!(n.is_infinite()),
            _ => panic!("expected a number"),
        }
    }

    #[test]
    fn nan_comparison_is_false() {
        let value = eval_str("<a/>", "(0 div 0) < 1");
        match value {
            Value::Boolean(b) => assert!(!b),
            _ => panic!("expected a boolean"),
        }
    }
}
