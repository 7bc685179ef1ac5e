//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Rewrites an expression's prefixes to the canonical prefix each YANG
//! module declares for its own namespace (`spec.md` §4.D, "two
//! expressions that are equal up to prefix renaming canonicalize to the
//! same form").
//!
//! A prefix in the caller-supplied namespace context (typically from
//! repeated `-n prefix:uri` CLI arguments) is resolved to a namespace
//! URI, then replaced by whichever prefix the YANG module that declares
//! that namespace uses for itself. Unprefixed node tests are left alone:
//! in XPath 1.0 an unprefixed name test always means the null namespace,
//! never the context node's default namespace.

use std::collections::HashMap;

use netconf_xml::namespace::Nsc;
use netconf_yang::{Keyword, YangSpec};

use crate::ast::{Expr, LocationPath, NameMatch, NodeTest, Step};
use crate::error::Error;

/// Canonicalizes every prefixed node test in `expr`, returning the
/// rewritten expression and the namespace context it now depends on.
pub fn canonicalize(expr: &Expr, nsc: &Nsc, spec: &YangSpec) -> Result<(Expr, Nsc), Error> {
    let module_prefix_by_namespace = build_namespace_index(spec);
    let mut out_nsc = Nsc::new();
    let expr = canon_expr(expr, nsc, &module_prefix_by_namespace, &mut out_nsc)?;
    Ok((expr, out_nsc))
}

fn build_namespace_index(spec: &YangSpec) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for module in spec.modules() {
        if module.keyword != Keyword::Module {
            continue;
        }
        if let (Some(namespace), Some(prefix)) = (
            spec.namespace_of_module(&module.argument),
            spec.prefix_of_module(&module.argument),
        ) {
            index.insert(namespace.to_string(), prefix.to_string());
        }
    }
    index
}

fn canon_prefix(
    prefix: &str,
    nsc: &Nsc,
    by_namespace: &HashMap<String, String>,
    out_nsc: &mut Nsc,
) -> Result<String, Error> {
    let namespace = nsc
        .get(&Some(prefix.to_string()))
        .cloned()
        .ok_or_else(|| Error::NamespaceUnresolved(prefix.to_string()))?;
    let canonical = by_namespace.get(&namespace).cloned().unwrap_or_else(|| prefix.to_string());
    out_nsc
        .entry(Some(canonical.clone()))
        .or_insert_with(|| namespace.clone());
    Ok(canonical)
}

fn canon_expr(
    expr: &Expr,
    nsc: &Nsc,
    by_namespace: &HashMap<String, String>,
    out_nsc: &mut Nsc,
) -> Result<Expr, Error> {
    Ok(match expr {
        Expr::Number(n) => Expr::Number(*n),
        Expr::Literal(s) => Expr::Literal(s.clone()),
        Expr::Path(path) => Expr::Path(canon_path(path, nsc, by_namespace, out_nsc)?),
        Expr::FunctionCall(name, args) => {
            let args = args
                .iter()
                .map(|a| canon_expr(a, nsc, by_namespace, out_nsc))
                .collect::<Result<Vec<_>, _>>()?;
            Expr::FunctionCall(name.clone(), args)
        }
        Expr::Binary(op, lhs, rhs) => Expr::Binary(
            *op,
            Box::new(canon_expr(lhs, nsc, by_namespace, out_nsc)?),
            Box::new(canon_expr(rhs, nsc, by_namespace, out_nsc)?),
        ),
        Expr::Negate(inner) => Expr::Negate(Box::new(canon_expr(inner, nsc, by_namespace, out_nsc)?)),
        Expr::Union(lhs, rhs) => Expr::Union(
            Box::new(canon_expr(lhs, nsc, by_namespace, out_nsc)?),
            Box::new(canon_expr(rhs, nsc, by_namespace, out_nsc)?),
        ),
    })
}

fn canon_path(
    path: &LocationPath,
    nsc: &Nsc,
    by_namespace: &HashMap<String, String>,
    out_nsc: &mut Nsc,
) -> Result<LocationPath, Error> {
    let steps = path
        .steps
        .iter()
        .map(|step| canon_step(step, nsc, by_namespace, out_nsc))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LocationPath {
        absolute: path.absolute,
        steps,
    })
}

fn canon_step(
    step: &Step,
    nsc: &Nsc,
    by_namespace: &HashMap<String, String>,
    out_nsc: &mut Nsc,
) -> Result<Step, Error> {
    let test = match &step.test {
        NodeTest::Name {
            prefix: Some(p),
            local,
        } => NodeTest::Name {
            prefix: Some(canon_prefix(p, nsc, by_namespace, out_nsc)?),
            local: local.clone(),
        },
        other => other.clone(),
    };
    let predicates = step
        .predicates
        .iter()
        .map(|p| canon_expr(p, nsc, by_namespace, out_nsc))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Step {
        axis: step.axis,
        test,
        predicates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use netconf_yang::loader;

    const MODULES: &str = r#"
        module mod-one {
          namespace "urn:ns1";
          prefix "n1";
        }
        module mod-two {
          namespace "urn:ns2";
          prefix "n2";
        }
    "#;

    #[test]
    fn rewrites_caller_prefixes_to_module_assigned_prefixes() {
        let mut spec = YangSpec::default();
        loader::load_str(&mut spec, MODULES).unwrap();

        let mut nsc = Nsc::new();
        nsc.insert(Some("x".to_string()), "urn:ns1".to_string());
        nsc.insert(Some("y".to_string()), "urn:ns2".to_string());

        let expr = crate::parser::parse("/x:a/y:b").unwrap();
        let (canon, out_nsc) = canonicalize(&expr, &nsc, &spec).unwrap();

        match &canon {
            Expr::Path(path) => {
                let prefixes: Vec<_> = path
                    .steps
                    .iter()
                    .map(|step| match &step.test {
                        NodeTest::Name { prefix, local } => (prefix.clone(), local.clone()),
                        _ => panic!("expected name test"),
                    })
                    .collect();
                assert_eq!(
                    prefixes,
                    vec![
                        (Some("n1".to_string()), "a".to_string()),
                        (Some("n2".to_string()), "b".to_string()),
                    ]
                );
            }
            _ => panic!("expected a location path"),
        }

        assert_eq!(out_nsc.get(&Some("n1".to_string())), Some(&"urn:ns1".to_string()));
        assert_eq!(out_nsc.get(&Some("n2".to_string())), Some(&"urn:ns2".to_string()));
    }
}
