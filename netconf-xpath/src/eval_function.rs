//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The XPath 1.0 core function library this engine supports
//! (`spec.md` §4.D): `last, position, count, name, local-name,
//! namespace-uri, text, string, concat, contains, starts-with,
//! substring, string-length, not, true, false, boolean, number,
//! translate, normalize-space`.

use netconf_xml::document::Node;
use netconf_xml::namespace::resolve_namespace;
use netconf_xml::NodeId;

use crate::ast::Expr;
use crate::context::EvalContext;
use crate::error::Error;
use crate::eval::{eval, string_value};
use crate::value::Value;

pub fn call(name: &str, args: &[Expr], ctx: &EvalContext) -> Result<Value, Error> {
    match name {
        "last" => {
            check_arity(name, args, 0)?;
            Ok(Value::Number(ctx.size as f64))
        }
        "position" => {
            check_arity(name, args, 0)?;
            Ok(Value::Number(ctx.position as f64))
        }
        "count" => {
            check_arity(name, args, 1)?;
            let nodes = eval(&args[0], ctx)?;
            match nodes {
                Value::Nodeset(nodes) => Ok(Value::Number(nodes.len() as f64)),
                _ => Err(Error::Syntax {
                    pos: 0,
                    reason: "count() requires a node-set argument".to_string(),
                }),
            }
        }
        "name" => Ok(Value::String(qualified_name(args, ctx)?.unwrap_or_default())),
        "local-name" => Ok(Value::String(local_name(args, ctx)?.unwrap_or_default())),
        "namespace-uri" => Ok(Value::String(namespace_uri(args, ctx)?.unwrap_or_default())),
        "text" => {
            let node = context_or_first_node(args, ctx)?;
            Ok(Value::String(string_value(ctx.doc, node)))
        }
        "string" => {
            if args.is_empty() {
                Ok(Value::String(string_value(ctx.doc, ctx.node)))
            } else {
                check_arity(name, args, 1)?;
                Ok(Value::String(eval(&args[0], ctx)?.to_string_value(ctx.doc)))
            }
        }
        "concat" => {
            if args.len() < 2 {
                return Err(Error::ArityMismatch {
                    function: name.to_string(),
                    expected: 2,
                    found: args.len(),
                });
            }
            let mut out = String::new();
            for arg in args {
                out.push_str(&eval(arg, ctx)?.to_string_value(ctx.doc));
            }
            Ok(Value::String(out))
        }
        "contains" => {
            check_arity(name, args, 2)?;
            let haystack = eval(&args[0], ctx)?.to_string_value(ctx.doc);
            let needle = eval(&args[1], ctx)?.to_string_value(ctx.doc);
            Ok(Value::Boolean(haystack.contains(&needle)))
        }
        "starts-with" => {
            check_arity(name, args, 2)?;
            let haystack = eval(&args[0], ctx)?.to_string_value(ctx.doc);
            let prefix = eval(&args[1], ctx)?.to_string_value(ctx.doc);
            Ok(Value::Boolean(haystack.starts_with(&prefix)))
        }
        "substring" => {
            if args.len() != 2 && args.len() != 3 {
                return Err(Error::ArityMismatch {
                    function: name.to_string(),
                    expected: 2,
                    found: args.len(),
                });
            }
            let s = eval(&args[0], ctx)?.to_string_value(ctx.doc);
            let start = eval(&args[1], ctx)?.to_number(ctx.doc);
            let len = match args.get(2) {
                Some(e) => Some(eval(e, ctx)?.to_number(ctx.doc)),
                None => None,
            };
            Ok(Value::String(substring(&s, start, len)))
        }
        "string-length" => {
            let s = if args.is_empty() {
                string_value(ctx.doc, ctx.node)
            } else {
                check_arity(name, args, 1)?;
                eval(&args[0], ctx)?.to_string_value(ctx.doc)
            };
            Ok(Value::Number(s.chars().count() as f64))
        }
        "not" => {
            check_arity(name, args, 1)?;
            Ok(Value::Boolean(!eval(&args[0], ctx)?.to_boolean()))
        }
        "true" => {
            check_arity(name, args, 0)?;
            Ok(Value::Boolean(true))
        }
        "false" => {
            check_arity(name, args, 0)?;
            Ok(Value::Boolean(false))
        }
        "boolean" => {
            check_arity(name, args, 1)?;
            Ok(Value::Boolean(eval(&args[0], ctx)?.to_boolean()))
        }
        "number" => {
            if args.is_empty() {
                Ok(Value::Number(
                    Value::String(string_value(ctx.doc, ctx.node)).to_number(ctx.doc),
                ))
            } else {
                check_arity(name, args, 1)?;
                Ok(Value::Number(eval(&args[0], ctx)?.to_number(ctx.doc)))
            }
        }
        "translate" => {
            check_arity(name, args, 3)?;
            let s = eval(&args[0], ctx)?.to_string_value(ctx.doc);
            let from = eval(&args[1], ctx)?.to_string_value(ctx.doc);
            let to = eval(&args[2], ctx)?.to_string_value(ctx.doc);
            Ok(Value::String(translate(&s, &from, &to)))
        }
        "normalize-space" => {
            let s = if args.is_empty() {
                string_value(ctx.doc, ctx.node)
            } else {
                check_arity(name, args, 1)?;
                eval(&args[0], ctx)?.to_string_value(ctx.doc)
            };
            Ok(Value::String(s.split_whitespace().collect::<Vec<_>>().join(" ")))
        }
        other => Err(Error::UnknownFunction(other.to_string())),
    }
}

fn check_arity(name: &str, args: &[Expr], expected: usize) -> Result<(), Error> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::ArityMismatch {
            function: name.to_string(),
            expected,
            found: args.len(),
        })
    }
}

fn context_or_first_node(args: &[Expr], ctx: &EvalContext) -> Result<NodeId, Error> {
    if args.is_empty() {
        return Ok(ctx.node);
    }
    match eval(&args[0], ctx)? {
        Value::Nodeset(nodes) => Ok(nodes.first().copied().unwrap_or(ctx.node)),
        _ => Err(Error::Syntax {
            pos: 0,
            reason: "expected a node-set argument".to_string(),
        }),
    }
}

fn qualified_name(args: &[Expr], ctx: &EvalContext) -> Result<Option<String>, Error> {
    let node = context_or_first_node(args, ctx)?;
    let n = ctx.doc.node(node);
    Ok(match (n.prefix(), n.local_name()) {
        (Some(prefix), Some(local)) => Some(format!("{prefix}:{local}")),
        (None, Some(local)) => Some(local.to_string()),
        _ => None,
    })
}

fn local_name(args: &[Expr], ctx: &EvalContext) -> Result<Option<String>, Error> {
    let node = context_or_first_node(args, ctx)?;
    Ok(ctx.doc.node(node).local_name().map(str::to_string))
}

fn namespace_uri(args: &[Expr], ctx: &EvalContext) -> Result<Option<String>, Error> {
    let node = context_or_first_node(args, ctx)?;
    if !matches!(ctx.doc.node(node), Node::Element { .. } | Node::Attribute { .. }) {
        return Ok(None);
    }
    Ok(resolve_namespace(ctx.doc, node))
}

/// XPath 1.0 `substring`: 1-based, non-integer arguments rounded to the
/// nearest integer (`round-half-to-positive-infinity`), out-of-range
/// bounds clamped rather than erroring.
fn substring(s: &str, start: f64, len: Option<f64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    let n = chars.len() as f64;
    let start_round = round_xpath(start);
    let end_round = match len {
        Some(l) => start_round + round_xpath(l),
        None => n + 1.0,
    };
    let begin = start_round.max(1.0);
    let end = end_round.min(n + 1.0);
    if !(begin < end) || begin.is_nan() || end.is_nan() {
        return String::new();
    }
    let begin_idx = (begin - 1.0) as usize;
    let end_idx = (end - 1.0) as usize;
    chars[begin_idx.min(chars.len())..end_idx.min(chars.len())]
        .iter()
        .collect()
}

fn round_xpath(n: f64) -> f64 {
    if n.is_nan() {
        n
    } else {
        (n + 0.5).floor()
    }
}

fn translate(s: &str, from: &str, to: &str) -> String {
    let from: Vec<char> = from.chars().collect();
    let to: Vec<char> = to.chars().collect();
    s.chars()
        .filter_map(|c| match from.iter().position(|f| *f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_matches_xpath_examples() {
        assert_eq!(substring("12345", 2.0, Some(3.0)), "234");
        assert_eq!(substring("12345", 1.5, Some(2.5)), "234");
        assert_eq!(substring("12345", 0.0, Some(3.0)), "12");
        assert_eq!(substring("12345", -42.0, Some(1.0 / 0.0)), "12345");
    }

    #[test]
    fn translate_maps_characters_and_drops_unmapped_targets() {
        assert_eq!(translate("bar", "abc", "ABC"), "BAr");
        assert_eq!(translate("--aaa--", "abc-", "ABC"), "AAA");
    }
}
