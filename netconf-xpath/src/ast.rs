//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The XPath 1.0 abbreviated-syntax AST (`spec.md` §4.D).
//!
//! Module split (`ast`/`context`/`eval`/`eval_function`/`parser`/`value`)
//! follows the only native Rust XPath engine in the retrieval pack
//! (the servo `xpath` crate); nothing in the teacher codebase implements
//! XPath natively, so only that crate's layout is reused, not its code.

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Path(LocationPath),
    Number(f64),
    Literal(String),
    FunctionCall(String, Vec<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Negate(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

/// Only the axes reachable through XPath 1.0's abbreviated syntax
/// (`spec.md` §4.D): `/`, `//`, `.`, `..`, `@`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    DescendantOrSelf,
    SelfAxis,
    Parent,
    Attribute,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// `name`, `prefix:name`, or `prefix:*`.
    Name {
        prefix: Option<String>,
        local: NameMatch,
    },
    /// Bare `*`.
    AnyElement,
    /// `text()`.
    Text,
    /// `node()`.
    AnyNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NameMatch {
    Local(String),
    Any,
}
