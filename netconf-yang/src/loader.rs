//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! A minimal YANG statement-syntax (RFC 7950 §6.3) loader.
//!
//! Out of scope per `spec.md` §4.B ("A loader (OUT OF SCOPE) produces
//! schema trees"); this one exists only so the core has *some* way to
//! obtain a [`crate::YangSpec`] for its own tests and for `ncxpath -y`
//! (`SPEC_FULL.md` §4.B). It understands statement syntax, quoted and
//! unquoted arguments, and `//`/`/* */` comments; it does not resolve
//! `import`/`include` across files beyond making every loaded module's
//! top-level nodes visible in the same [`crate::YangSpec`].

use std::path::Path;

use crate::error::Error;
use crate::keyword::Keyword;
use crate::statement::{Arena, Statement, StatementId};
use crate::typedesc::{self, TypeDesc};
use crate::YangSpec;

#[derive(Debug, Clone)]
struct Token {
    text: String,
    quoted: bool,
    line: u32,
    col: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Punct {
    LBrace,
    RBrace,
    Semi,
}

enum Lexeme {
    Word(Token),
    Punct(Punct, u32, u32),
}

fn lex(text: &str) -> Result<Vec<Lexeme>, Error> {
    let mut out = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut line: u32 = 1;
    let mut col: u32 = 1;

    let mut advance = |i: &mut usize, line: &mut u32, col: &mut u32| {
        if chars[*i] == '\n' {
            *line += 1;
            *col = 1;
        } else {
            *col += 1;
        }
        *i += 1;
    };

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            advance(&mut i, &mut line, &mut col);
            continue;
        }
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            while i < chars.len() && chars[i] != '\n' {
                advance(&mut i, &mut line, &mut col);
            }
            continue;
        }
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '*' {
            advance(&mut i, &mut line, &mut col);
            advance(&mut i, &mut line, &mut col);
            while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                advance(&mut i, &mut line, &mut col);
            }
            if i + 1 < chars.len() {
                advance(&mut i, &mut line, &mut col);
                advance(&mut i, &mut line, &mut col);
            }
            continue;
        }
        if c == '{' {
            out.push(Lexeme::Punct(Punct::LBrace, line, col));
            advance(&mut i, &mut line, &mut col);
            continue;
        }
        if c == '}' {
            out.push(Lexeme::Punct(Punct::RBrace, line, col));
            advance(&mut i, &mut line, &mut col);
            continue;
        }
        if c == ';' {
            out.push(Lexeme::Punct(Punct::Semi, line, col));
            advance(&mut i, &mut line, &mut col);
            continue;
        }
        if c == '"' || c == '\'' {
            let quote = c;
            let start_line = line;
            let start_col = col;
            advance(&mut i, &mut line, &mut col);
            let mut s = String::new();
            while i < chars.len() && chars[i] != quote {
                if quote == '"' && chars[i] == '\\' && i + 1 < chars.len() {
                    advance(&mut i, &mut line, &mut col);
                    let escaped = chars[i];
                    s.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    advance(&mut i, &mut line, &mut col);
                } else {
                    s.push(chars[i]);
                    advance(&mut i, &mut line, &mut col);
                }
            }
            if i >= chars.len() {
                return Err(Error::Syntax {
                    line: start_line,
                    col: start_col,
                    reason: "unterminated quoted string".to_string(),
                });
            }
            advance(&mut i, &mut line, &mut col); // closing quote
            out.push(Lexeme::Word(Token {
                text: s,
                quoted: true,
                line: start_line,
                col: start_col,
            }));
            continue;
        }
        // unquoted word: runs until whitespace or a syntax character.
        let start_line = line;
        let start_col = col;
        let mut s = String::new();
        while i < chars.len()
            && !chars[i].is_whitespace()
            && !matches!(chars[i], '{' | '}' | ';')
        {
            s.push(chars[i]);
            advance(&mut i, &mut line, &mut col);
        }
        out.push(Lexeme::Word(Token {
            text: s,
            quoted: false,
            line: start_line,
            col: start_col,
        }));
    }
    Ok(out)
}

struct Parser {
    lexemes: Vec<Lexeme>,
    pos: usize,
    arena: Arena,
}

impl Parser {
    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn bump(&mut self) -> Option<Lexeme> {
        if self.pos < self.lexemes.len() {
            let l = std::mem::replace(
                &mut self.lexemes[self.pos],
                Lexeme::Punct(Punct::Semi, 0, 0),
            );
            self.pos += 1;
            Some(l)
        } else {
            None
        }
    }

    /// Parses zero or more sibling statements until EOF or a closing brace
    /// (the brace itself is left for the caller to consume).
    fn parse_statements(&mut self) -> Result<Vec<StatementId>, Error> {
        let mut ids = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(Lexeme::Punct(Punct::RBrace, ..)) => break,
                _ => ids.push(self.parse_statement()?),
            }
        }
        Ok(ids)
    }

    fn parse_statement(&mut self) -> Result<StatementId, Error> {
        let keyword_tok = match self.bump() {
            Some(Lexeme::Word(tok)) => tok,
            Some(Lexeme::Punct(_, line, col)) => {
                return Err(Error::Syntax {
                    line,
                    col,
                    reason: "expected a statement keyword".to_string(),
                })
            }
            None => {
                return Err(Error::Syntax {
                    line: 0,
                    col: 0,
                    reason: "unexpected end of input".to_string(),
                })
            }
        };
        let keyword = Keyword::parse(&keyword_tok.text);

        let argument = match self.peek() {
            Some(Lexeme::Word(_)) => {
                if let Some(Lexeme::Word(tok)) = self.bump() {
                    tok.text
                } else {
                    unreachable!()
                }
            }
            _ => String::new(),
        };

        let mut statement = Statement::new(keyword, argument);

        match self.bump() {
            Some(Lexeme::Punct(Punct::Semi, ..)) => {}
            Some(Lexeme::Punct(Punct::LBrace, ..)) => {
                let children = self.parse_statements()?;
                statement.children = children;
                match self.bump() {
                    Some(Lexeme::Punct(Punct::RBrace, ..)) => {}
                    _ => {
                        return Err(Error::Syntax {
                            line: keyword_tok.line,
                            col: keyword_tok.col,
                            reason: format!("unterminated '{}' block", keyword_tok.text),
                        })
                    }
                }
            }
            _ => {
                return Err(Error::Syntax {
                    line: keyword_tok.line,
                    col: keyword_tok.col,
                    reason: format!("expected ';' or '{{' after '{}'", keyword_tok.text),
                })
            }
        }

        Ok(self.arena.push(statement))
    }
}

/// Parses one module's text into a `Statement` tree and merges it into
/// `spec`, indexing its top-level data nodes and RPC/action operations.
pub fn load_str(spec: &mut YangSpec, text: &str) -> Result<(), Error> {
    let lexemes = lex(text)?;
    let mut parser = Parser {
        lexemes,
        pos: 0,
        arena: std::mem::take(spec.arena_mut()),
    };
    let top_ids = parser.parse_statements()?;
    *spec.arena_mut() = parser.arena;

    for id in top_ids {
        let keyword = spec.statement(id).keyword.clone();
        if !matches!(keyword, Keyword::Module | Keyword::Submodule) {
            continue;
        }
        let module_name = spec.statement(id).argument.clone();
        index_module(spec, id)?;
        spec.sources.insert(module_name, text.to_string());
    }
    Ok(())
}

fn index_module(spec: &mut YangSpec, module_id: StatementId) -> Result<(), Error> {
    let module_name = spec.statement(module_id).argument.clone();
    let children = spec.statement(module_id).children.clone();

    let mut namespace = String::new();
    let mut prefix = String::new();
    for child_id in &children {
        let child = spec.statement(*child_id);
        match child.keyword {
            Keyword::Namespace => namespace = child.argument.clone(),
            Keyword::Prefix => prefix = child.argument.clone(),
            _ => {}
        }
    }

    for child_id in &children {
        let child = spec.statement(*child_id);
        let child_keyword = child.keyword.clone();
        let child_name = child.argument.clone();
        if matches!(
            child_keyword,
            Keyword::Container | Keyword::List | Keyword::Leaf | Keyword::LeafList
        ) {
            spec.top_index
                .insert((namespace.clone(), local_name(&child_name)), *child_id);
        }
        if matches!(child_keyword, Keyword::Rpc | Keyword::Action) {
            spec.rpc_index
                .insert((namespace.clone(), local_name(&child_name)), *child_id);
        }
    }

    resolve_typedescs(spec, module_id)?;

    spec.module_ids.push(module_id);
    spec.namespaces.insert(module_name.clone(), namespace);
    spec.prefixes.insert(module_name, prefix);
    Ok(())
}

fn local_name(name: &str) -> String {
    match name.split_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.to_string(),
    }
}

/// Eagerly resolves the `TypeDesc` of every `leaf`/`leaf-list` beneath
/// `root`, matching `spec.md` §3's "a leaf's type descriptor is resolved
/// eagerly".
fn resolve_typedescs(spec: &mut YangSpec, root: StatementId) -> Result<(), Error> {
    let children = spec.statement(root).children.clone();
    let keyword = spec.statement(root).keyword.clone();
    if matches!(keyword, Keyword::Leaf | Keyword::LeafList) {
        if let Some(type_id) = find_child_id(spec, root, &Keyword::Type) {
            let desc = build_typedesc(spec, type_id)?;
            *spec.statement(root).typedesc.borrow_mut() = Some(std::sync::Arc::new(desc));
        }
    }
    for child in children {
        resolve_typedescs(spec, child)?;
    }
    Ok(())
}

fn find_child_id(spec: &YangSpec, parent: StatementId, keyword: &Keyword) -> Option<StatementId> {
    spec.statement(parent)
        .children
        .iter()
        .copied()
        .find(|id| &spec.statement(*id).keyword == keyword)
}

fn build_typedesc(spec: &YangSpec, type_id: StatementId) -> Result<TypeDesc, Error> {
    let type_stmt = spec.statement(type_id);
    let name = type_stmt.argument.clone();

    if name == "union" {
        let mut alts = Vec::new();
        for child_id in &type_stmt.children {
            if spec.statement(*child_id).keyword == Keyword::Type {
                alts.push(std::sync::Arc::new(build_typedesc(spec, *child_id)?));
            }
        }
        return Ok(TypeDesc::Union(alts));
    }

    if name == "enumeration" {
        let values: Vec<String> = type_stmt
            .children
            .iter()
            .filter(|id| spec.statement(**id).keyword == Keyword::Enum)
            .map(|id| spec.statement(*id).argument.clone())
            .collect();
        return Ok(TypeDesc::Enumeration(values));
    }

    let mut desc = typedesc::builtin(&name);

    if let Some(range_id) = find_child_id(spec, type_id, &Keyword::Range) {
        let arg = spec.statement(range_id).argument.clone();
        let ranges = typedesc::parse_ranges(&arg).map_err(|e| Error::Syntax {
            line: 0,
            col: 0,
            reason: e.reason,
        })?;
        desc = TypeDesc::Integer { range: ranges };
    }

    if let Some(length_id) = find_child_id(spec, type_id, &Keyword::Length) {
        let arg = spec.statement(length_id).argument.clone();
        let ranges = typedesc::parse_ranges(&arg).map_err(|e| Error::Syntax {
            line: 0,
            col: 0,
            reason: e.reason,
        })?;
        if let TypeDesc::String { pattern, .. } = desc {
            desc = TypeDesc::String {
                length: ranges,
                pattern,
            };
        } else {
            desc = TypeDesc::String {
                length: ranges,
                pattern: None,
            };
        }
    }

    if let Some(pattern_id) = find_child_id(spec, type_id, &Keyword::Pattern) {
        let arg = spec.statement(pattern_id).argument.clone();
        let re = regex::Regex::new(&format!("^(?:{arg})$")).map_err(|e| Error::Syntax {
            line: 0,
            col: 0,
            reason: e.to_string(),
        })?;
        if let TypeDesc::String { length, .. } = desc {
            desc = TypeDesc::String {
                length,
                pattern: Some(re),
            };
        } else {
            desc = TypeDesc::String {
                length: Vec::new(),
                pattern: Some(re),
            };
        }
    }

    Ok(desc)
}

/// Loads every `*.yang` file in `dir` into a fresh [`YangSpec`].
pub fn load_dir(dir: impl AsRef<Path>) -> Result<YangSpec, Error> {
    let dir = dir.as_ref();
    let mut spec = YangSpec::default();
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::Io(dir.display().to_string(), e))?;
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("yang"))
        .collect();
    paths.sort();
    for path in paths {
        let text =
            std::fs::read_to_string(&path).map_err(|e| Error::Io(path.display().to_string(), e))?;
        load_str(&mut spec, &text)?;
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERFACES_YANG: &str = r#"
        module test-interfaces {
          namespace "urn:test:interfaces";
          prefix "if";

          container interfaces {
            list interface {
              key "name";
              leaf name {
                type string;
              }
              leaf mtu {
                type uint16;
              }
            }
          }

          rpc reboot {
            input {
              leaf delay {
                type uint32;
              }
            }
          }
        }
    "#;

    #[test]
    fn loads_module_and_indexes_top_node() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, INTERFACES_YANG).unwrap();
        let top_id = spec
            .find_topnode("urn:test:interfaces", "interfaces")
            .expect("top node indexed");
        assert_eq!(spec.statement(top_id).keyword, Keyword::Container);
        assert_eq!(
            spec.namespace_of_module("test-interfaces"),
            Some("urn:test:interfaces")
        );
    }

    #[test]
    fn source_text_recorded_for_get_schema() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, INTERFACES_YANG).unwrap();
        assert_eq!(spec.source_text("test-interfaces"), Some(INTERFACES_YANG));
        assert_eq!(spec.source_text("no-such-module"), None);
    }

    #[test]
    fn indexes_rpc() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, INTERFACES_YANG).unwrap();
        assert!(spec.find_rpc("urn:test:interfaces", "reboot").is_some());
    }

    #[test]
    fn leaf_typedesc_resolved_eagerly() {
        let mut spec = YangSpec::default();
        load_str(&mut spec, INTERFACES_YANG).unwrap();
        let top_id = spec
            .find_topnode("urn:test:interfaces", "interfaces")
            .unwrap();
        let list_id = spec.statement(top_id).children[0];
        let list = spec.statement(list_id);
        assert_eq!(list.keyword, Keyword::List);
        let mtu_id = list.children[2];
        let mtu = spec.statement(mtu_id);
        assert!(mtu.typedesc.borrow().is_some());
    }

    #[test]
    fn syntax_error_reports_line() {
        let mut spec = YangSpec::default();
        let err = load_str(&mut spec, "module m { namespace \"x\" ").unwrap_err();
        matches!(err, Error::Syntax { .. });
    }
}
