//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Hand-written recursive-descent XML parser (`spec.md` §4.A).
//!
//! No parser-combinator dependency: the teacher embeds a C library
//! (`libyang`/`libxml2`-adjacent) for XML handling and has no native Rust
//! parser of its own to imitate structurally, so this is modeled directly
//! on clixon's `clixon_xml_io.c` scanner (hand-rolled character-at-a-time
//! state machine with explicit line/column tracking) rather than on any
//! Rust crate.

use crate::document::{Document, NodeId};
use crate::error::{ParseError, ParseErrorKind};

struct Scanner<'a> {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
    _src: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Scanner<'a> {
        Scanner {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            _src: src,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line,
            col: self.col,
            kind,
        }
    }

    fn is_name_start(c: char) -> bool {
        c.is_alphabetic() || c == '_'
    }

    fn is_name_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
    }

    /// Parses a `prefix:local` or bare `local` name.
    fn scan_name(&mut self) -> Result<(Option<String>, String), ParseError> {
        let start_line = self.line;
        let start_col = self.col;
        let mut first = String::new();
        match self.peek() {
            Some(c) if Scanner::is_name_start(c) => {
                first.push(c);
                self.bump();
            }
            Some(c) => return Err(self.err(ParseErrorKind::UnexpectedChar(c))),
            None => return Err(self.err(ParseErrorKind::UnexpectedEof)),
        }
        while matches!(self.peek(), Some(c) if Scanner::is_name_char(c)) {
            first.push(self.bump().unwrap());
        }
        if self.peek() == Some(':') {
            self.bump();
            let mut second = String::new();
            match self.peek() {
                Some(c) if Scanner::is_name_start(c) => {
                    second.push(c);
                    self.bump();
                }
                _ => {
                    return Err(ParseError {
                        line: start_line,
                        col: start_col,
                        kind: ParseErrorKind::UnexpectedChar(':'),
                    })
                }
            }
            while matches!(self.peek(), Some(c) if Scanner::is_name_char(c)) {
                second.push(self.bump().unwrap());
            }
            Ok((Some(first), second))
        } else {
            Ok((None, first))
        }
    }

    fn skip_comment(&mut self) -> Result<(), ParseError> {
        // assumes "<!--" already matched at current position
        self.skip(4);
        while !self.starts_with("-->") {
            if self.bump().is_none() {
                return Err(self.err(ParseErrorKind::UnterminatedComment));
            }
        }
        self.skip(3);
        Ok(())
    }

    fn scan_cdata(&mut self) -> Result<String, ParseError> {
        // assumes "<![CDATA[" already matched at current position
        self.skip(9);
        let mut text = String::new();
        while !self.starts_with("]]>") {
            match self.bump() {
                Some(c) => text.push(c),
                None => return Err(self.err(ParseErrorKind::UnterminatedCdata)),
            }
        }
        self.skip(3);
        Ok(text)
    }

    fn scan_quoted(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(c @ ('"' | '\'')) => c,
            Some(c) => return Err(self.err(ParseErrorKind::UnexpectedChar(c))),
            None => return Err(self.err(ParseErrorKind::UnexpectedEof)),
        };
        self.bump();
        let mut raw = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some(_) => raw.push(self.bump().unwrap()),
                None => return Err(self.err(ParseErrorKind::UnterminatedAttribute)),
            }
        }
        decode_entities(&raw).map_err(|e| self.err(e))
    }
}

fn decode_entities(raw: &str) -> Result<String, ParseErrorKind> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '&' {
            out.push(c);
            continue;
        }
        let mut entity = String::new();
        loop {
            match chars.next() {
                Some(';') => break,
                Some(c) => entity.push(c),
                None => return Err(ParseErrorKind::InvalidEntity(entity)),
            }
        }
        match entity.as_str() {
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "amp" => out.push('&'),
            "apos" => out.push('\''),
            "quot" => out.push('"'),
            _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                let code = u32::from_str_radix(&entity[2..], 16)
                    .map_err(|_| ParseErrorKind::InvalidEntity(entity.clone()))?;
                out.push(char::from_u32(code).ok_or(ParseErrorKind::InvalidEntity(entity))?);
            }
            _ if entity.starts_with('#') => {
                let code: u32 = entity[1..]
                    .parse()
                    .map_err(|_| ParseErrorKind::InvalidEntity(entity.clone()))?;
                out.push(char::from_u32(code).ok_or(ParseErrorKind::InvalidEntity(entity))?);
            }
            _ => return Err(ParseErrorKind::InvalidEntity(entity)),
        }
    }
    Ok(out)
}

/// Parses `text` into a `Document`, wrapping multiple top-level elements
/// under a synthetic `top` element (`spec.md` §4.A).
pub fn parse(text: &str) -> Result<(Document, NodeId), ParseError> {
    let mut doc = Document::new();
    let mut scanner = Scanner::new(text);
    skip_misc(&mut scanner)?;

    let mut top_level = Vec::new();
    loop {
        skip_misc(&mut scanner)?;
        if scanner.peek().is_none() {
            break;
        }
        let id = parse_element(&mut scanner, &mut doc, None)?;
        top_level.push(id);
    }

    if top_level.is_empty() {
        return Err(scanner.err(ParseErrorKind::MissingRootElement));
    }
    let root = if top_level.len() == 1 {
        top_level[0]
    } else {
        let synth = doc.new_synthetic_top("top");
        for child in &top_level {
            doc.set_parent(*child, synth);
            doc.append_child(synth, *child);
        }
        synth
    };
    doc.set_root(root);
    Ok((doc, root))
}

/// Skips whitespace, comments, and the XML declaration between sibling
/// elements.
fn skip_misc(s: &mut Scanner<'_>) -> Result<(), ParseError> {
    loop {
        s.skip_whitespace();
        if s.starts_with("<!--") {
            s.skip_comment()?;
            continue;
        }
        if s.starts_with("<?") {
            s.skip(2);
            while !s.starts_with("?>") {
                if s.bump().is_none() {
                    return Err(s.err(ParseErrorKind::UnexpectedEof));
                }
            }
            s.skip(2);
            continue;
        }
        break;
    }
    Ok(())
}

fn parse_element(
    s: &mut Scanner<'_>,
    doc: &mut Document,
    parent: Option<NodeId>,
) -> Result<NodeId, ParseError> {
    if s.peek() != Some('<') {
        return Err(s.err(match s.peek() {
            Some(c) => ParseErrorKind::UnexpectedChar(c),
            None => ParseErrorKind::UnexpectedEof,
        }));
    }
    s.bump();
    let (prefix, name) = s.scan_name()?;
    let id = doc.new_element(name.clone(), prefix.clone(), parent);

    loop {
        s.skip_whitespace();
        match s.peek() {
            Some('/') => {
                s.bump();
                if s.peek() != Some('>') {
                    return Err(s.err(ParseErrorKind::UnexpectedChar(s.peek().unwrap_or('\0'))));
                }
                s.bump();
                return Ok(id);
            }
            Some('>') => {
                s.bump();
                break;
            }
            Some(c) if Scanner::is_name_start(c) => {
                let (attr_prefix, attr_name) = s.scan_name()?;
                s.skip_whitespace();
                if s.peek() != Some('=') {
                    return Err(s.err(ParseErrorKind::UnexpectedChar(s.peek().unwrap_or('\0'))));
                }
                s.bump();
                s.skip_whitespace();
                let value = s.scan_quoted()?;
                let attr = doc.new_attribute(attr_name, attr_prefix, value, id);
                doc.append_child(id, attr);
            }
            Some(c) => return Err(s.err(ParseErrorKind::UnexpectedChar(c))),
            None => return Err(s.err(ParseErrorKind::UnexpectedEof)),
        }
    }

    parse_content(s, doc, id, &prefix, &name)?;
    Ok(id)
}

fn parse_content(
    s: &mut Scanner<'_>,
    doc: &mut Document,
    id: NodeId,
    open_prefix: &Option<String>,
    open_name: &str,
) -> Result<(), ParseError> {
    loop {
        if s.starts_with("</") {
            s.skip(2);
            let (close_prefix, close_name) = s.scan_name()?;
            s.skip_whitespace();
            if s.peek() != Some('>') {
                return Err(s.err(ParseErrorKind::UnexpectedChar(s.peek().unwrap_or('\0'))));
            }
            s.bump();
            let expected = qualified(open_prefix, open_name);
            let found = qualified(&close_prefix, &close_name);
            if expected != found {
                return Err(s.err(ParseErrorKind::MismatchedClosingTag { expected, found }));
            }
            return Ok(());
        }
        if s.starts_with("<!--") {
            s.skip_comment()?;
            continue;
        }
        if s.starts_with("<![CDATA[") {
            let text = s.scan_cdata()?;
            let body = doc.new_body(text, id);
            doc.append_child(id, body);
            continue;
        }
        if s.peek() == Some('<') {
            let child = parse_element(s, doc, Some(id))?;
            doc.append_child(id, child);
            continue;
        }
        if s.peek().is_none() {
            return Err(s.err(ParseErrorKind::UnexpectedEof));
        }
        let mut raw = String::new();
        while !matches!(s.peek(), Some('<') | None) {
            raw.push(s.bump().unwrap());
        }
        if !raw.is_empty() {
            let text = decode_entities(&raw).map_err(|e| s.err(e))?;
            let body = doc.new_body(text, id);
            doc.append_child(id, body);
        }
    }
}

fn qualified(prefix: &Option<String>, name: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_root_without_synthetic_wrapper() {
        let (doc, root) = parse("<a><b>1</b></a>").unwrap();
        match doc.node(root) {
            crate::document::Node::Element { synthetic_top, name, .. } => {
                assert!(!synthetic_top);
                assert_eq!(name, "a");
            }
            _ => panic!("expected element root"),
        }
    }

    #[test]
    fn wraps_multiple_top_level_elements() {
        let (doc, root) = parse("<a/><b/>").unwrap();
        match doc.node(root) {
            crate::document::Node::Element {
                synthetic_top,
                children,
                ..
            } => {
                assert!(*synthetic_top);
                assert_eq!(children.len(), 2);
            }
            _ => panic!("expected synthetic top element"),
        }
    }

    #[test]
    fn self_closing_equals_empty_element() {
        let (doc1, r1) = parse("<a/>").unwrap();
        let (doc2, r2) = parse("<a></a>").unwrap();
        assert_eq!(doc1.node(r1).children().len(), 0);
        assert_eq!(doc2.node(r2).children().len(), 0);
    }

    #[test]
    fn decodes_entities_in_body_and_attributes() {
        let (doc, root) = parse(r#"<a x="&quot;hi&quot;">&lt;ok&gt;</a>"#).unwrap();
        assert_eq!(doc.body_text(root), "<ok>");
        let attr = doc.attributes(root).next().unwrap();
        match doc.node(attr) {
            crate::document::Node::Attribute { value, .. } => assert_eq!(value, "\"hi\""),
            _ => panic!("expected attribute"),
        }
    }

    #[test]
    fn mismatched_closing_tag_reports_error() {
        let err = parse("<a><b></c></a>").unwrap_err();
        matches!(err.kind, ParseErrorKind::MismatchedClosingTag { .. });
    }

    #[test]
    fn reports_line_and_column_of_first_error() {
        let err = parse("<a>\n<b></c></a>").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
