//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

/// The first parse error encountered, with its position (`spec.md` §4.A,
/// "the parser reports the first error with line and column").
#[derive(Debug, Clone)]
pub struct ParseError {
    pub line: u32,
    pub col: u32,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone)]
pub enum ParseErrorKind {
    UnexpectedEof,
    UnexpectedChar(char),
    MismatchedClosingTag { expected: String, found: String },
    UnterminatedAttribute,
    UnterminatedCdata,
    UnterminatedComment,
    InvalidEntity(String),
    MissingRootElement,
}

impl ParseError {
    pub fn log(&self) {
        warn!(line = self.line, col = self.col, "{}", self);
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: ", self.line, self.col)?;
        match &self.kind {
            ParseErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            ParseErrorKind::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
            ParseErrorKind::MismatchedClosingTag { expected, found } => {
                write!(f, "expected closing tag '</{expected}>', found '</{found}>'")
            }
            ParseErrorKind::UnterminatedAttribute => write!(f, "unterminated attribute value"),
            ParseErrorKind::UnterminatedCdata => write!(f, "unterminated CDATA section"),
            ParseErrorKind::UnterminatedComment => write!(f, "unterminated comment"),
            ParseErrorKind::InvalidEntity(e) => write!(f, "invalid entity reference '&{e};'"),
            ParseErrorKind::MissingRootElement => write!(f, "document has no root element"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Bind-time / encode-time errors, distinct from [`ParseError`] because a
/// binding failure does not fail the parse (`spec.md` §4.A, "Binding
/// failure does not fail the parse").
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    UnknownOperation(String),
    UnknownElement(String),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::Parse(e) => e.log(),
            Error::UnknownOperation(name) => warn!(%name, "{}", self),
            Error::UnknownElement(name) => warn!(%name, "{}", self),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::UnknownOperation(name) => write!(f, "unknown operation '{name}'"),
            Error::UnknownElement(name) => write!(f, "unknown element '{name}'"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Error {
        Error::Parse(e)
    }
}
