//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Type descriptors able to validate a leaf's text value (`spec.md` §4.B,
//! `type_of(leaf)`).

use std::cmp::Ordering;
use std::sync::Arc;

use regex::Regex;

/// The parsed value of a leaf body, used both by validation (to report
/// *invalid-value*) and by `netconf-validate`'s key-aware sort, which
/// collates by parsed value rather than by raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    /// `uint64`'s upper half overflows `i64` (RFC 7950 §9.2.4), so it gets
    /// its own variant rather than widening every other integer type.
    Uint(u64),
    String(String),
    Bool(bool),
}

impl Value {
    /// Lexicographic-by-type ordering used for sort collation. Values of
    /// differing variants compare by their text form, which never happens
    /// in practice since a single key leaf always has one declared type.
    pub fn collate(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Uint(a), Value::Uint(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => self.to_text().cmp(&other.to_text()),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Uint(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::Bool(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeError {
    pub reason: String,
}

impl std::fmt::Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for TypeError {}

fn err(reason: impl Into<String>) -> TypeError {
    TypeError {
        reason: reason.into(),
    }
}

/// An inclusive numeric range, one alternative of a possibly `|`-separated
/// `range`/`length` statement argument.
#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    pub fn contains(&self, v: i64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// A resolved YANG type, built by the loader from a `type` statement and
/// its sub-statements (`spec.md` §3's "cached typedesc").
#[derive(Debug)]
pub enum TypeDesc {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Boolean,
    String {
        length: Vec<Range>,
        pattern: Option<Regex>,
    },
    Enumeration(Vec<String>),
    /// Kept as ordered alternatives per `spec.md` §3 ("unions kept as
    /// ordered alternatives"); validation tries each in turn.
    Union(Vec<Arc<TypeDesc>>),
    /// Any builtin/derived type this loader does not model precisely
    /// (`leafref`, `decimal64`, `identityref`, ...). Validated as opaque
    /// text, matching the loader's "unknown statement" leniency.
    Opaque,
    Integer {
        range: Vec<Range>,
    },
}

impl TypeDesc {
    /// Parses and validates `text` against this type, applying range/
    /// length/pattern constraints after the base parse (`spec.md` §4.C,
    /// "Range/length/pattern constraints are checked after type parsing").
    pub fn validate(&self, text: &str) -> Result<Value, TypeError> {
        match self {
            TypeDesc::Int8 => parse_bounded(text, i8::MIN as i64, i8::MAX as i64),
            TypeDesc::Int16 => parse_bounded(text, i16::MIN as i64, i16::MAX as i64),
            TypeDesc::Int32 => parse_bounded(text, i32::MIN as i64, i32::MAX as i64),
            TypeDesc::Int64 => parse_bounded(text, i64::MIN, i64::MAX),
            TypeDesc::Uint8 => parse_bounded(text, 0, u8::MAX as i64),
            TypeDesc::Uint16 => parse_bounded(text, 0, u16::MAX as i64),
            TypeDesc::Uint32 => parse_bounded(text, 0, u32::MAX as i64),
            TypeDesc::Uint64 => parse_bounded_u64(text),
            TypeDesc::Integer { range } => {
                let v: i64 = text
                    .trim()
                    .parse()
                    .map_err(|_| err(format!("'{text}' is not an integer")))?;
                validate_range(v, range)?;
                Ok(Value::Int(v))
            }
            TypeDesc::Boolean => match text.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(err(format!("'{other}' is not a valid boolean"))),
            },
            TypeDesc::String { length, pattern } => {
                if !length.is_empty() {
                    let len = text.chars().count() as i64;
                    if !length.iter().any(|r| r.contains(len)) {
                        return Err(err(format!(
                            "length {len} of '{text}' is out of range"
                        )));
                    }
                }
                if let Some(re) = pattern {
                    if !re.is_match(text) {
                        return Err(err(format!("'{text}' does not match pattern")));
                    }
                }
                Ok(Value::String(text.to_string()))
            }
            TypeDesc::Enumeration(values) => {
                if values.iter().any(|v| v == text) {
                    Ok(Value::String(text.to_string()))
                } else {
                    Err(err(format!("'{text}' is not a valid enum value")))
                }
            }
            TypeDesc::Union(alternatives) => {
                let mut last_err = err("union has no alternatives");
                for alt in alternatives {
                    match alt.validate(text) {
                        Ok(v) => return Ok(v),
                        Err(e) => last_err = e,
                    }
                }
                Err(last_err)
            }
            TypeDesc::Opaque => Ok(Value::String(text.to_string())),
        }
    }
}

fn parse_bounded(text: &str, min: i64, max: i64) -> Result<Value, TypeError> {
    let v: i64 = text
        .trim()
        .parse()
        .map_err(|_| err(format!("'{text}' is not an integer")))?;
    if v < min || v > max {
        return Err(err(format!("'{text}' is out of range")));
    }
    Ok(Value::Int(v))
}

/// `uint64`'s range is `[0, u64::MAX]`, the top half of which doesn't fit
/// in `parse_bounded`'s `i64` (RFC 7950 §9.2.4).
fn parse_bounded_u64(text: &str) -> Result<Value, TypeError> {
    let v: u64 = text
        .trim()
        .parse()
        .map_err(|_| err(format!("'{text}' is not an integer")))?;
    Ok(Value::Uint(v))
}

fn validate_range(v: i64, range: &[Range]) -> Result<(), TypeError> {
    if range.is_empty() || range.iter().any(|r| r.contains(v)) {
        Ok(())
    } else {
        Err(err(format!("{v} is out of range")))
    }
}

/// Parses a `range`/`length` statement argument: `min..max` alternatives
/// separated by `|`, e.g. `"1..4 | 10..20"`.
pub fn parse_ranges(arg: &str) -> Result<Vec<Range>, TypeError> {
    arg.split('|')
        .map(|part| {
            let part = part.trim();
            match part.split_once("..") {
                Some((lo, hi)) => {
                    let min: i64 = lo
                        .trim()
                        .parse()
                        .map_err(|_| err(format!("bad range bound '{lo}'")))?;
                    let max: i64 = hi
                        .trim()
                        .parse()
                        .map_err(|_| err(format!("bad range bound '{hi}'")))?;
                    Ok(Range { min, max })
                }
                None => {
                    let exact: i64 = part
                        .parse()
                        .map_err(|_| err(format!("bad range value '{part}'")))?;
                    Ok(Range {
                        min: exact,
                        max: exact,
                    })
                }
            }
        })
        .collect()
}

/// Builds the builtin type named by a `type` statement's argument, ignoring
/// any sub-statements (callers attach `range`/`length`/`pattern` on top).
pub fn builtin(name: &str) -> TypeDesc {
    match name {
        "int8" => TypeDesc::Int8,
        "int16" => TypeDesc::Int16,
        "int32" => TypeDesc::Int32,
        "int64" => TypeDesc::Int64,
        "uint8" => TypeDesc::Uint8,
        "uint16" => TypeDesc::Uint16,
        "uint32" => TypeDesc::Uint32,
        "uint64" => TypeDesc::Uint64,
        "boolean" => TypeDesc::Boolean,
        "string" => TypeDesc::String {
            length: Vec::new(),
            pattern: None,
        },
        _ => TypeDesc::Opaque,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint16_rejects_out_of_range() {
        let t = builtin("uint16");
        assert!(t.validate("99999").is_err());
        assert!(t.validate("65535").is_ok());
    }

    #[test]
    fn uint64_accepts_values_above_i64_max() {
        let t = builtin("uint64");
        assert_eq!(t.validate(u64::MAX.to_string().as_str()).unwrap(), Value::Uint(u64::MAX));
        assert!(t.validate("-1").is_err());
    }

    #[test]
    fn union_tries_alternatives_in_order() {
        let t = TypeDesc::Union(vec![Arc::new(builtin("uint8")), Arc::new(builtin("string"))]);
        assert_eq!(t.validate("42").unwrap(), Value::Int(42));
        assert_eq!(
            t.validate("hello").unwrap(),
            Value::String("hello".to_string())
        );
    }

    #[test]
    fn string_pattern_and_length() {
        let t = TypeDesc::String {
            length: parse_ranges("1..4").unwrap(),
            pattern: Some(Regex::new("^[a-z]+$").unwrap()),
        };
        assert!(t.validate("abcd").is_ok());
        assert!(t.validate("abcde").is_err());
        assert!(t.validate("ABCD").is_err());
    }
}
