//! JSON path helpers.
//!
//! Diagnostics address sub-fields of a graph document with JSONPath strings such
//! as `$.nodes[@.id=='…'].body.inputs.x[0]`. This module builds those strings and
//! evaluates the restricted path dialect used by reference schemas:
//!
//! - `$` root
//! - `.name` and `['name']` member access
//! - `[n]` array index
//! - `.*` and `[*]` wildcards over object values or array items

use crate::{LoomError, LoomResult};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Concatenate JSON path fragments under a single `$` root.
///
/// Leading `$` and `.` of each fragment are dropped; fragments starting with `[`
/// are appended without a separator. Empty fragments are skipped.
pub fn concat_json_path<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from("$");
    for part in parts {
        let mut part = part.as_ref();
        part = part.strip_prefix('$').unwrap_or(part);
        part = part.strip_prefix('.').unwrap_or(part);
        if part.is_empty() {
            continue;
        }
        if !part.starts_with('[') {
            out.push('.');
        }
        out.push_str(part);
    }
    out
}

/// Convert a JSON pointer (`/a/0/b`) into a JSON path (`$.a[0].b`).
///
/// The pointer is walked through `instance`: a numeric segment is an index
/// only where the value it addresses is an array.
pub fn json_pointer_to_json_path(pointer: &str, instance: &Value) -> String {
    let mut out = String::from("$");
    let mut current = Some(instance);
    for raw in pointer.split('/').filter(|p| !p.is_empty()) {
        let part = raw.replace("~1", "/").replace("~0", "~");
        let index = match current {
            Some(Value::Array(_)) => part.parse::<usize>().ok(),
            _ => None,
        };
        match index {
            Some(idx) => {
                push_index(&mut out, idx);
                current = current.and_then(|v| v.get(idx));
            }
            None => {
                push_field(&mut out, &part);
                current = current.and_then(|v| v.get(part.as_str()));
            }
        }
    }
    out
}

/// Append a member access to a path, quoting names that are not identifiers.
pub fn json_path_member(base: &str, name: &str) -> String {
    let mut out = base.to_string();
    push_field(&mut out, name);
    out
}

/// Append an index access to a path.
pub fn json_path_index(base: &str, idx: usize) -> String {
    let mut out = base.to_string();
    push_index(&mut out, idx);
    out
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn push_field(out: &mut String, name: &str) {
    if is_identifier(name) {
        out.push('.');
        out.push_str(name);
    } else {
        out.push_str("['");
        out.push_str(&name.replace('\'', "\\'"));
        out.push_str("']");
    }
}

fn push_index(out: &mut String, idx: usize) {
    out.push('[');
    out.push_str(&idx.to_string());
    out.push(']');
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
    Wildcard,
}

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    source: String,
    segments: Vec<Segment>,
}

/// One value selected by a [`JsonPath`], with its normalized location.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch<'v> {
    pub path: String,
    pub value: &'v Value,
}

impl JsonPath {
    /// Parse a path expression.
    pub fn parse(path: &str) -> LoomResult<Self> {
        let err = |message: &str| LoomError::invalid_json_path(path, message);

        let chars: Vec<char> = path.chars().collect();
        if chars.first() != Some(&'$') {
            return Err(err("path must start with '$'"));
        }

        let mut segments = Vec::new();
        let mut pos = 1;
        while pos < chars.len() {
            match chars[pos] {
                '.' => {
                    pos += 1;
                    match chars.get(pos) {
                        Some('*') => {
                            segments.push(Segment::Wildcard);
                            pos += 1;
                        }
                        Some('.') => return Err(err("recursive descent is not supported")),
                        Some(_) => {
                            let start = pos;
                            while pos < chars.len() && !matches!(chars[pos], '.' | '[') {
                                pos += 1;
                            }
                            if start == pos {
                                return Err(err("empty member name"));
                            }
                            let name: String = chars[start..pos].iter().collect();
                            segments.push(Segment::Field(name));
                        }
                        None => return Err(err("path ends with '.'")),
                    }
                }
                '[' => {
                    pos += 1;
                    match chars.get(pos) {
                        Some('*') => {
                            segments.push(Segment::Wildcard);
                            pos += 1;
                        }
                        Some(&quote) if quote == '\'' || quote == '"' => {
                            pos += 1;
                            let mut name = String::new();
                            loop {
                                match chars.get(pos) {
                                    Some('\\') => {
                                        if let Some(&c) = chars.get(pos + 1) {
                                            name.push(c);
                                        }
                                        pos += 2;
                                    }
                                    Some(&c) if c == quote => {
                                        pos += 1;
                                        break;
                                    }
                                    Some(&c) => {
                                        name.push(c);
                                        pos += 1;
                                    }
                                    None => return Err(err("unterminated quoted name")),
                                }
                            }
                            segments.push(Segment::Field(name));
                        }
                        Some(c) if c.is_ascii_digit() => {
                            let start = pos;
                            while pos < chars.len() && chars[pos].is_ascii_digit() {
                                pos += 1;
                            }
                            let digits: String = chars[start..pos].iter().collect();
                            let idx = digits.parse().map_err(|_| err("index out of range"))?;
                            segments.push(Segment::Index(idx));
                        }
                        _ => return Err(err("unsupported bracket expression")),
                    }
                    if chars.get(pos) != Some(&']') {
                        return Err(err("expected ']'"));
                    }
                    pos += 1;
                }
                c => return Err(err(&format!("unexpected character {c:?}"))),
            }
        }

        Ok(Self {
            source: path.to_string(),
            segments,
        })
    }

    /// The expression as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Select every value matched by this path, in document order.
    ///
    /// Missing members and out-of-range indices simply produce no match.
    pub fn select<'v>(&self, root: &'v Value) -> Vec<PathMatch<'v>> {
        let mut current = vec![PathMatch {
            path: String::from("$"),
            value: root,
        }];

        for segment in &self.segments {
            let mut next = Vec::new();
            for m in current {
                match segment {
                    Segment::Field(name) => {
                        if let Some(v) = m.value.get(name.as_str()) {
                            let mut path = m.path;
                            push_field(&mut path, name);
                            next.push(PathMatch { path, value: v });
                        }
                    }
                    Segment::Index(idx) => {
                        if let Some(v) = m.value.as_array().and_then(|a| a.get(*idx)) {
                            let mut path = m.path;
                            push_index(&mut path, *idx);
                            next.push(PathMatch { path, value: v });
                        }
                    }
                    Segment::Wildcard => match m.value {
                        Value::Object(map) => {
                            for (k, v) in map {
                                let mut path = m.path.clone();
                                push_field(&mut path, k);
                                next.push(PathMatch { path, value: v });
                            }
                        }
                        Value::Array(items) => {
                            for (idx, v) in items.iter().enumerate() {
                                let mut path = m.path.clone();
                                push_index(&mut path, idx);
                                next.push(PathMatch { path, value: v });
                            }
                        }
                        _ => {}
                    },
                }
            }
            current = next;
        }
        current
    }
}

impl FromStr for JsonPath {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
