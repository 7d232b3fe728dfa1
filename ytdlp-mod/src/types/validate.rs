//! Field-level validation of raw extractor output.
//!
//! Raw yt-dlp JSON is loosely typed: numbers sometimes arrive as strings,
//! optional fields are `null` or missing, and new keys appear between
//! releases. [`Validator`] reads fields out of a JSON object with those
//! coercions applied and records every problem it meets instead of stopping
//! at the first one, so a single [`ValidationError`] describes the whole
//! document.

use std::fmt;

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    WrongType { expected: &'static str },
    OutOfRange
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub path: String,
    pub kind: IssueKind
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::Missing => write!(f, "{}: missing required field", self.path),
            IssueKind::WrongType { expected } => write!(f, "{}: expected {expected}", self.path),
            IssueKind::OutOfRange => write!(f, "{}: value out of range", self.path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid extraction data ({count} issue(s)): {summary}", count = .issues.len(), summary = summarize(.issues))]
pub struct ValidationError {
    issues: Vec<FieldIssue>
}

impl ValidationError {
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.path.as_str())
    }
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[derive(Debug, Default)]
pub(crate) struct Validator {
    issues: Vec<FieldIssue>
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn report(&mut self, path: String, kind: IssueKind) {
        self.issues.push(FieldIssue { path, kind });
    }

    pub fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        if let Some(object) = value.as_object() {
            Some(object)
        } else {
            let path = if path.is_empty() { "$".to_string() } else { path.to_string() };
            self.report(path, IssueKind::WrongType { expected: "object" });
            None
        }
    }

    pub fn required_string(
        &mut self,
        object: &Map<String, Value>,
        prefix: &str,
        key: &str
    ) -> Option<String> {
        match present(object, key) {
            Some(value) => self.coerce(prefix, key, value, coerce_string, "string"),
            None => {
                self.report(join_path(prefix, key), IssueKind::Missing);
                None
            }
        }
    }

    pub fn optional_string(
        &mut self,
        object: &Map<String, Value>,
        prefix: &str,
        key: &str
    ) -> Option<String> {
        let value = present(object, key)?;
        self.coerce(prefix, key, value, coerce_string, "string")
    }

    pub fn optional_u64(&mut self, object: &Map<String, Value>, prefix: &str, key: &str) -> Option<u64> {
        let value = present(object, key)?;
        self.coerce(prefix, key, value, coerce_u64, "non-negative integer")
    }

    pub fn optional_u32(&mut self, object: &Map<String, Value>, prefix: &str, key: &str) -> Option<u32> {
        let value = present(object, key)?;
        self.coerce(
            prefix,
            key,
            value,
            |v| coerce_u64(v).and_then(|n| u32::try_from(n).map_err(|_| IssueKind::OutOfRange)),
            "non-negative integer"
        )
    }

    pub fn optional_f64(&mut self, object: &Map<String, Value>, prefix: &str, key: &str) -> Option<f64> {
        let value = present(object, key)?;
        self.coerce(prefix, key, value, coerce_f64, "number")
    }

    pub fn optional_bool(&mut self, object: &Map<String, Value>, prefix: &str, key: &str) -> Option<bool> {
        let value = present(object, key)?;
        self.coerce(
            prefix,
            key,
            value,
            |v| {
                v.as_bool().ok_or(IssueKind::WrongType {
                    expected: "boolean"
                })
            },
            "boolean"
        )
    }

    pub fn required_array<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        prefix: &str,
        key: &str
    ) -> Option<&'v Vec<Value>> {
        match present(object, key) {
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.report(join_path(prefix, key), IssueKind::WrongType { expected: "array" });
                None
            }
            None => {
                self.report(join_path(prefix, key), IssueKind::Missing);
                None
            }
        }
    }

    fn coerce<T>(
        &mut self,
        prefix: &str,
        key: &str,
        value: &Value,
        convert: impl FnOnce(&Value) -> Result<T, IssueKind>,
        expected: &'static str
    ) -> Option<T> {
        match convert(value) {
            Ok(converted) => Some(converted),
            Err(IssueKind::WrongType { .. }) => {
                self.report(join_path(prefix, key), IssueKind::WrongType { expected });
                None
            }
            Err(kind) => {
                self.report(join_path(prefix, key), kind);
                None
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `value` when no issue was recorded. A missing `value` with no
    /// recorded issue cannot happen through the field readers above.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(value) if self.is_clean() => Ok(value),
            _ => Err(ValidationError { issues: self.issues })
        }
    }
}

fn present<'v>(object: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn coerce_string(value: &Value) -> Result<String, IssueKind> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(IssueKind::WrongType { expected: "string" })
    }
}

fn coerce_f64(value: &Value) -> Result<f64, IssueKind> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None
    };
    match number {
        Some(n) if n.is_finite() => Ok(n),
        Some(_) => Err(IssueKind::OutOfRange),
        None => Err(IssueKind::WrongType { expected: "number" })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn coerce_u64(value: &Value) -> Result<u64, IssueKind> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    if let Value::String(s) = value
        && let Ok(n) = s.trim().parse::<u64>()
    {
        return Ok(n);
    }
    let n = coerce_f64(value)?;
    if n.fract() != 0.0 {
        return Err(IssueKind::WrongType { expected: "integer" });
    }
    if n < 0.0 || n > u64::MAX as f64 {
        return Err(IssueKind::OutOfRange);
    }
    Ok(n as u64)
}
