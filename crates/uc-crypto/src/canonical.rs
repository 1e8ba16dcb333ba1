//! # Canonical Encoding
//!
//! Every byte sequence that feeds a record hash or a proof commitment is
//! produced here. [`CanonicalBytes`] has a private inner field and can only
//! be obtained from [`CanonicalPayload::encode`], so no caller can hash a
//! payload that skipped the rules below.
//!
//! ## Byte format
//!
//! A payload is a flat map of field names to primitive values. It encodes to
//! compact UTF-8 text of the form `{"a":1,"b":"x","c":null}`:
//!
//! 1. Keys are sorted byte-lexicographically; insertion order is irrelevant.
//! 2. Strings and keys are JSON-escaped.
//! 3. Integers render in base 10, exactly, across the full `i64` and `u64`
//!    ranges.
//! 4. Floats render as the shortest decimal that round-trips, without an
//!    exponent and without trailing zeros (`6.0` → `6`, `-0.0` → `0`).
//!    NaN and infinities are rejected.
//! 5. An absent field is omitted; an explicit null renders as `null`.
//!
//! Nested values are not representable. Sequences and sub-records are
//! flattened into dotted keys by the caller (`readings.0.value`).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde_json::Value;

/// Errors from canonical encoding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error("field `{field}` holds a non-finite number ({value})")]
    NonFiniteNumber { field: String, value: f64 },

    #[error("field `{field}` holds an unsupported value: {kind}")]
    UnsupportedType { field: String, kind: &'static str },

    #[error("field names must not be empty")]
    EmptyFieldName,

    #[error("field `{0}` is defined more than once")]
    DuplicateField(String),

    #[error("string escaping failed: {0}")]
    Escape(String),
}

/// A primitive value that can appear in a canonical payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned integers above `i64::MAX`. Smaller values are [`Int`](Self::Int).
    UInt(u64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    fn check(&self, field: &str) -> Result<(), EncodingError> {
        match self {
            Self::Float(f) if !f.is_finite() => Err(EncodingError::NonFiniteNumber {
                field: field.to_string(),
                value: *f,
            }),
            _ => Ok(()),
        }
    }

    fn write_to(&self, out: &mut String) -> Result<(), EncodingError> {
        match self {
            Self::Null => out.push_str("null"),
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Self::UInt(u) => {
                let _ = write!(out, "{u}");
            }
            Self::Float(f) => out.push_str(&format_float(*f)),
            Self::Str(s) => out.push_str(&escape(s)?),
        }
        Ok(())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Self::UInt(v), Self::Int)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        Self::from(v as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    /// `None` becomes an explicit null. Use [`CanonicalPayload::insert_opt`]
    /// to omit the field instead.
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A flat, order-independent map of named primitive fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalPayload {
    fields: BTreeMap<String, FieldValue>,
}

impl CanonicalPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Fails on empty names, duplicates, and non-finite floats.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<&mut Self, EncodingError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EncodingError::EmptyFieldName);
        }
        let value = value.into();
        value.check(&name)?;
        if self.fields.contains_key(&name) {
            return Err(EncodingError::DuplicateField(name));
        }
        self.fields.insert(name, value);
        Ok(self)
    }

    /// Add a field only when `value` is `Some`; `None` leaves it absent.
    pub fn insert_opt<T: Into<FieldValue>>(
        &mut self,
        name: impl Into<String>,
        value: Option<T>,
    ) -> Result<&mut Self, EncodingError> {
        match value {
            Some(v) => self.insert(name, v),
            None => Ok(self),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<Self, EncodingError> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Merge another payload under `prefix.` (used for sub-events and series).
    pub fn nest(
        &mut self,
        prefix: &str,
        other: CanonicalPayload,
    ) -> Result<&mut Self, EncodingError> {
        for (key, value) in other.fields {
            self.insert(format!("{prefix}.{key}"), value)?;
        }
        Ok(self)
    }

    /// Build from a flat JSON object. Nested objects and arrays are rejected.
    pub fn from_json_object(value: &Value) -> Result<Self, EncodingError> {
        let Value::Object(map) = value else {
            return Err(EncodingError::UnsupportedType {
                field: "$".into(),
                kind: json_kind(value),
            });
        };

        let mut payload = Self::new();
        for (key, v) in map {
            let field = match v {
                Value::Null => FieldValue::Null,
                Value::Bool(b) => FieldValue::Bool(*b),
                Value::String(s) => FieldValue::Str(s.clone()),
                Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
                    (Some(i), _, _) => FieldValue::Int(i),
                    (None, Some(u), _) => FieldValue::UInt(u),
                    (None, None, Some(f)) => FieldValue::Float(f),
                    (None, None, None) => {
                        return Err(EncodingError::UnsupportedType {
                            field: key.clone(),
                            kind: "number out of range",
                        })
                    }
                },
                Value::Array(_) | Value::Object(_) => {
                    return Err(EncodingError::UnsupportedType {
                        field: key.clone(),
                        kind: json_kind(v),
                    })
                }
            };
            payload.insert(key.clone(), field)?;
        }
        Ok(payload)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Produce the canonical byte sequence.
    pub fn encode(&self) -> Result<CanonicalBytes, EncodingError> {
        let mut out = String::with_capacity(self.fields.len() * 24 + 2);
        out.push('{');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            value.check(key)?;
            out.push_str(&escape(key)?);
            out.push(':');
            value.write_to(&mut out)?;
        }
        out.push('}');
        Ok(CanonicalBytes(out.into_bytes()))
    }
}

/// Bytes produced exclusively by [`CanonicalPayload::encode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lossless view as text (the encoding is always UTF-8).
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Types with a canonical field mapping.
pub trait Canonical {
    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError>;

    fn canonical_bytes(&self) -> Result<CanonicalBytes, EncodingError> {
        self.canonical_payload()?.encode()
    }
}

fn format_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    // `Display` for f64 yields the shortest round-trip digits, no exponent.
    format!("{f}")
}

fn escape(s: &str) -> Result<String, EncodingError> {
    serde_json::to_string(s).map_err(|e| EncodingError::Escape(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
