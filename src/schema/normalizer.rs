//! Schema normalization
//!
//! Maps an arbitrary claim record onto the fixed training schema:
//! - Alias-aware field lookup (canonical name first, then aliases)
//! - Declared defaults for missing or empty input
//! - Permissive numeric coercion (currency strings, bools, anything)
//! - Diagnosis/procedure code extraction from free text
//!
//! Normalization never fails; garbage input produces a low-quality but
//! well-formed record rather than blocking the pipeline.

use std::collections::HashMap;

use serde_json::Value;

use super::codes::{extract_diagnosis_code, extract_procedure_code};
use super::fields::{FieldKind, FieldSpec, CANONICAL_FIELDS};
use crate::bundle::UNKNOWN_KEY;

/// Arbitrary caller-supplied claim record: an untyped JSON object
pub type RawRecord = serde_json::Map<String, Value>;

/// Value of one canonical field after normalization
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    /// Key used for label-encoder lookup. Blank text collapses to the
    /// reserved "Unknown" level; integral numbers print without a trailing
    /// `.0` so they match training-time categorical levels.
    pub fn categorical_key(&self) -> String {
        match self {
            FieldValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    UNKNOWN_KEY.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            FieldValue::Number(n) => format_number(*n),
        }
    }

    /// Finite numeric view; text parses permissively, unparseable yields 0
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => {
                if n.is_finite() {
                    *n
                } else {
                    0.0
                }
            }
            FieldValue::Text(text) => parse_numeric_text(text),
        }
    }
}

/// Claim record keyed by the canonical training-schema field names.
///
/// After [`Normalizer::normalize`] every canonical field has a defined value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    fields: HashMap<&'static str, FieldValue>,
}

impl NormalizedRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Normalizer for mapping raw claim records onto the canonical schema
pub struct Normalizer;

impl Normalizer {
    /// Normalize a raw record. Infallible: every canonical field comes out
    /// defined, with defaults substituted for anything missing or malformed.
    pub fn normalize(record: &RawRecord) -> NormalizedRecord {
        let mut fields = HashMap::with_capacity(CANONICAL_FIELDS.len());
        for spec in CANONICAL_FIELDS {
            fields.insert(spec.name, normalize_field(spec, record));
        }
        NormalizedRecord { fields }
    }
}

fn normalize_field(spec: &FieldSpec, record: &RawRecord) -> FieldValue {
    let raw = resolve_raw(spec, record);

    match spec.kind {
        FieldKind::Numeric { default } => match raw {
            Some(value) if !is_absent(value) => FieldValue::Number(coerce_numeric(value)),
            _ => FieldValue::Number(default),
        },
        FieldKind::Text { default } => match raw.and_then(value_text) {
            Some(text) => FieldValue::Text(text),
            None => FieldValue::Text(default.to_string()),
        },
        FieldKind::DiagnosisCode => {
            let code = raw
                .and_then(value_text)
                .and_then(|text| extract_diagnosis_code(&text));
            FieldValue::Text(code.unwrap_or_else(|| UNKNOWN_KEY.to_string()))
        }
        FieldKind::ProcedureCode => {
            let code = raw
                .and_then(value_text)
                .and_then(|text| extract_procedure_code(&text));
            FieldValue::Text(code.unwrap_or_else(|| "00000".to_string()))
        }
        FieldKind::Fixed { value } => FieldValue::Text(value.to_string()),
    }
}

/// Alias-aware lookup: the canonical name wins, then aliases in declared order
fn resolve_raw<'a>(spec: &FieldSpec, record: &'a RawRecord) -> Option<&'a Value> {
    if let Some(value) = record.get(spec.name) {
        return Some(value);
    }
    spec.aliases.iter().find_map(|alias| record.get(*alias))
}

/// Missing-for-defaulting purposes: JSON null or a blank string
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Text view of a raw value; null/blank/containers yield nothing
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => n.as_f64().map(format_number),
        _ => None,
    }
}

/// Permissive numeric coercion. Never fails: anything unparseable is 0.
fn coerce_numeric(value: &Value) -> f64 {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        },
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => parse_numeric_text(s),
        _ => 0.0,
    }
}

/// Parse free text as a number, stripping currency-like characters
/// ("$1,234.50" → 1234.5) before giving up.
pub(crate) fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return if v.is_finite() { v } else { 0.0 };
    }

    let stripped: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    match stripped.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Integral values print without a trailing `.0` ("1.0" → "1")
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
