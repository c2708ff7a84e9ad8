//! Canonical claims schema
//!
//! This module defines the fixed training-schema field set and the normalizer
//! that maps arbitrary caller records onto it. Callers may use canonical
//! field names or the caller-facing aliases interchangeably; missing or
//! malformed input degrades to defaults, never to an error.

mod codes;
mod fields;
mod normalizer;

pub use codes::{extract_diagnosis_code, extract_procedure_code};
pub use fields::{field_spec, FieldKind, FieldSpec, CANONICAL_FIELDS};
pub use normalizer::{FieldValue, NormalizedRecord, Normalizer, RawRecord};
