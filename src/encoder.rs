//! Row encoding and scaling
//!
//! Walks the bundle's feature list in declared order, producing one number per
//! feature: a label-encoder index for categorical columns, the coerced numeric
//! value otherwise. Z-score scaling is applied positionally afterwards, so
//! categorical indices not declared in the scaler stay untouched while numeric
//! columns are centered and scaled exactly as at training time.

use crate::bundle::{FeatureBundle, UNKNOWN_KEY};
use crate::schema::NormalizedRecord;

/// Fixed-length numeric vector; position `i` corresponds to
/// `selected_features[i]` of the bundle that produced it
pub type FeatureVector = Vec<f64>;

/// Row encoder for producing feature vectors from normalized records
pub struct RowEncoder;

impl RowEncoder {
    /// Encode one normalized record into the bundle's column order.
    ///
    /// The returned vector always has `selected_features.len()` entries; a
    /// feature the bundle declares categorical is always looked up as a
    /// category regardless of the normalized value's type.
    pub fn encode(bundle: &FeatureBundle, record: &NormalizedRecord) -> FeatureVector {
        let mut row: FeatureVector = bundle
            .selected_features
            .iter()
            .map(|col| encode_value(bundle, record, col))
            .collect();

        apply_scaler(bundle, &mut row);
        row
    }
}

fn encode_value(bundle: &FeatureBundle, record: &NormalizedRecord, col: &str) -> f64 {
    match bundle.encoder_for(col) {
        Some(encoder) => {
            let key = record
                .get(col)
                .map(|value| value.categorical_key())
                .unwrap_or_else(|| UNKNOWN_KEY.to_string());
            encoder.encode(&key) as f64
        }
        None => record.get(col).map(|value| value.as_number()).unwrap_or(0.0),
    }
}

/// Apply z-score scaling in place. Skipped entirely when the statistics do
/// not line up with the row; skipped per position when mean/scale are
/// null/non-finite or scale is zero.
fn apply_scaler(bundle: &FeatureBundle, row: &mut [f64]) {
    let scaler = match &bundle.scaler {
        Some(s) => s,
        None => return,
    };
    if !scaler.aligned_to(row.len()) {
        return;
    }

    for (i, value) in row.iter_mut().enumerate() {
        if let Some((mean, scale)) = scaler.factors(i) {
            *value = (*value - mean) / scale;
        }
    }
}
