//! Pipeline orchestration
//!
//! This module provides the public API for claimvec: load a bundle once, then
//! vectorize batches of raw claim records. The pipeline is normalize →
//! encode/scale → validate, synchronous and lock-free; it is a pure function
//! of (bundle, input), so arbitrarily many batches may be processed
//! concurrently against the same shared bundle.

use std::path::Path;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::bundle::{BundleInfo, FeatureBundle};
use crate::encoder::{FeatureVector, RowEncoder};
use crate::error::VectorizeError;
use crate::schema::{Normalizer, RawRecord};
use crate::validator::VectorValidator;

/// Vectorize a batch of raw records against a loaded bundle.
///
/// Returns one vector per record, in input order, each of the bundle's
/// declared length, or a single mismatch error covering the whole batch
/// (no partial vectors are returned).
pub fn vectorize_batch(
    bundle: &FeatureBundle,
    records: &[RawRecord],
) -> Result<Vec<FeatureVector>, VectorizeError> {
    let vectors: Vec<FeatureVector> = records
        .iter()
        .map(|record| {
            let normalized = Normalizer::normalize(record);
            RowEncoder::encode(bundle, &normalized)
        })
        .collect();

    VectorValidator::validate_batch(&vectors, bundle.mismatch_threshold())?;
    Ok(vectors)
}

/// Stateful vectorizer owning a shared immutable bundle.
///
/// Use this when the surrounding service holds one bundle for its lifetime
/// (or several versions side by side; each `Vectorizer` is independent).
pub struct Vectorizer {
    bundle: Arc<FeatureBundle>,
    instance_id: String,
}

impl Vectorizer {
    /// Create a vectorizer owning the given bundle
    pub fn new(bundle: FeatureBundle) -> Self {
        Self::from_shared(Arc::new(bundle))
    }

    /// Create a vectorizer over an already-shared bundle
    pub fn from_shared(bundle: Arc<FeatureBundle>) -> Self {
        Self {
            bundle,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Load the bundle artifact from disk and build a vectorizer.
    ///
    /// Fails with a configuration error if the artifact is missing or
    /// malformed; the caller must not serve requests in that case.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VectorizeError> {
        Ok(Self::new(FeatureBundle::load(path)?))
    }

    /// The loaded bundle
    pub fn bundle(&self) -> &FeatureBundle {
        &self.bundle
    }

    /// Unique id of this vectorizer instance, for provenance in diagnostics
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Vectorize a batch of raw records; see [`vectorize_batch`]
    pub fn vectorize_batch(
        &self,
        records: &[RawRecord],
    ) -> Result<Vec<FeatureVector>, VectorizeError> {
        debug!(
            "vectorizing batch of {} records (instance {})",
            records.len(),
            self.instance_id
        );
        vectorize_batch(&self.bundle, records)
    }

    /// Vectorize a single record, validated as a batch of one
    pub fn vectorize(&self, record: &RawRecord) -> Result<FeatureVector, VectorizeError> {
        let vectors = vectorize_batch(&self.bundle, std::slice::from_ref(record))?;
        Ok(vectors.into_iter().next().unwrap_or_default())
    }

    /// Bundle introspection for external health reporting
    pub fn describe(&self) -> BundleInfo {
        self.bundle.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_bundle_json() -> &'static str {
        r#"{
            "selected_features": [
                "Provider",
                "InscClaimAmtReimbursed",
                "DeductibleAmtPaid",
                "NoOfMonths_PartACov",
                "ChronicCond_Diabetes",
                "ClmDiagnosisCode_1"
            ],
            "label_encoders": {
                "Provider": {
                    "mapping": {"PRV51001": 0, "PRV51002": 1, "Unknown": 2},
                    "unknown_index": 2
                },
                "ClmDiagnosisCode_1": {
                    "mapping": {"E11.9": 0, "I10": 1, "Unknown": 2}
                }
            },
            "scaler": {
                "mean_": [null, 600.0, 80.0, 10.0, 0.5, null],
                "scale_": [null, 200.0, 40.0, 2.0, 0.5, null]
            },
            "version": "claims-model-7"
        }"#
    }

    fn sample_vectorizer() -> Vectorizer {
        Vectorizer::new(FeatureBundle::from_json(sample_bundle_json()).unwrap())
    }

    fn sample_records() -> Vec<RawRecord> {
        [
            json!({
                "provider_id": "PRV51001",
                "claim_amount": 800,
                "deductible": "$100",
                "months_part_a": 12,
                "chronic_diabetes": 1,
                "diagnosis": "Diag: e11.9 present"
            }),
            json!({
                "Provider": "PRV51002",
                "InscClaimAmtReimbursed": 400,
                "diagnosis": "I10 hypertension"
            }),
        ]
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    #[test]
    fn test_batch_shape() {
        let vectorizer = sample_vectorizer();
        let records = sample_records();

        let vectors = vectorizer.vectorize_batch(&records).unwrap();

        assert_eq!(vectors.len(), records.len());
        for vector in &vectors {
            assert_eq!(vector.len(), 6);
            assert!(vector.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_known_record_values() {
        let vectorizer = sample_vectorizer();
        let records = sample_records();

        let vectors = vectorizer.vectorize_batch(&records).unwrap();

        // First record: Provider index 0; (800-600)/200 = 1; (100-80)/40 = 0.5;
        // (12-10)/2 = 1; (1-0.5)/0.5 = 1; diagnosis E11.9 → 0
        assert_eq!(vectors[0], vec![0.0, 1.0, 0.5, 1.0, 1.0, 0.0]);

        // Second record: defaults fill the gaps. deductible 0 → -2,
        // months 12 → 1, diabetes 0 → -1, diagnosis I10 → 1
        assert_eq!(vectors[1], vec![1.0, -1.0, -2.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_idempotence() {
        let vectorizer = sample_vectorizer();
        let records = sample_records();

        let first = vectorizer.vectorize_batch(&records).unwrap();
        let second = vectorizer.vectorize_batch(&records).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_record_matches_batch() {
        let vectorizer = sample_vectorizer();
        let records = sample_records();

        let single = vectorizer.vectorize(&records[0]).unwrap();
        let batch = vectorizer.vectorize_batch(&records).unwrap();
        assert_eq!(single, batch[0]);
    }

    #[test]
    fn test_unscaled_amount_trips_mismatch() {
        // No scaler: raw dollar amounts pass through at full magnitude
        let bundle = FeatureBundle::from_json(
            r#"{"selected_features": ["InscClaimAmtReimbursed"]}"#,
        )
        .unwrap();
        let vectorizer = Vectorizer::new(bundle);

        let record = json!({"claim_amount": 1000}).as_object().unwrap().clone();
        let err = vectorizer.vectorize_batch(&[record]).unwrap_err();

        assert!(matches!(err, VectorizeError::Mismatch { offending: 1, .. }));
    }

    #[test]
    fn test_mismatch_rejects_whole_batch() {
        let bundle = FeatureBundle::from_json(
            r#"{"selected_features": ["InscClaimAmtReimbursed"]}"#,
        )
        .unwrap();
        let vectorizer = Vectorizer::new(bundle);

        // One good row, one bad row: no partial output
        let records: Vec<RawRecord> = [json!({"claim_amount": 5}), json!({"claim_amount": 900})]
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();

        assert!(vectorizer.vectorize_batch(&records).is_err());
    }

    #[test]
    fn test_missing_chronic_flag_defaults_without_error() {
        let vectorizer = sample_vectorizer();
        let record = json!({"provider_id": "PRV51001"})
            .as_object()
            .unwrap()
            .clone();

        let vector = vectorizer.vectorize(&record).unwrap();
        // ChronicCond_Diabetes absent → 0 → scaled to (0-0.5)/0.5 = -1
        assert_eq!(vector[4], -1.0);
    }

    #[test]
    fn test_empty_batch() {
        let vectorizer = sample_vectorizer();
        let vectors = vectorizer.vectorize_batch(&[]).unwrap();
        assert!(vectors.is_empty());
    }

    #[test]
    fn test_describe() {
        let vectorizer = sample_vectorizer();
        let info = vectorizer.describe();

        assert_eq!(info.feature_count, 6);
        assert_eq!(info.version_marker, "claims-model-7");
        assert_eq!(info.feature_preview.len(), 6);
        assert_eq!(info.categorical_count, 2);
    }

    #[test]
    fn test_shared_bundle_across_vectorizers() {
        let bundle = Arc::new(FeatureBundle::from_json(sample_bundle_json()).unwrap());
        let a = Vectorizer::from_shared(Arc::clone(&bundle));
        let b = Vectorizer::from_shared(bundle);

        assert_ne!(a.instance_id(), b.instance_id());

        let records = sample_records();
        assert_eq!(
            a.vectorize_batch(&records).unwrap(),
            b.vectorize_batch(&records).unwrap()
        );
    }
}
