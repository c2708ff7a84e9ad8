//! Feature bundle loading
//!
//! The bundle is the precomputed configuration artifact produced alongside the
//! trained model: the ordered feature list, per-feature label encoders, and
//! scaler statistics. It is loaded once at process start, validated, and then
//! shared read-only; the column order it declares IS the output vector's
//! column order.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::VectorizeError;

/// Bundle format marker reported when the artifact carries no version field
pub const BUNDLE_FORMAT: &str = "claims.feature_bundle.v1";

/// Reserved categorical level for values absent from a training-time mapping
pub const UNKNOWN_KEY: &str = "Unknown";

/// Default magnitude threshold for the post-encoding mismatch check
pub const DEFAULT_MISMATCH_THRESHOLD: f64 = 50.0;

/// Number of feature names included in the diagnostics preview
const FEATURE_PREVIEW_LEN: usize = 10;

/// Label encoding table for one categorical feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Categorical level → integer index, learned at training time
    pub mapping: HashMap<String, i64>,
    /// Declared fallback index for levels absent from the mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_index: Option<i64>,
}

impl LabelEncoder {
    /// Resolve a categorical key to its index.
    ///
    /// Fallback order for unseen levels: the declared `unknown_index`, then
    /// the mapping's reserved "Unknown" sentinel entry, then index 0.
    pub fn encode(&self, key: &str) -> i64 {
        if let Some(&index) = self.mapping.get(key) {
            return index;
        }
        if let Some(index) = self.unknown_index {
            return index;
        }
        if let Some(&index) = self.mapping.get(UNKNOWN_KEY) {
            return index;
        }
        0
    }
}

/// Per-position scaling statistics, aligned to the selected feature order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerStats {
    /// Per-feature mean; `null` marks positions that must not be scaled
    #[serde(rename = "mean_")]
    pub mean: Vec<Option<f64>>,
    /// Per-feature scale; `null` or zero marks positions that must not be scaled
    #[serde(rename = "scale_")]
    pub scale: Vec<Option<f64>>,
}

impl ScalerStats {
    /// True when both statistic arrays line up with the feature count
    pub fn aligned_to(&self, feature_count: usize) -> bool {
        self.mean.len() == feature_count && self.scale.len() == feature_count
    }

    /// Scaling factors `(mean, scale)` for position `i`, if that position
    /// should be scaled at all
    pub fn factors(&self, i: usize) -> Option<(f64, f64)> {
        let mean = self.mean.get(i).copied().flatten()?;
        let scale = self.scale.get(i).copied().flatten()?;
        if mean.is_finite() && scale.is_finite() && scale != 0.0 {
            Some((mean, scale))
        } else {
            None
        }
    }
}

/// Immutable vectorization configuration loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureBundle {
    /// Output column order; non-empty and unique
    #[serde(default)]
    pub selected_features: Vec<String>,
    /// Categorical features and their encoding tables; a feature absent from
    /// this map is numeric
    #[serde(default)]
    pub label_encoders: HashMap<String, LabelEncoder>,
    /// Scaler statistics aligned to `selected_features`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalerStats>,
    /// Optional version marker stamped by the training pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Optional override for the validator's magnitude threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mismatch_threshold: Option<f64>,
    /// When this bundle was loaded (not part of the artifact)
    #[serde(skip_serializing, skip_deserializing, default = "Utc::now")]
    pub loaded_at: DateTime<Utc>,
}

impl FeatureBundle {
    /// Parse and validate a bundle from its JSON artifact
    pub fn from_json(json: &str) -> Result<Self, VectorizeError> {
        let bundle: FeatureBundle = serde_json::from_str(json)?;
        bundle.validate()?;
        info!(
            "loaded feature bundle: {} features, {} categorical, version {}",
            bundle.selected_features.len(),
            bundle.label_encoders.len(),
            bundle.version.as_deref().unwrap_or(BUNDLE_FORMAT)
        );
        Ok(bundle)
    }

    /// Load a bundle from a file path.
    ///
    /// A missing or malformed artifact is fatal at startup: the process must
    /// not serve vectorization requests without a valid bundle.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VectorizeError> {
        let json = fs::read_to_string(path.as_ref()).map_err(|e| {
            VectorizeError::Configuration(format!(
                "cannot read bundle artifact {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), VectorizeError> {
        if self.selected_features.is_empty() {
            return Err(VectorizeError::Configuration(
                "bundle declares no selected_features".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.selected_features {
            if !seen.insert(name.as_str()) {
                return Err(VectorizeError::Configuration(format!(
                    "duplicate feature name in selected_features: {name}"
                )));
            }
        }

        if let Some(scaler) = &self.scaler {
            if !scaler.aligned_to(self.selected_features.len()) {
                warn!(
                    "scaler statistics misaligned: {} features but mean_[{}]/scale_[{}]; \
                     scaling will be skipped",
                    self.selected_features.len(),
                    scaler.mean.len(),
                    scaler.scale.len()
                );
            }
        }

        for name in self.label_encoders.keys() {
            if !seen.contains(name.as_str()) {
                warn!("label encoder for {name} has no matching selected feature");
            }
        }

        Ok(())
    }

    /// Encoding table for a feature, if the bundle declares it categorical
    pub fn encoder_for(&self, feature: &str) -> Option<&LabelEncoder> {
        self.label_encoders.get(feature)
    }

    /// Magnitude threshold used by the post-encoding mismatch check
    pub fn mismatch_threshold(&self) -> f64 {
        self.mismatch_threshold.unwrap_or(DEFAULT_MISMATCH_THRESHOLD)
    }

    /// Read-only diagnostics view for operational health reporting
    pub fn describe(&self) -> BundleInfo {
        BundleInfo {
            feature_count: self.selected_features.len(),
            version_marker: self
                .version
                .clone()
                .unwrap_or_else(|| BUNDLE_FORMAT.to_string()),
            feature_preview: self
                .selected_features
                .iter()
                .take(FEATURE_PREVIEW_LEN)
                .cloned()
                .collect(),
            categorical_count: self.label_encoders.len(),
            scaler_aligned: self
                .scaler
                .as_ref()
                .map(|s| s.aligned_to(self.selected_features.len()))
                .unwrap_or(false),
            loaded_at_utc: self.loaded_at.to_rfc3339(),
        }
    }
}

/// Bundle introspection snapshot exposed to external health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleInfo {
    pub feature_count: usize,
    pub version_marker: String,
    pub feature_preview: Vec<String>,
    pub categorical_count: usize,
    pub scaler_aligned: bool,
    pub loaded_at_utc: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_bundle_json() -> &'static str {
        r#"{
            "selected_features": ["Provider", "InscClaimAmtReimbursed", "ChronicCond_Diabetes"],
            "label_encoders": {
                "Provider": {
                    "mapping": {"PRV51001": 0, "PRV51002": 1, "Unknown": 2},
                    "unknown_index": 2
                }
            },
            "scaler": {
                "mean_": [null, 600.0, null],
                "scale_": [null, 200.0, null]
            },
            "version": "2024-06-bundle"
        }"#
    }

    #[test]
    fn test_load_valid_bundle() {
        let bundle = FeatureBundle::from_json(sample_bundle_json()).unwrap();

        assert_eq!(bundle.selected_features.len(), 3);
        assert!(bundle.encoder_for("Provider").is_some());
        assert!(bundle.encoder_for("InscClaimAmtReimbursed").is_none());
        assert_eq!(bundle.mismatch_threshold(), DEFAULT_MISMATCH_THRESHOLD);
    }

    #[test]
    fn test_missing_selected_features_is_configuration_error() {
        let result = FeatureBundle::from_json(r#"{"label_encoders": {}}"#);
        assert!(matches!(result, Err(VectorizeError::Configuration(_))));

        let result = FeatureBundle::from_json(r#"{"selected_features": []}"#);
        assert!(matches!(result, Err(VectorizeError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let result =
            FeatureBundle::from_json(r#"{"selected_features": ["Provider", "Provider"]}"#);
        assert!(matches!(result, Err(VectorizeError::Configuration(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = FeatureBundle::from_json("not json at all");
        assert!(matches!(result, Err(VectorizeError::Json(_))));
    }

    #[test]
    fn test_unknown_fallback_order() {
        // Declared unknown_index wins over the sentinel entry
        let encoder = LabelEncoder {
            mapping: HashMap::from([
                ("A".to_string(), 0),
                ("B".to_string(), 1),
                ("Unknown".to_string(), 9),
            ]),
            unknown_index: Some(2),
        };
        assert_eq!(encoder.encode("A"), 0);
        assert_eq!(encoder.encode("C"), 2);

        // Without unknown_index the sentinel entry is used
        let encoder = LabelEncoder {
            mapping: HashMap::from([("A".to_string(), 0), ("Unknown".to_string(), 9)]),
            unknown_index: None,
        };
        assert_eq!(encoder.encode("C"), 9);

        // Without either, index 0
        let encoder = LabelEncoder {
            mapping: HashMap::from([("A".to_string(), 3)]),
            unknown_index: None,
        };
        assert_eq!(encoder.encode("C"), 0);
    }

    #[test]
    fn test_scaler_factors() {
        let scaler = ScalerStats {
            mean: vec![Some(10.0), None, Some(5.0)],
            scale: vec![Some(2.0), Some(1.0), Some(0.0)],
        };

        assert_eq!(scaler.factors(0), Some((10.0, 2.0)));
        assert_eq!(scaler.factors(1), None); // mean is null
        assert_eq!(scaler.factors(2), None); // scale is zero
        assert_eq!(scaler.factors(7), None); // out of range
    }

    #[test]
    fn test_misaligned_scaler_still_loads() {
        let json = r#"{
            "selected_features": ["A", "B"],
            "scaler": {"mean_": [1.0], "scale_": [1.0]}
        }"#;
        let bundle = FeatureBundle::from_json(json).unwrap();
        assert!(!bundle.scaler.as_ref().unwrap().aligned_to(2));
        assert!(!bundle.describe().scaler_aligned);
    }

    #[test]
    fn test_describe() {
        let bundle = FeatureBundle::from_json(sample_bundle_json()).unwrap();
        let info = bundle.describe();

        assert_eq!(info.feature_count, 3);
        assert_eq!(info.version_marker, "2024-06-bundle");
        assert_eq!(info.feature_preview[0], "Provider");
        assert_eq!(info.categorical_count, 1);
        assert!(info.scaler_aligned);
    }

    #[test]
    fn test_threshold_override() {
        let json = r#"{"selected_features": ["A"], "mismatch_threshold": 100.0}"#;
        let bundle = FeatureBundle::from_json(json).unwrap();
        assert_eq!(bundle.mismatch_threshold(), 100.0);
    }
}
