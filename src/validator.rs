//! Post-encoding vector validation
//!
//! A bundle retrained against a different schema still encodes without error;
//! it just produces implausible numbers (an unscaled dollar amount, an index
//! from a stale mapping). This check counts non-finite or out-of-range entries
//! across the whole batch and rejects it wholesale, so operators notice
//! configuration drift immediately instead of receiving silently-degraded
//! predictions for some rows.

use log::warn;

use crate::encoder::FeatureVector;
use crate::error::VectorizeError;

/// Batch-granular sanity check over encoded vectors
pub struct VectorValidator;

impl VectorValidator {
    /// Validate a batch against the magnitude threshold.
    ///
    /// Any entry that is non-finite or whose absolute value exceeds
    /// `threshold` counts as offending; a non-zero count fails the entire
    /// batch with [`VectorizeError::Mismatch`].
    pub fn validate_batch(
        vectors: &[FeatureVector],
        threshold: f64,
    ) -> Result<(), VectorizeError> {
        let mut offending = 0usize;
        let mut total = 0usize;

        for vector in vectors {
            total += vector.len();
            offending += vector
                .iter()
                .filter(|v| !v.is_finite() || v.abs() > threshold)
                .count();
        }

        if offending > 0 {
            warn!("rejecting batch: {offending} of {total} entries outside +/-{threshold}");
            return Err(VectorizeError::Mismatch {
                offending,
                total,
                threshold,
            });
        }

        Ok(())
    }
}
