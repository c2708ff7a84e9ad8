//! Claimvec - Feature vectorization engine for medical-claims scoring models
//!
//! Claimvec converts heterogeneous claim records (arbitrary JSON field names,
//! mixed types, free-text medical codes) into fixed-length numeric feature
//! vectors through a deterministic pipeline: schema normalization →
//! categorical encoding / z-score scaling → mismatch validation.
//!
//! The column order, label encodings, and scaler statistics are supplied by a
//! precomputed [`bundle::FeatureBundle`] loaded once at process start; every
//! vectorization is a pure function of (bundle, input).
//!
//! ## Modules
//!
//! - **bundle**: load and validate the immutable feature bundle
//! - **schema**: normalize arbitrary records onto the canonical claims schema
//! - **encoder**: produce the ordered numeric vector for one record
//! - **validator**: batch-level defense against bundle/schema drift
//! - **pipeline**: the public vectorization API

pub mod bundle;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod validator;

pub use bundle::{BundleInfo, FeatureBundle, LabelEncoder, ScalerStats, BUNDLE_FORMAT};
pub use encoder::FeatureVector;
pub use error::VectorizeError;
pub use pipeline::{vectorize_batch, Vectorizer};
pub use schema::{FieldValue, NormalizedRecord, Normalizer, RawRecord};

/// Claimvec version embedded in diagnostics output
pub const CLAIMVEC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for diagnostics output
pub const PRODUCER_NAME: &str = "claimvec";
