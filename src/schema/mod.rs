//! Feature schema subsystem
//!
//! The ordered feature names a model is trained on, the closed material
//! enumeration, and the alignment of raw request parameters to a schema.
//! Training and inference both depend on this module and on nothing else
//! for the encoding, so the two sides cannot drift apart.
//!
//! # Design Principles
//!
//! - One shared material mapping
//! - Exact field sets (no padding, truncation or defaults)
//! - Schema order wins over input order

mod errors;
mod material;
mod types;
mod validator;

pub use errors::{MismatchDetails, SchemaError, SchemaResult};
pub use material::Material;
pub use types::{FeatureRecord, FeatureSchema, CANONICAL_FIELDS, MATERIAL_FIELD};
pub use validator::RawParameters;
