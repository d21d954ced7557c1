//! Feature schema and feature record types
//!
//! A `FeatureSchema` is the ordered list of field names a model was trained
//! on. Its order is fixed by the training dataset; its contents are always
//! exactly the canonical fields below.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::errors::{MismatchDetails, SchemaError, SchemaResult};
use super::material::Material;

/// Categorical field holding the encoded material
pub const MATERIAL_FIELD: &str = "Material Type";

/// Every field a model is trained on, in the reference order
pub const CANONICAL_FIELDS: [&str; 8] = [
    "Cutting Speed (m/min)",
    "Feed Rate (mm/rev)",
    "Depth of Cut (mm)",
    "Spindle Speed (RPM)",
    "Temperature (°C)",
    "Tool Usage Time (min)",
    "Vibration (mm/s²)",
    MATERIAL_FIELD,
];

/// Ordered feature names bound to a trained model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    fields: Vec<String>,
}

impl FeatureSchema {
    /// Returns the schema in reference order
    pub fn canonical() -> Self {
        Self {
            fields: CANONICAL_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Builds a schema from an ordered list of names.
    ///
    /// The names must be a permutation of the canonical fields. Missing or
    /// unknown names produce `SchemaError::Mismatch`; duplicates produce
    /// `SchemaError::InvalidSchema`.
    pub fn from_fields(fields: Vec<String>) -> SchemaResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.as_str()) {
                return Err(SchemaError::InvalidSchema(format!(
                    "field '{}' appears more than once",
                    field
                )));
            }
        }

        let missing: Vec<String> = CANONICAL_FIELDS
            .iter()
            .filter(|f| !seen.contains(**f))
            .map(|f| f.to_string())
            .collect();
        let extra: Vec<String> = fields
            .iter()
            .filter(|f| !CANONICAL_FIELDS.contains(&f.as_str()))
            .cloned()
            .collect();

        let details = MismatchDetails::new(missing, extra);
        if !details.is_empty() {
            return Err(SchemaError::Mismatch(details));
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the column index of a field
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = SchemaError;

    fn try_from(fields: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.fields
    }
}

/// One machining configuration, aligned to a schema and already encoded
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureRecord {
    /// Pairs column names with values.
    ///
    /// Used when rows come back from the result log, whose header may
    /// predate the current model.
    pub fn from_columns(names: Vec<String>, values: Vec<f64>) -> SchemaResult<Self> {
        if names.len() != values.len() {
            return Err(SchemaError::InvalidSchema(format!(
                "{} names for {} values",
                names.len(),
                values.len()
            )));
        }
        Ok(Self { names, values })
    }

    pub(crate) fn aligned(schema: &FeatureSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self {
            names: schema.fields().to_vec(),
            values,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Decodes the material column, if the record has one
    pub fn material(&self) -> Option<Material> {
        self.get(MATERIAL_FIELD)
            .and_then(|code| Material::decode(code).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
