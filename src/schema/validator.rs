//! Aligns raw request parameters to a feature schema
//!
//! Alignment semantics:
//! - The material label is encoded through `Material`, never re-derived
//! - Every schema field must be supplied
//! - No undeclared fields may be supplied
//! - Numeric values must be finite
//! - Output order is the schema's order, whatever order the input used
//!
//! Nothing is padded, truncated or defaulted.

use std::collections::BTreeMap;

use serde_json::Value;

use super::errors::{MismatchDetails, SchemaError, SchemaResult};
use super::material::Material;
use super::types::{FeatureRecord, FeatureSchema, MATERIAL_FIELD};

/// Human-facing parameters for one prediction request.
///
/// Numeric fields are keyed by their schema name; the material is kept as
/// its raw label until alignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParameters {
    numeric: BTreeMap<String, f64>,
    material: Option<String>,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a numeric field
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Sets the raw material label
    pub fn with_material(mut self, label: impl Into<String>) -> Self {
        self.set_material(label);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.numeric.insert(name.into(), value);
    }

    pub fn set_material(&mut self, label: impl Into<String>) {
        self.material = Some(label.into());
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn numeric(&self) -> &BTreeMap<String, f64> {
        &self.numeric
    }

    /// Parses a JSON object of `name -> number`, with the material given as
    /// its label string under `"Material Type"`.
    pub fn from_json(value: &Value) -> SchemaResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            SchemaError::invalid_value("$root", "object", json_type_name(value))
        })?;

        let mut params = Self::new();
        for (name, field) in obj {
            if name == MATERIAL_FIELD {
                let label = field.as_str().ok_or_else(|| {
                    SchemaError::invalid_value(name, "material label", json_type_name(field))
                })?;
                params.set_material(label);
            } else {
                let number = field.as_f64().ok_or_else(|| {
                    SchemaError::invalid_value(name, "number", json_type_name(field))
                })?;
                params.set(name.clone(), number);
            }
        }

        Ok(params)
    }
}

impl FeatureSchema {
    /// Builds a `FeatureRecord` in this schema's order.
    ///
    /// # Errors
    ///
    /// - `UnknownMaterial` if the label is outside the enumeration
    /// - `Mismatch` naming every missing and every undeclared field
    /// - `InvalidValue` for non-finite numbers or a numeric material
    pub fn align(&self, raw: &RawParameters) -> SchemaResult<FeatureRecord> {
        let material_code = raw.material().map(Material::encode).transpose()?;

        if raw.numeric().contains_key(MATERIAL_FIELD) {
            return Err(SchemaError::invalid_value(
                MATERIAL_FIELD,
                "material label",
                "number",
            ));
        }

        let mut missing = Vec::new();
        for field in self.fields() {
            let present = if field == MATERIAL_FIELD {
                material_code.is_some()
            } else {
                raw.numeric().contains_key(field)
            };
            if !present {
                missing.push(field.clone());
            }
        }

        let mut extra: Vec<String> = raw
            .numeric()
            .keys()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect();
        if material_code.is_some() && !self.contains(MATERIAL_FIELD) {
            extra.push(MATERIAL_FIELD.to_string());
        }

        let details = MismatchDetails::new(missing, extra);
        if !details.is_empty() {
            return Err(SchemaError::Mismatch(details));
        }

        let mut values = Vec::with_capacity(self.len());
        for field in self.fields() {
            if field == MATERIAL_FIELD {
                // presence checked above
                values.push(f64::from(material_code.unwrap_or_default()));
                continue;
            }
            let value = raw.numeric()[field];
            if !value.is_finite() {
                return Err(SchemaError::invalid_value(
                    field,
                    "finite number",
                    value.to_string(),
                ));
            }
            values.push(value);
        }

        Ok(FeatureRecord::aligned(self, values))
    }
}

/// Returns JSON type name for error messages
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_params() -> RawParameters {
        RawParameters::new()
            .with("Cutting Speed (m/min)", 120.0)
            .with("Feed Rate (mm/rev)", 0.3)
            .with("Depth of Cut (mm)", 1.5)
            .with("Spindle Speed (RPM)", 1500.0)
            .with("Temperature (°C)", 80.0)
            .with("Tool Usage Time (min)", 30.0)
            .with("Vibration (mm/s²)", 0.02)
            .with_material("Titanium")
    }

    #[test]
    fn test_align_follows_schema_order() {
        let mut fields: Vec<String> = FeatureSchema::canonical().fields().to_vec();
        fields.rotate_left(3);
        let schema = FeatureSchema::from_fields(fields.clone()).unwrap();

        let record = schema.align(&full_params()).unwrap();
        assert_eq!(record.names(), fields.as_slice());
        assert_eq!(record.get("Cutting Speed (m/min)"), Some(120.0));
        assert_eq!(record.get(MATERIAL_FIELD), Some(1.0));
        assert_eq!(record.values()[0], 1500.0);
    }

    #[test]
    fn test_missing_field_is_mismatch() {
        let mut params = full_params();
        params.numeric.remove("Temperature (°C)");

        let err = FeatureSchema::canonical().align(&params).unwrap_err();
        let details = err.mismatch().unwrap();
        assert_eq!(details.missing, vec!["Temperature (°C)".to_string()]);
        assert!(details.extra.is_empty());
    }

    #[test]
    fn test_missing_material_is_mismatch() {
        let mut params = full_params();
        params.material = None;

        let err = FeatureSchema::canonical().align(&params).unwrap_err();
        assert_eq!(
            err.mismatch().unwrap().missing,
            vec![MATERIAL_FIELD.to_string()]
        );
    }

    #[test]
    fn test_extra_field_is_mismatch() {
        let params = full_params().with("Coolant Flow (L/min)", 4.0);

        let err = FeatureSchema::canonical().align(&params).unwrap_err();
        assert_eq!(
            err.mismatch().unwrap().extra,
            vec!["Coolant Flow (L/min)".to_string()]
        );
    }

    #[test]
    fn test_unknown_material_is_encoding_error() {
        let params = full_params().with_material("Brass");
        let err = FeatureSchema::canonical().align(&params).unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let params = full_params().with("Feed Rate (mm/rev)", f64::NAN);
        let err = FeatureSchema::canonical().align(&params).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { .. }));
    }

    #[test]
    fn test_numeric_material_rejected() {
        let params = full_params().with(MATERIAL_FIELD, 0.0);
        let err = FeatureSchema::canonical().align(&params).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { .. }));
    }

    #[test]
    fn test_from_json() {
        let params = RawParameters::from_json(&json!({
            "Cutting Speed (m/min)": 120,
            "Material Type": "Steel"
        }))
        .unwrap();
        assert_eq!(params.numeric()["Cutting Speed (m/min)"], 120.0);
        assert_eq!(params.material(), Some("Steel"));
    }

    #[test]
    fn test_from_json_type_errors() {
        assert!(RawParameters::from_json(&json!([1, 2])).is_err());
        assert!(RawParameters::from_json(&json!({"Feed Rate (mm/rev)": "fast"})).is_err());
        assert!(RawParameters::from_json(&json!({"Material Type": 2})).is_err());
    }
}
