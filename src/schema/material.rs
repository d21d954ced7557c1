//! Closed material enumeration
//!
//! The one place where material labels map to integer codes. Training and
//! inference both go through here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};

/// Workpiece material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Aluminum,
    Titanium,
    Steel,
}

impl Material {
    /// Every material, in code order
    pub const ALL: [Material; 3] = [Material::Aluminum, Material::Titanium, Material::Steel];

    /// Returns the integer code the model is trained on
    pub fn code(self) -> u8 {
        match self {
            Material::Aluminum => 0,
            Material::Titanium => 1,
            Material::Steel => 2,
        }
    }

    /// Returns the human-facing label
    pub fn label(self) -> &'static str {
        match self {
            Material::Aluminum => "Aluminum",
            Material::Titanium => "Titanium",
            Material::Steel => "Steel",
        }
    }

    /// Parses a label. Surrounding whitespace is ignored, case is not.
    pub fn from_label(label: &str) -> SchemaResult<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label() == trimmed)
            .ok_or_else(|| SchemaError::UnknownMaterial {
                label: label.to_string(),
            })
    }

    pub fn from_code(code: u8) -> SchemaResult<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or_else(|| SchemaError::UnknownMaterialCode {
                code: code.to_string(),
            })
    }

    /// Maps a label straight to its code
    pub fn encode(label: &str) -> SchemaResult<u8> {
        Self::from_label(label).map(Material::code)
    }

    /// Decodes a code stored as a feature value.
    ///
    /// Only the exact values 0.0, 1.0 and 2.0 are accepted.
    pub fn decode(value: f64) -> SchemaResult<Self> {
        if value.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&value) {
            return Err(SchemaError::UnknownMaterialCode {
                code: value.to_string(),
            });
        }
        Self::from_code(value as u8)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Material {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_training_encoding() {
        assert_eq!(Material::encode("Aluminum").unwrap(), 0);
        assert_eq!(Material::encode("Titanium").unwrap(), 1);
        assert_eq!(Material::encode("Steel").unwrap(), 2);
    }

    #[test]
    fn test_label_round_trip() {
        for material in Material::ALL {
            let code = Material::encode(material.label()).unwrap();
            let decoded = Material::decode(f64::from(code)).unwrap();
            assert_eq!(decoded.label(), material.label());
        }
    }

    #[test]
    fn test_unknown_label_never_defaults() {
        for label in ["Brass", "aluminum", "", "0"] {
            let err = Material::encode(label).unwrap_err();
            assert!(err.is_encoding(), "label {:?} should fail to encode", label);
        }
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(Material::from_label(" Steel ").unwrap(), Material::Steel);
    }

    #[test]
    fn test_decode_rejects_non_codes() {
        assert!(Material::decode(1.5).is_err());
        assert!(Material::decode(3.0).is_err());
        assert!(Material::decode(-1.0).is_err());
        assert!(Material::decode(f64::NAN).is_err());
    }

    #[test]
    fn test_from_str() {
        let material: Material = "Titanium".parse().unwrap();
        assert_eq!(material, Material::Titanium);
        assert_eq!(material.to_string(), "Titanium");
    }
}
