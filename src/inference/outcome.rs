//! Threshold classification and the per-request result

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::ErrorCode;
use crate::results::ResultLogError;

/// Operator-facing verdict on a predicted wear value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WearOutcome {
    /// Prediction at or above the threshold: replace the tool
    Exceeded,
    /// Prediction below the threshold
    Usable,
}

impl WearOutcome {
    /// The boundary is inclusive: `prediction == threshold` is `Exceeded`
    pub fn classify(prediction: f64, threshold: f64) -> Self {
        if prediction >= threshold {
            WearOutcome::Exceeded
        } else {
            WearOutcome::Usable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WearOutcome::Exceeded => "EXCEEDED",
            WearOutcome::Usable => "USABLE",
        }
    }

    /// Advice shown next to the verdict
    pub fn message(&self) -> &'static str {
        match self {
            WearOutcome::Exceeded => "Tool wear limit exceeded. Replace immediately.",
            WearOutcome::Usable => "Tool is in usable condition.",
        }
    }
}

impl fmt::Display for WearOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one served prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    /// Predicted wear in µm, never negative
    pub prediction: f64,
    pub outcome: WearOutcome,
    pub threshold: f64,
    /// The raw model output was negative and has been raised to zero
    pub clamped: bool,
    /// Result log failure; the prediction is still valid
    pub log_warning: Option<ResultLogError>,
}

impl PredictionOutcome {
    pub fn is_exceeded(&self) -> bool {
        self.outcome == WearOutcome::Exceeded
    }

    /// Response payload for the CLI
    pub fn to_json(&self) -> Value {
        let mut data = json!({
            "prediction": self.prediction,
            "outcome": self.outcome,
            "threshold": self.threshold,
            "message": self.outcome.message(),
        });
        if self.clamped {
            data["clamped"] = Value::Bool(true);
        }
        if let Some(warning) = &self.log_warning {
            data["log_warning"] = json!({
                "code": warning.code(),
                "message": warning.to_string(),
            });
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(WearOutcome::classify(60.0, 60.0), WearOutcome::Exceeded);
        assert_eq!(WearOutcome::classify(60.0001, 60.0), WearOutcome::Exceeded);
        assert_eq!(WearOutcome::classify(59.999, 60.0), WearOutcome::Usable);
        assert_eq!(WearOutcome::classify(0.0, 0.0), WearOutcome::Exceeded);
    }

    #[test]
    fn test_outcome_serializes_uppercase() {
        assert_eq!(serde_json::to_value(WearOutcome::Exceeded).unwrap(), "EXCEEDED");
        assert_eq!(serde_json::to_value(WearOutcome::Usable).unwrap(), "USABLE");
    }

    #[test]
    fn test_to_json_carries_warning() {
        let outcome = PredictionOutcome {
            prediction: 45.5,
            outcome: WearOutcome::Usable,
            threshold: 60.0,
            clamped: false,
            log_warning: Some(ResultLogError::WriteFailed {
                path: "results.csv".into(),
                reason: "read-only file system".into(),
            }),
        };
        let json = outcome.to_json();
        assert_eq!(json["prediction"], 45.5);
        assert_eq!(json["outcome"], "USABLE");
        assert_eq!(json["log_warning"]["code"], "TOOLWEAR_LOG_WRITE_FAILED");
        assert!(json.get("clamped").is_none());
    }

    #[test]
    fn test_to_json_without_warning() {
        let outcome = PredictionOutcome {
            prediction: 0.0,
            outcome: WearOutcome::Exceeded,
            threshold: 0.0,
            clamped: true,
            log_warning: None,
        };
        let json = outcome.to_json();
        assert_eq!(json["clamped"], true);
        assert!(json.get("log_warning").is_none());
        assert!(outcome.is_exceeded());
    }
}
