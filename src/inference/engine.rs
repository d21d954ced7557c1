//! Inference engine
//!
//! Holds the trained model and the result log for the lifetime of a
//! serving process. Each request goes through:
//!
//! 1. threshold check
//! 2. alignment of the raw parameters to the model's schema
//! 3. prediction, clamped at zero
//! 4. classification against the threshold
//! 5. append to the result log (failure is a warning, not an error)

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use super::errors::{InferenceError, InferenceResult};
use super::outcome::{PredictionOutcome, WearOutcome};
use crate::errors::ErrorCode;
use crate::model::TrainedModel;
use crate::observability::{log_event, Event};
use crate::results::{PredictionRecord, ResultLog};
use crate::schema::{FeatureRecord, RawParameters};

/// Request key carrying an optional per-request threshold
pub const THRESHOLD_KEY: &str = "threshold";

/// A parsed prediction request
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub parameters: RawParameters,
    pub threshold: Option<f64>,
}

impl PredictionRequest {
    /// Parses a flat JSON object: one entry per feature (material as its
    /// label) plus an optional `"threshold"`.
    pub fn from_json(value: &Value) -> InferenceResult<Self> {
        let mut object = value
            .as_object()
            .cloned()
            .ok_or_else(|| InferenceError::InvalidRequest("request must be a JSON object".into()))?;

        let threshold = match object.remove(THRESHOLD_KEY) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_f64().ok_or_else(|| {
                InferenceError::InvalidRequest(format!("'{}' must be a number", THRESHOLD_KEY))
            })?),
        };

        let parameters = RawParameters::from_json(&Value::Object(object))?;
        Ok(Self {
            parameters,
            threshold,
        })
    }
}

/// The serving-side owner of the model and result log
#[derive(Debug)]
pub struct InferenceEngine {
    model: TrainedModel,
    results: ResultLog,
}

impl InferenceEngine {
    /// Loads the artifact once. Any load failure is `ModelLoad`, which the
    /// caller must treat as fatal.
    pub fn start(model_path: &Path, results: ResultLog) -> InferenceResult<Self> {
        let model = TrainedModel::load(model_path).map_err(InferenceError::ModelLoad)?;
        log_event(
            Event::ModelLoaded,
            &[
                ("features", &model.expected_features().len().to_string()),
                ("path", &model_path.display().to_string()),
                ("trained_at", model.trained_at()),
                ("trees", &model.forest().n_trees().to_string()),
            ],
        );
        Ok(Self::new(model, results))
    }

    pub fn new(model: TrainedModel, results: ResultLog) -> Self {
        Self { model, results }
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn results(&self) -> &ResultLog {
        &self.results
    }

    /// Feature names in the order the model expects them
    pub fn expected_features(&self) -> &[String] {
        self.model.expected_features()
    }

    /// Aligns raw parameters to the model's schema
    pub fn build_record(&self, raw: &RawParameters) -> InferenceResult<FeatureRecord> {
        Ok(self.model.schema().align(raw)?)
    }

    /// Serves one prediction stamped with the local wall clock
    pub fn predict(&self, raw: &RawParameters, threshold: f64) -> InferenceResult<PredictionOutcome> {
        self.predict_at(raw, threshold, Local::now().naive_local())
    }

    /// Serves one prediction with an explicit timestamp
    pub fn predict_at(
        &self,
        raw: &RawParameters,
        threshold: f64,
        timestamp: NaiveDateTime,
    ) -> InferenceResult<PredictionOutcome> {
        match self.serve(raw, threshold, timestamp) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log_event(
                    Event::PredictionRejected,
                    &[("code", e.code()), ("reason", &e.to_string())],
                );
                Err(e)
            }
        }
    }

    fn serve(
        &self,
        raw: &RawParameters,
        threshold: f64,
        timestamp: NaiveDateTime,
    ) -> InferenceResult<PredictionOutcome> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(InferenceError::InvalidThreshold(threshold));
        }

        let features = self.build_record(raw)?;
        let raw_prediction = self
            .model
            .predict(&features)
            .map_err(InferenceError::Prediction)?;

        let clamped = raw_prediction < 0.0;
        let prediction = if clamped {
            log_event(
                Event::PredictionClamped,
                &[("raw_prediction", &raw_prediction.to_string())],
            );
            0.0
        } else {
            raw_prediction
        };

        let outcome = WearOutcome::classify(prediction, threshold);

        let record = PredictionRecord::new(features, prediction, timestamp);
        let log_warning = match self.results.append(&record) {
            Ok(_) => None,
            Err(e) => {
                log_event(
                    Event::LogWriteFailed,
                    &[
                        ("code", e.code()),
                        ("path", &self.results.path().display().to_string()),
                        ("reason", &e.to_string()),
                    ],
                );
                Some(e)
            }
        };

        log_event(
            Event::PredictionServed,
            &[
                ("outcome", outcome.as_str()),
                ("prediction", &format!("{:.2}", prediction)),
                ("threshold", &threshold.to_string()),
            ],
        );

        Ok(PredictionOutcome {
            prediction,
            outcome,
            threshold,
            clamped,
            log_warning,
        })
    }
}
