//! A forest bound to the feature schema it was trained on

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::errors::{ModelError, ModelResult};
use super::forest::{ForestParams, RandomForest};
use crate::results::TIMESTAMP_FORMAT;
use crate::schema::{FeatureRecord, FeatureSchema};
use crate::training::EvaluationMetrics;

/// The trained model served by the inference engine.
///
/// Immutable once built. The schema travels with the forest so a loaded
/// artifact always knows the feature order it expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    schema: FeatureSchema,
    forest: RandomForest,
    params: ForestParams,
    metrics: EvaluationMetrics,
    trained_at: String,
}

impl TrainedModel {
    /// Binds a fitted forest to its schema.
    ///
    /// Fails with `Incompatible` if the forest was fitted on a different
    /// number of features than the schema declares.
    pub fn new(
        schema: FeatureSchema,
        forest: RandomForest,
        params: ForestParams,
        metrics: EvaluationMetrics,
    ) -> ModelResult<Self> {
        let model = Self {
            schema,
            forest,
            params,
            metrics,
            trained_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Feature names in the order the forest expects them
    pub fn expected_features(&self) -> &[String] {
        self.schema.fields()
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Held-out metrics recorded at training time
    pub fn metrics(&self) -> &EvaluationMetrics {
        &self.metrics
    }

    pub fn trained_at(&self) -> &str {
        &self.trained_at
    }

    /// Predicts wear for a record aligned to this model's schema
    pub fn predict(&self, record: &FeatureRecord) -> ModelResult<f64> {
        if record.names() != self.schema.fields() {
            return Err(ModelError::FeatureOrderMismatch);
        }
        self.forest.predict(record.values())
    }

    /// Importance per feature, in schema order
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        self.schema
            .fields()
            .iter()
            .cloned()
            .zip(self.forest.importances().iter().copied())
            .collect()
    }

    /// Checks internal consistency after construction or deserialization
    pub fn validate(&self) -> ModelResult<()> {
        if self.forest.n_features() != self.schema.len() {
            return Err(ModelError::Incompatible(format!(
                "forest expects {} features but schema lists {}",
                self.forest.n_features(),
                self.schema.len()
            )));
        }
        self.forest.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawParameters, CANONICAL_FIELDS};

    fn tiny_model() -> TrainedModel {
        let schema = FeatureSchema::canonical();
        let rows: Vec<Vec<f64>> = (0..12)
            .map(|i| {
                let mut row = vec![1.0; schema.len()];
                row[0] = 100.0 + i as f64;
                row[7] = (i % 3) as f64;
                row
            })
            .collect();
        let targets: Vec<f64> = (0..12).map(|i| 30.0 + i as f64).collect();
        let params = ForestParams {
            n_trees: 5,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(&rows, &targets, &params).unwrap();
        TrainedModel::new(schema, forest, params, EvaluationMetrics::default()).unwrap()
    }

    fn unit_params() -> RawParameters {
        let mut raw = RawParameters::new().with_material("Steel");
        for field in &CANONICAL_FIELDS[..7] {
            raw.set(*field, 1.0);
        }
        raw
    }

    #[test]
    fn test_predict_aligned_record() {
        let model = tiny_model();
        let record = model.schema().align(&unit_params()).unwrap();
        let prediction = model.predict(&record).unwrap();
        assert!(prediction.is_finite());
        assert!((30.0..=41.0).contains(&prediction));
    }

    #[test]
    fn test_foreign_order_rejected() {
        let model = tiny_model();
        let mut fields: Vec<String> = model.expected_features().to_vec();
        fields.swap(0, 1);
        let other = FeatureSchema::from_fields(fields).unwrap();
        let record = other.align(&unit_params()).unwrap();

        let err = model.predict(&record).unwrap_err();
        assert_eq!(err, ModelError::FeatureOrderMismatch);
    }

    #[test]
    fn test_feature_importances_follow_schema() {
        let model = tiny_model();
        let importances = model.feature_importances();
        assert_eq!(importances.len(), 8);
        assert_eq!(importances[0].0, CANONICAL_FIELDS[0]);
        assert!(importances.iter().all(|(_, v)| *v >= 0.0));
    }

    #[test]
    fn test_forest_schema_width_checked() {
        let rows = vec![vec![1.0, 2.0], vec![2.0, 3.0]];
        let params = ForestParams {
            n_trees: 1,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(&rows, &[1.0, 2.0], &params).unwrap();
        let err = TrainedModel::new(
            FeatureSchema::canonical(),
            forest,
            params,
            EvaluationMetrics::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Incompatible(_)));
    }
}
