//! One logged prediction

use chrono::{NaiveDateTime, Timelike};
use serde_json::{Map, Value};

use super::{PREDICTION_COLUMN, TIMESTAMP_COLUMN, TIMESTAMP_FORMAT};
use crate::schema::FeatureRecord;

/// A prediction as it is stored in the result log
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    features: FeatureRecord,
    prediction: f64,
    timestamp: NaiveDateTime,
}

impl PredictionRecord {
    /// Builds a record; the timestamp is truncated to whole seconds
    pub fn new(features: FeatureRecord, prediction: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            features,
            prediction,
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
        }
    }

    pub fn features(&self) -> &FeatureRecord {
        &self.features
    }

    /// Predicted wear in µm
    pub fn prediction(&self) -> f64 {
        self.prediction
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Timestamp as written to the log
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Log header for this record: feature names, then prediction, then timestamp
    pub fn header(&self) -> Vec<String> {
        let mut header = self.features.names().to_vec();
        header.push(PREDICTION_COLUMN.to_string());
        header.push(TIMESTAMP_COLUMN.to_string());
        header
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        let mut row: Vec<String> = self.features.values().iter().map(f64::to_string).collect();
        row.push(self.prediction.to_string());
        row.push(self.timestamp_string());
        row
    }

    /// Parses one log row against the log's header
    pub(crate) fn from_row(header: &[String], row: &csv::StringRecord) -> Result<Self, String> {
        if row.len() != header.len() {
            return Err(format!(
                "row has {} fields, header has {}",
                row.len(),
                header.len()
            ));
        }

        let mut names = Vec::with_capacity(header.len().saturating_sub(2));
        let mut values = Vec::with_capacity(header.len().saturating_sub(2));
        let mut prediction = None;
        let mut timestamp = None;

        for (column, cell) in header.iter().zip(row.iter()) {
            if column == TIMESTAMP_COLUMN {
                let parsed = NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT)
                    .map_err(|e| format!("bad timestamp '{}': {}", cell, e))?;
                timestamp = Some(parsed);
            } else {
                let value: f64 = cell
                    .parse()
                    .map_err(|_| format!("column '{}' holds non-numeric '{}'", column, cell))?;
                if column == PREDICTION_COLUMN {
                    prediction = Some(value);
                } else {
                    names.push(column.clone());
                    values.push(value);
                }
            }
        }

        let prediction = prediction.ok_or_else(|| format!("missing '{}'", PREDICTION_COLUMN))?;
        let timestamp = timestamp.ok_or_else(|| format!("missing '{}'", TIMESTAMP_COLUMN))?;
        let features = FeatureRecord::from_columns(names, values).map_err(|e| e.to_string())?;

        Ok(Self::new(features, prediction, timestamp))
    }

    /// JSON view for CLI output
    pub fn to_json(&self) -> Value {
        let mut features = Map::new();
        for (name, value) in self.features.iter() {
            features.insert(name.to_string(), Value::from(value));
        }
        if let Some(material) = self.features.material() {
            features.insert(
                crate::schema::MATERIAL_FIELD.to_string(),
                Value::from(material.label()),
            );
        }

        let mut object = Map::new();
        object.insert("features".into(), Value::Object(features));
        object.insert("prediction".into(), Value::from(self.prediction));
        object.insert("timestamp".into(), Value::from(self.timestamp_string()));
        Value::Object(object)
    }
}
