//! Labeled training dataset
//!
//! A CSV file with a header row. Columns are every numeric feature, the raw
//! material label under `Material Type`, and the target under
//! `Tool Wear (µm)`, in any order. The feature columns' order becomes the
//! model's feature order.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::errors::{TrainingError, TrainingResult};
use crate::schema::{FeatureSchema, Material, MismatchDetails, SchemaError, MATERIAL_FIELD};

/// Ground-truth wear column
pub const TARGET_COLUMN: &str = "Tool Wear (µm)";

/// Encoded training rows plus targets
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset {
    schema: FeatureSchema,
    rows: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl LabeledDataset {
    /// Loads a dataset file.
    ///
    /// # Errors
    ///
    /// - `DatasetMissing` / `DatasetUnreadable` for file problems
    /// - `SchemaMismatch` if columns are missing or unexpected
    /// - `Encoding` for an unknown material label
    /// - `MalformedRow` for ragged rows or non-numeric cells
    /// - `InsufficientData` if the file is empty or has no data rows
    pub fn load(path: &Path) -> TrainingResult<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                TrainingError::DatasetMissing {
                    path: path.display().to_string(),
                }
            } else {
                TrainingError::DatasetUnreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        Self::from_reader(file).map_err(|e| match e {
            TrainingError::DatasetUnreadable { reason, .. } => TrainingError::DatasetUnreadable {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parses a dataset from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> TrainingResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| TrainingError::DatasetUnreadable {
                path: "<reader>".into(),
                reason: e.to_string(),
            })?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(TrainingError::InsufficientData(
                "dataset is empty, not even a header row".into(),
            ));
        }

        let (schema, target_index, feature_indices) = resolve_columns(&headers)?;
        let material_position = schema.position(MATERIAL_FIELD);

        let mut rows = Vec::new();
        let mut targets = Vec::new();

        for (i, result) in csv_reader.records().enumerate() {
            // header is row 1
            let row_number = i + 2;
            let record = result.map_err(|e| TrainingError::MalformedRow {
                row: row_number,
                reason: e.to_string(),
            })?;

            let mut row = Vec::with_capacity(feature_indices.len());
            for (position, &column) in feature_indices.iter().enumerate() {
                let cell = record.get(column).unwrap_or_default();
                if Some(position) == material_position {
                    let code = Material::encode(cell).map_err(|source| TrainingError::Encoding {
                        row: row_number,
                        source,
                    })?;
                    row.push(f64::from(code));
                } else {
                    row.push(parse_cell(cell, &headers[column], row_number)?);
                }
            }

            let target_cell = record.get(target_index).unwrap_or_default();
            targets.push(parse_cell(target_cell, TARGET_COLUMN, row_number)?);
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(TrainingError::InsufficientData(
                "dataset has a header but no rows".into(),
            ));
        }

        Ok(Self {
            schema,
            rows,
            targets,
        })
    }

    /// Feature order taken from the dataset header
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copies out the rows and targets at `indices`
    pub fn subset(&self, indices: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
        let targets = indices.iter().map(|&i| self.targets[i]).collect();
        (rows, targets)
    }
}

/// Works out the feature schema and where each column lives in the file
fn resolve_columns(headers: &[String]) -> TrainingResult<(FeatureSchema, usize, Vec<usize>)> {
    let target_index = headers.iter().position(|h| h == TARGET_COLUMN);

    let feature_indices: Vec<usize> = (0..headers.len())
        .filter(|&i| headers[i] != TARGET_COLUMN)
        .collect();
    let feature_names: Vec<String> = feature_indices
        .iter()
        .map(|&i| headers[i].clone())
        .collect();

    let schema = match FeatureSchema::from_fields(feature_names) {
        Ok(schema) => schema,
        Err(SchemaError::Mismatch(mut details)) => {
            if target_index.is_none() {
                details.missing.push(TARGET_COLUMN.to_string());
            }
            return Err(SchemaError::Mismatch(details).into());
        }
        Err(e) => return Err(e.into()),
    };

    let target_index = target_index.ok_or_else(|| {
        TrainingError::from(SchemaError::Mismatch(MismatchDetails::missing_field(
            TARGET_COLUMN,
        )))
    })?;

    Ok((schema, target_index, feature_indices))
}

fn parse_cell(cell: &str, column: &str, row: usize) -> TrainingResult<f64> {
    let value: f64 = cell.parse().map_err(|_| TrainingError::MalformedRow {
        row,
        reason: format!("column '{}' holds '{}', expected a number", column, cell),
    })?;
    if !value.is_finite() {
        return Err(TrainingError::MalformedRow {
            row,
            reason: format!("column '{}' holds non-finite value '{}'", column, cell),
        });
    }
    Ok(value)
}
