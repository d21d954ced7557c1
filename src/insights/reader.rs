//! Read-only analytics over the result log

use serde::Serialize;

use super::correlation::CorrelationMatrix;
use super::histogram::Histogram;
use crate::model::TrainedModel;
use crate::results::{sort_newest_first, PredictionRecord, ResultLog, ResultLogError, PREDICTION_COLUMN};

/// An analytic that may not be computable from the current log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Insight<T> {
    Ready(T),
    /// The log holds no predictions
    NoData,
    /// There is data, but not enough of the right kind
    Unavailable(String),
}

impl<T> Insight<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Insight::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Insight::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// A loaded copy of the log that analytics run against
#[derive(Debug, Clone, Default)]
pub struct InsightsReader {
    records: Vec<PredictionRecord>,
    warning: Option<ResultLogError>,
}

impl InsightsReader {
    /// Reads the log once. A corrupted log yields an empty reader carrying
    /// the corruption warning.
    pub fn load(log: &ResultLog) -> Self {
        let snapshot = log.read_all();
        Self {
            records: snapshot.records,
            warning: snapshot.warning,
        }
    }

    pub fn from_records(records: Vec<PredictionRecord>) -> Self {
        Self {
            records,
            warning: None,
        }
    }

    /// Warning raised while reading the log, if any
    pub fn warning(&self) -> Option<&ResultLogError> {
        self.warning.as_ref()
    }

    /// Records in file order
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    /// Every predicted value, in file order
    pub fn distribution(&self) -> Insight<Vec<f64>> {
        if self.records.is_empty() {
            return Insight::NoData;
        }
        Insight::Ready(self.records.iter().map(PredictionRecord::prediction).collect())
    }

    pub fn histogram(&self, bins: usize) -> Insight<Histogram> {
        match self.distribution() {
            Insight::Ready(values) => match Histogram::build(&values, bins) {
                Some(histogram) => Insight::Ready(histogram),
                None => Insight::Unavailable("bin count must be > 0".into()),
            },
            Insight::NoData => Insight::NoData,
            Insight::Unavailable(reason) => Insight::Unavailable(reason),
        }
    }

    /// Pearson correlation across every feature column and the prediction
    pub fn correlation_matrix(&self) -> Insight<CorrelationMatrix> {
        let Some(first) = self.records.first() else {
            return Insight::NoData;
        };

        let names = first.features().names();
        if self
            .records
            .iter()
            .any(|r| r.features().names() != names)
        {
            return Insight::Unavailable("records do not share the same columns".into());
        }

        let mut columns: Vec<String> = names.to_vec();
        columns.push(PREDICTION_COLUMN.to_string());
        if columns.len() < 2 {
            return Insight::Unavailable("fewer than 2 columns".into());
        }
        if self.records.len() < 2 {
            return Insight::Unavailable("fewer than 2 rows".into());
        }

        let mut data: Vec<Vec<f64>> = (0..names.len())
            .map(|i| self.records.iter().map(|r| r.features().values()[i]).collect())
            .collect();
        data.push(self.records.iter().map(PredictionRecord::prediction).collect());

        match CorrelationMatrix::compute(columns, &data) {
            Some(matrix) => Insight::Ready(matrix),
            None => Insight::Unavailable("every column has zero variance".into()),
        }
    }

    /// The `n` newest records, ties going to the later-appended row
    pub fn most_recent(&self, n: usize) -> Vec<PredictionRecord> {
        let mut records = self.records.clone();
        sort_newest_first(&mut records);
        records.truncate(n);
        records
    }
}

/// Feature importances sorted ascending, the order they are displayed in
pub fn feature_ranking(model: &TrainedModel) -> Vec<(String, f64)> {
    let mut ranking = model.feature_importances();
    ranking.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranking
}
