//! Prediction Pipeline Tests
//!
//! End to end: labeled CSV -> trained artifact -> inference engine ->
//! result log -> insights.
//!
//! Test Categories:
//! 1. Training and artifact persistence
//! 2. Serving and classification
//! 3. Logging of served predictions
//! 4. Insights over the log

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;
use toolwear::cli::{serve_loop, Config};
use toolwear::errors::ErrorCode;
use toolwear::inference::{InferenceEngine, InferenceError, PredictionRequest, WearOutcome};
use toolwear::insights::{feature_ranking, Insight, InsightsReader};
use toolwear::model::TrainedModel;
use toolwear::observability::MetricsRegistry;
use toolwear::results::ResultLog;
use toolwear::schema::{RawParameters, CANONICAL_FIELDS};
use toolwear::training::{train_and_save, TrainingConfig, TrainingError, TARGET_COLUMN};

// =============================================================================
// Helper Functions
// =============================================================================

const MATERIALS: [&str; 3] = ["Aluminum", "Titanium", "Steel"];

/// Wear grows linearly with usage time; everything else is noise-free.
fn write_dataset(dir: &Path, rows: usize) -> PathBuf {
    let mut content = CANONICAL_FIELDS.join(",");
    content.push(',');
    content.push_str(TARGET_COLUMN);
    content.push('\n');

    for i in 0..rows {
        let usage = (i % 60) as f64;
        let speed = 110.0 + ((i / 7) % 5) as f64 * 5.0;
        content.push_str(&format!(
            "{},0.3,1.5,1500,80,{},0.02,{},{}\n",
            speed,
            usage,
            MATERIALS[(i / 60) % 3],
            15.0 + usage
        ));
    }

    let path = dir.join("dataset.csv");
    fs::write(&path, content).unwrap();
    path
}

fn small_config() -> TrainingConfig {
    TrainingConfig {
        n_trees: 15,
        ..TrainingConfig::default()
    }
}

fn params(usage: f64, material: &str) -> RawParameters {
    RawParameters::new()
        .with("Cutting Speed (m/min)", 120.0)
        .with("Feed Rate (mm/rev)", 0.3)
        .with("Depth of Cut (mm)", 1.5)
        .with("Spindle Speed (RPM)", 1500.0)
        .with("Temperature (°C)", 80.0)
        .with("Tool Usage Time (min)", usage)
        .with("Vibration (mm/s²)", 0.02)
        .with_material(material)
}

struct Fixture {
    _tmp: TempDir,
    model_path: PathBuf,
    results_path: PathBuf,
}

fn trained_fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let dataset = write_dataset(tmp.path(), 180);
    let model_path = tmp.path().join("models").join("rf_model.json");
    let results_path = tmp.path().join("results.csv");

    train_and_save(&dataset, &model_path, &small_config()).unwrap();

    Fixture {
        _tmp: tmp,
        model_path,
        results_path,
    }
}

fn start(fixture: &Fixture) -> InferenceEngine {
    InferenceEngine::start(&fixture.model_path, ResultLog::new(&fixture.results_path)).unwrap()
}

// =============================================================================
// Training Tests
// =============================================================================

/// Training writes a loadable artifact bound to the dataset's columns.
#[test]
fn test_training_writes_loadable_artifact() {
    let tmp = TempDir::new().unwrap();
    let dataset = write_dataset(tmp.path(), 120);
    let model_path = tmp.path().join("rf_model.json");

    let report = train_and_save(&dataset, &model_path, &small_config()).unwrap();
    assert_eq!(report.metrics.train_rows, 96);
    assert_eq!(report.metrics.test_rows, 24);
    assert!(report.metrics.mse.unwrap() >= 0.0);

    let loaded = TrainedModel::load(&model_path).unwrap();
    assert_eq!(loaded, report.model);
    assert_eq!(loaded.expected_features(), CANONICAL_FIELDS.as_slice());
}

/// Same data and seed give the same model.
#[test]
fn test_training_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    let dataset = write_dataset(tmp.path(), 90);

    let a = train_and_save(&dataset, &tmp.path().join("a.json"), &small_config()).unwrap();
    let b = train_and_save(&dataset, &tmp.path().join("b.json"), &small_config()).unwrap();
    assert_eq!(a.model.forest(), b.model.forest());
    assert_eq!(a.metrics, b.metrics);
}

/// A failed run leaves the previous artifact untouched.
#[test]
fn test_failed_training_keeps_previous_artifact() {
    let fixture = trained_fixture();
    let before = fs::read(&fixture.model_path).unwrap();

    let bad = fixture.model_path.parent().unwrap().join("bad.csv");
    fs::write(&bad, "Cutting Speed (m/min),Tool Wear (µm)\n120,45\n").unwrap();

    let err = train_and_save(&bad, &fixture.model_path, &small_config()).unwrap_err();
    assert_eq!(err.code(), "TOOLWEAR_SCHEMA_MISMATCH");
    assert_eq!(fs::read(&fixture.model_path).unwrap(), before);
}

/// Missing dataset is reported as such.
#[test]
fn test_missing_dataset() {
    let tmp = TempDir::new().unwrap();
    let err = train_and_save(
        &tmp.path().join("nope.csv"),
        &tmp.path().join("rf_model.json"),
        &small_config(),
    )
    .unwrap_err();
    assert!(matches!(err, TrainingError::DatasetMissing { .. }));
    assert!(!tmp.path().join("rf_model.json").exists());
}

// =============================================================================
// Serving Tests
// =============================================================================

/// Typical parameters near 45 µm wear are usable under a 60 µm threshold.
#[test]
fn test_typical_request_is_usable() {
    let fixture = trained_fixture();
    let engine = start(&fixture);

    let outcome = engine.predict(&params(30.0, "Aluminum"), 60.0).unwrap();
    assert!(outcome.prediction >= 0.0);
    assert!((outcome.prediction - 45.0).abs() < 10.0);
    assert_eq!(outcome.outcome, WearOutcome::Usable);
    assert!(outcome.log_warning.is_none());
}

/// A prediction equal to the threshold is EXCEEDED.
#[test]
fn test_threshold_equality_is_exceeded() {
    let fixture = trained_fixture();
    let engine = start(&fixture);

    let first = engine.predict(&params(30.0, "Aluminum"), 60.0).unwrap();
    let second = engine
        .predict(&params(30.0, "Aluminum"), first.prediction)
        .unwrap();

    assert_eq!(second.prediction, first.prediction);
    assert_eq!(second.outcome, WearOutcome::Exceeded);
}

/// Unknown material is rejected and nothing is logged.
#[test]
fn test_unknown_material_rejected_without_logging() {
    let fixture = trained_fixture();
    let engine = start(&fixture);

    let err = engine.predict(&params(30.0, "Copper"), 60.0).unwrap_err();
    assert!(matches!(err, InferenceError::Encoding(_)));
    assert!(!fixture.results_path.exists());
}

/// Missing artifact is a fatal startup error.
#[test]
fn test_missing_model_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let err = InferenceEngine::start(
        &tmp.path().join("rf_model.json"),
        ResultLog::new(tmp.path().join("results.csv")),
    )
    .unwrap_err();
    assert_eq!(err.code(), "TOOLWEAR_MODEL_LOAD_FAILED");
    assert!(err.is_fatal());
}

/// Requests parse from flat JSON with an optional threshold.
#[test]
fn test_request_from_json() {
    let request = PredictionRequest::from_json(&json!({
        "Cutting Speed (m/min)": 120,
        "Feed Rate (mm/rev)": 0.3,
        "Depth of Cut (mm)": 1.5,
        "Spindle Speed (RPM)": 1500,
        "Temperature (°C)": 80,
        "Tool Usage Time (min)": 30,
        "Vibration (mm/s²)": 0.02,
        "Material Type": "Aluminum",
        "threshold": 50
    }))
    .unwrap();

    assert_eq!(request.threshold, Some(50.0));
    assert_eq!(request.parameters, params(30.0, "Aluminum"));
}

// =============================================================================
// Result Log Tests
// =============================================================================

/// Each served prediction appends one row with the exact features.
#[test]
fn test_served_prediction_is_logged() {
    let fixture = trained_fixture();
    let engine = start(&fixture);

    let outcome = engine.predict(&params(30.0, "Aluminum"), 60.0).unwrap();

    let snapshot = engine.results().read_all();
    assert_eq!(snapshot.records.len(), 1);
    let logged = &snapshot.records[0];
    assert_eq!(logged.prediction(), outcome.prediction);
    assert_eq!(logged.features().names(), CANONICAL_FIELDS.as_slice());
    assert_eq!(
        logged.features().values(),
        [120.0, 0.3, 1.5, 1500.0, 80.0, 30.0, 0.02, 0.0].as_slice()
    );
    assert!(!logged.timestamp_string().is_empty());
}

/// Serving loop answers and logs each request over one loaded model.
#[test]
fn test_serve_loop_end_to_end() {
    let fixture = trained_fixture();
    let engine = start(&fixture);
    let metrics = MetricsRegistry::new();

    let base = json!({
        "Cutting Speed (m/min)": 120,
        "Feed Rate (mm/rev)": 0.3,
        "Depth of Cut (mm)": 1.5,
        "Spindle Speed (RPM)": 1500,
        "Temperature (°C)": 80,
        "Tool Usage Time (min)": 30,
        "Vibration (mm/s²)": 0.02,
        "Material Type": "Titanium"
    });
    let mut worn = base.clone();
    worn["Tool Usage Time (min)"] = json!(59);
    worn["threshold"] = json!(40);

    let input = format!("{}\n{}\n", base, worn);
    let mut out = Vec::new();
    serve_loop(&engine, 60.0, &metrics, input.as_bytes(), &mut out).unwrap();

    let lines: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines[0]["data"]["outcome"], "USABLE");
    assert_eq!(lines[1]["data"]["outcome"], "EXCEEDED");
    assert_eq!(metrics.snapshot().predictions_served, 2);
    assert_eq!(engine.results().read_all().records.len(), 2);
}

// =============================================================================
// Insights Tests
// =============================================================================

/// An empty log yields no-data insights, not errors.
#[test]
fn test_empty_log_insights() {
    let tmp = TempDir::new().unwrap();
    let reader = InsightsReader::load(&ResultLog::new(tmp.path().join("results.csv")));

    assert!(reader.warning().is_none());
    assert_eq!(reader.histogram(30), Insight::NoData);
    assert_eq!(reader.correlation_matrix(), Insight::NoData);
    assert!(reader.most_recent(10).is_empty());
}

/// Insights reflect served predictions.
#[test]
fn test_insights_after_serving() {
    let fixture = trained_fixture();
    let engine = start(&fixture);
    for usage in [5.0, 20.0, 35.0, 50.0] {
        engine.predict(&params(usage, "Steel"), 60.0).unwrap();
    }

    let reader = InsightsReader::load(engine.results());
    let histogram = reader.histogram(10);
    assert_eq!(histogram.ready().unwrap().total(), 4);

    let correlation = reader.correlation_matrix();
    let matrix = correlation.ready().unwrap();
    let r = matrix
        .get("Tool Usage Time (min)", "Predicted Tool Wear (µm)")
        .unwrap();
    assert!(r > 0.9);
}

/// Usage time dominates the importance ranking.
#[test]
fn test_usage_time_ranks_most_important() {
    let fixture = trained_fixture();
    let model = TrainedModel::load(&fixture.model_path).unwrap();

    let ranking = feature_ranking(&model);
    assert_eq!(ranking.len(), CANONICAL_FIELDS.len());
    assert_eq!(ranking.last().unwrap().0, "Tool Usage Time (min)");
}

// =============================================================================
// Configuration Tests
// =============================================================================

/// Config paths drive where the pipeline reads and writes.
#[test]
fn test_config_paths_feed_pipeline() {
    let fixture = trained_fixture();
    let config_path = fixture.model_path.parent().unwrap().join("toolwear.json");
    fs::write(
        &config_path,
        json!({
            "model_path": fixture.model_path,
            "results_path": fixture.results_path,
            "wear_threshold": 40.0
        })
        .to_string(),
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    let engine =
        InferenceEngine::start(&config.model_path, ResultLog::new(&config.results_path)).unwrap();
    let outcome = engine
        .predict(&params(55.0, "Aluminum"), config.wear_threshold)
        .unwrap();
    assert_eq!(outcome.outcome, WearOutcome::Exceeded);
    assert!(config.results_path.exists());
}
