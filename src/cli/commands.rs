//! CLI command implementations
//!
//! Each command loads the configuration, does one thing, and writes JSON
//! responses to stdout. Startup failures (bad config, missing model) are
//! returned as `CliError`; per-request failures become error responses.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::errors::ErrorCode;
use crate::inference::{InferenceEngine, InferenceError, PredictionRequest};
use crate::insights::{feature_ranking, InsightsReader};
use crate::model::TrainedModel;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::results::{ResultLog, ResultLogError};
use crate::training::{train_and_save, TrainingReport};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error_to, write_response, write_response_to};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Run the appropriate command based on CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = Config::load(&cli.config)?;
    match cli.command {
        Command::Train { dataset } => {
            let dataset = dataset.unwrap_or_else(|| config.dataset_path.clone());
            train(&config, &dataset)
        }
        Command::Predict { threshold } => predict(&config, threshold),
        Command::Serve { threshold } => serve(&config, threshold),
        Command::History { limit } => history(&config, limit),
        Command::Insights { bins } => insights(&config, bins),
        Command::Importance => importance(&config),
        Command::Export { output } => export(&config, &output),
    }
}

/// Train on `dataset` and atomically replace the configured artifact
pub fn train(config: &Config, dataset: &Path) -> CliResult<()> {
    let report = train_and_save(dataset, &config.model_path, &config.training)?;
    write_response(training_summary(&report, &config.model_path))
}

/// Answer a single prediction request from stdin
pub fn predict(config: &Config, threshold: Option<f64>) -> CliResult<()> {
    let engine = start_engine(config)?;
    let default_threshold = threshold.unwrap_or(config.wear_threshold);
    let metrics = MetricsRegistry::new();

    let request = read_request()?;
    handle_request(
        &engine,
        &request,
        default_threshold,
        &metrics,
        &mut io::stdout().lock(),
    )
}

/// Load the model once and answer requests until stdin closes
pub fn serve(config: &Config, threshold: Option<f64>) -> CliResult<()> {
    let engine = start_engine(config)?;
    let default_threshold = threshold.unwrap_or(config.wear_threshold);
    let metrics = MetricsRegistry::new();

    log_event(
        Event::Serving,
        &[("threshold", &default_threshold.to_string())],
    );

    let result = serve_loop(
        &engine,
        default_threshold,
        &metrics,
        io::stdin().lock(),
        &mut io::stdout().lock(),
    );

    let fields = metrics.snapshot().fields();
    let field_refs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    log_event(Event::ShutdownComplete, &field_refs);

    result
}

/// One request per input line, one response per output line.
///
/// Malformed or rejected requests produce error responses and the loop
/// continues; an I/O error on either side ends it.
pub fn serve_loop<R: BufRead, W: Write>(
    engine: &InferenceEngine,
    default_threshold: f64,
    metrics: &MetricsRegistry,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&line) {
            Ok(request) => handle_request(engine, &request, default_threshold, metrics, output)?,
            Err(e) => {
                metrics.increment_predictions_rejected();
                write_error_to(
                    output,
                    "TOOLWEAR_INVALID_REQUEST",
                    &format!("request is not valid JSON: {}", e),
                )?;
            }
        }
    }
    Ok(())
}

/// Show the most recent predictions, newest first
pub fn history(config: &Config, limit: usize) -> CliResult<()> {
    let snapshot = ResultLog::new(&config.results_path).most_recent(limit);
    let records: Vec<Value> = snapshot.records.iter().map(|r| r.to_json()).collect();

    write_response(json!({
        "records": records,
        "warning": warning_json(snapshot.warning.as_ref()),
    }))
}

/// Histogram of predicted wear plus the correlation matrix
pub fn insights(config: &Config, bins: usize) -> CliResult<()> {
    let reader = InsightsReader::load(&ResultLog::new(&config.results_path));

    write_response(json!({
        "count": reader.records().len(),
        "histogram": reader.histogram(bins),
        "correlation": reader.correlation_matrix(),
        "warning": warning_json(reader.warning()),
    }))
}

/// Feature importances, least important first
pub fn importance(config: &Config) -> CliResult<()> {
    let model = TrainedModel::load(&config.model_path).map_err(InferenceError::ModelLoad)?;
    let ranking: Vec<Value> = feature_ranking(&model)
        .into_iter()
        .map(|(feature, importance)| json!({ "feature": feature, "importance": importance }))
        .collect();

    write_response(json!({
        "trained_at": model.trained_at(),
        "ranking": ranking,
    }))
}

/// Write the whole prediction log to `output` as CSV
pub fn export(config: &Config, output: &Path) -> CliResult<()> {
    let file = File::create(output).map_err(|e| {
        CliError::io_error(format!("Failed to create {}: {}", output.display(), e))
    })?;
    let mut writer = BufWriter::new(file);

    let (count, warning) = ResultLog::new(&config.results_path).export(&mut writer)?;
    writer.flush()?;

    write_response(json!({
        "path": output.display().to_string(),
        "records": count,
        "warning": warning_json(warning.as_ref()),
    }))
}

fn start_engine(config: &Config) -> CliResult<InferenceEngine> {
    Ok(InferenceEngine::start(
        &config.model_path,
        ResultLog::new(&config.results_path),
    )?)
}

/// Serves one parsed request, writing either a result or an error response.
///
/// The threshold comes from the request if present, else the default.
fn handle_request<W: Write>(
    engine: &InferenceEngine,
    request: &Value,
    default_threshold: f64,
    metrics: &MetricsRegistry,
    output: &mut W,
) -> CliResult<()> {
    let served = PredictionRequest::from_json(request).and_then(|request| {
        engine.predict(
            &request.parameters,
            request.threshold.unwrap_or(default_threshold),
        )
    });

    match served {
        Ok(outcome) => {
            metrics.increment_predictions_served();
            if outcome.is_exceeded() {
                metrics.increment_exceeded_alerts();
            }
            if outcome.clamped {
                metrics.increment_predictions_clamped();
            }
            if outcome.log_warning.is_some() {
                metrics.increment_log_write_failures();
            }
            write_response_to(output, outcome.to_json())
        }
        Err(e) => {
            metrics.increment_predictions_rejected();
            write_error_to(output, e.code(), &e.to_string())
        }
    }
}

fn training_summary(report: &TrainingReport, model_path: &Path) -> Value {
    json!({
        "model_path": model_path.display().to_string(),
        "features": report.model.expected_features(),
        "trees": report.model.forest().n_trees(),
        "trained_at": report.model.trained_at(),
        "metrics": report.metrics,
    })
}

fn warning_json(warning: Option<&ResultLogError>) -> Value {
    match warning {
        Some(w) => json!({ "code": w.code(), "message": w.to_string() }),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForestParams, RandomForest};
    use crate::schema::FeatureSchema;
    use crate::training::EvaluationMetrics;
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> InferenceEngine {
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![120.0, 0.3, 1.5, 1500.0, 80.0, i as f64 * 10.0, 0.02, 0.0])
            .collect();
        let targets: Vec<f64> = (0..10).map(|i| 20.0 + i as f64 * 5.0).collect();
        let params = ForestParams {
            n_trees: 5,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(&rows, &targets, &params).unwrap();
        let model = TrainedModel::new(
            FeatureSchema::canonical(),
            forest,
            params,
            EvaluationMetrics::default(),
        )
        .unwrap();
        InferenceEngine::new(model, ResultLog::new(dir.path().join("results.csv")))
    }

    fn request_line(usage: f64, extra: &str) -> String {
        format!(
            "{{\"Cutting Speed (m/min)\":120,\"Feed Rate (mm/rev)\":0.3,\"Depth of Cut (mm)\":1.5,\
             \"Spindle Speed (RPM)\":1500,\"Temperature (°C)\":80,\"Tool Usage Time (min)\":{},\
             \"Vibration (mm/s²)\":0.02,\"Material Type\":\"Aluminum\"{}}}",
            usage, extra
        )
    }

    fn responses(out: Vec<u8>) -> Vec<Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_serve_loop_answers_each_line() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let metrics = MetricsRegistry::new();

        let input = format!(
            "{}\n\nnot json\n{}\n{}\n",
            request_line(5.0, ""),
            request_line(85.0, ",\"threshold\":0"),
            request_line(5.0, "").replace("Aluminum", "Brass"),
        );
        let mut out = Vec::new();
        serve_loop(&engine, 60.0, &metrics, input.as_bytes(), &mut out).unwrap();

        let responses = responses(out);
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["status"], "ok");
        assert_eq!(responses[0]["data"]["outcome"], "USABLE");
        assert_eq!(responses[1]["code"], "TOOLWEAR_INVALID_REQUEST");
        assert_eq!(responses[2]["data"]["outcome"], "EXCEEDED");
        assert_eq!(responses[2]["data"]["threshold"], 0.0);
        assert_eq!(responses[3]["code"], "TOOLWEAR_ENCODING_FAILED");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.predictions_served, 2);
        assert_eq!(snapshot.predictions_rejected, 2);
        assert_eq!(snapshot.exceeded_alerts, 1);

        assert_eq!(engine.results().read_all().records.len(), 2);
    }

    #[test]
    fn test_missing_field_response_names_it() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let metrics = MetricsRegistry::new();

        let input = request_line(5.0, "").replace("\"Feed Rate (mm/rev)\":0.3,", "");
        let mut out = Vec::new();
        serve_loop(&engine, 60.0, &metrics, input.as_bytes(), &mut out).unwrap();

        let responses = responses(out);
        assert_eq!(responses[0]["code"], "TOOLWEAR_SCHEMA_MISMATCH");
        assert!(responses[0]["message"]
            .as_str()
            .unwrap()
            .contains("Feed Rate (mm/rev)"));
        assert!(!engine.results().path().exists());
    }

    #[test]
    fn test_warning_json() {
        assert_eq!(warning_json(None), Value::Null);
        let warning = ResultLogError::Corrupted {
            path: "results.csv".into(),
            reason: "ragged".into(),
        };
        assert_eq!(warning_json(Some(&warning))["code"], "TOOLWEAR_LOG_CORRUPTED");
    }
}
