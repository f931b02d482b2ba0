//! Oud Grading Platform - command line grader
//!
//! Scores inspections and segregates batches from JSON request files,
//! printing JSON results to stdout.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{
    score_inspection, validate_inspection, InspectionRecord, MassEntry, ProposedAllocation,
    RawMaterial,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oud_grading_backend::config::{Config, LoggingConfig};
use oud_grading_backend::error::AppError;
use oud_grading_backend::services::{
    BatchService, ReportingService, SegregationService, SegregationSubmission,
};

#[derive(Parser, Debug)]
#[command(
    name = "oud-grader",
    about = "Score oud inspections and segregate batches into grades",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the active grading criteria table
    Criteria,
    /// Score an inspection record
    Score {
        /// Path to an inspection record JSON file
        #[arg(long)]
        inspection: PathBuf,
    },
    /// Register, inspect and segregate one or more batches
    Segregate {
        /// Paths to segregation request JSON files
        #[arg(required = true)]
        requests: Vec<PathBuf>,
        /// Approve every batch whose allocation is complete
        #[arg(long)]
        approve: bool,
    },
}

/// A batch with its inspection and the operator's mass entry
#[derive(Debug, Deserialize)]
struct SegregationRequest {
    batch_number: String,
    raw_material: RawMaterial,
    inspection: InspectionRecord,
    /// Grade name to mass in grams, as entered by the operator (text or number)
    #[serde(default)]
    masses: BTreeMap<String, MassEntry>,
}

#[derive(Debug, Serialize)]
struct SegregationReport {
    submissions: Vec<SegregationSubmission>,
    summary: oud_grading_backend::services::SegregationSummary,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::debug!("Environment: {}", config.environment);

    match execute(cli.command, &config) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => match err.downcast_ref::<AppError>() {
            Some(app_error) => {
                eprintln!("{}", serde_json::to_string_pretty(&app_error.to_response())?);
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.clone().into());

    let json_layer = logging
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!logging.json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn execute(command: Command, config: &Config) -> anyhow::Result<serde_json::Value> {
    let batches = BatchService::new();
    let segregation = SegregationService::new(config.criteria_table()?, batches.clone());

    match command {
        Command::Criteria => Ok(serde_json::to_value(segregation.criteria()?)?),
        Command::Score { inspection } => {
            let record: InspectionRecord = read_json(&inspection)?;
            validate_inspection(&record).map_err(AppError::from)?;

            let score = score_inspection(&record);
            let suggested_grade = segregation.criteria()?.grade_for_score(score.composite);
            Ok(json!({ "score": score, "suggested_grade": suggested_grade }))
        }
        Command::Segregate { requests, approve } => {
            let mut submissions = Vec::with_capacity(requests.len());
            for path in &requests {
                let request: SegregationRequest = read_json(path)?;
                let submission = process_request(&batches, &segregation, request, approve)?;
                submissions.push(submission);
            }

            let summary = ReportingService::new(batches).segregation_summary()?;
            Ok(serde_json::to_value(SegregationReport { submissions, summary })?)
        }
    }
}

fn process_request(
    batches: &BatchService,
    segregation: &SegregationService,
    request: SegregationRequest,
    approve: bool,
) -> Result<SegregationSubmission, AppError> {
    let batch_number = request.batch_number.as_str();
    let stored = batches.register(batch_number, request.raw_material)?;
    let stored = batches.begin_inspection(batch_number, Some(stored.revision), request.inspection)?;

    let masses: Vec<(&str, Cow<'_, str>)> = request
        .masses
        .iter()
        .map(|(grade, mass)| (grade.as_str(), mass.as_text()))
        .collect();
    let proposed =
        ProposedAllocation::parse(masses.iter().map(|(grade, mass)| (*grade, mass.as_ref())))?;

    let mut submission =
        segregation.submit_allocation(batch_number, Some(stored.revision), &proposed)?;

    if approve && submission.outcome.is_complete() {
        let approved = batches.approve(batch_number, Some(submission.revision))?;
        submission.revision = approved.revision;
        submission.status = approved.batch.status;
    }
    Ok(submission)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(masses: &str) -> SegregationRequest {
        serde_json::from_value(json!({
            "batch_number": "OUD-2024-0001",
            "raw_material": {
                "origin": "Trat, Thailand",
                "species": "Aquilaria crassna",
                "age_years": 20,
                "harvester": "Somchai",
                "harvest_date": "2024-01-20",
                "total_mass_grams": "2500"
            },
            "inspection": {},
            "masses": serde_json::from_str::<serde_json::Value>(masses).unwrap()
        }))
        .unwrap()
    }

    fn services() -> (BatchService, SegregationService) {
        let batches = BatchService::new();
        let segregation = SegregationService::new(Default::default(), batches.clone());
        (batches, segregation)
    }

    #[test]
    fn numeric_and_text_masses_are_accepted() {
        let (batches, segregation) = services();
        let masses = r#"{"royal": 125, "premium": "375", "super": 750, "regular": 875.0, "reject": "375"}"#;

        let submission = process_request(&batches, &segregation, request(masses), true).unwrap();
        assert!(submission.outcome.is_complete());
        assert_eq!(submission.status, shared::BatchStatus::Approved);
    }

    #[test]
    fn duplicate_grade_is_reported() {
        let (batches, segregation) = services();
        let result = process_request(
            &batches,
            &segregation,
            request(r#"{"Royal": 100, "royal": 50}"#),
            false,
        );
        assert_eq!(result.unwrap_err().code(), "DUPLICATE_GRADE");
    }
}
