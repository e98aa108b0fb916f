//! End-to-end pipeline run: extract → validate → join → transform →
//! enrich → aggregate → report → load.

use logweld_api::ApiClient;
use logweld_core::config::SourceRole;
use logweld_core::{ConfigError, Dataset, PipelineConfig, SchemaSet};

use crate::enrich::Enricher;
use crate::load::{serialize_artifact, ArtifactWriter, Uploader};
use crate::validate::{validate_business_rules, SchemaValidator};
use crate::{aggregate, extract, join, report, transform, EtlError};

/// Run-level switches from the CLI.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub enrich: bool,
    pub upload: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            enrich: true,
            upload: true,
        }
    }
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub activities: usize,
    pub api_logs: usize,
    pub joined: usize,
    pub artifacts: Vec<String>,
    pub validation_passed: bool,
    pub business_rules_passed: bool,
}

/// Executes one full batch run.
///
/// # Errors
///
/// Only precondition and I/O failures abort the run: unreadable inputs,
/// malformed config, artifact write failures, or an API client that cannot
/// be constructed. Validation findings, enrichment failures, and upload
/// failures are captured as data or logs instead.
pub async fn run_pipeline(
    config: &PipelineConfig,
    options: PipelineOptions,
) -> Result<RunSummary, EtlError> {
    let activities_path = config
        .source_path(SourceRole::UserActivities)
        .ok_or_else(|| ConfigError::Validation("no user_activities source".to_owned()))?;
    let logs_path = config
        .source_path(SourceRole::ApiLogs)
        .ok_or_else(|| ConfigError::Validation("no api_logs source".to_owned()))?;

    let activities = extract::read_ndjson(activities_path)?;
    let api_logs = extract::read_ndjson(logs_path)?;

    let schemas = config
        .schema_path
        .as_deref()
        .map_or_else(SchemaSet::default, SchemaSet::load_or_default);
    let mut validator = SchemaValidator::new(schemas);
    validator.validate_schema(&activities, Dataset::UserActivities);
    validator.validate_schema(&api_logs, Dataset::ApiLogs);
    let business = validate_business_rules(&api_logs);
    if !business.passed {
        tracing::warn!(
            violations = business.violations.len(),
            "business rule violations found, continuing"
        );
    }

    let mut joined = join::join_on_user_id(&activities, &api_logs);
    transform::apply_transforms(&mut joined, &[transform::add_response_category]);

    if options.enrich {
        let profile_api = config
            .api("user_profile_api")
            .map(ApiClient::from_config)
            .transpose()?;
        let weather_api = config
            .api("weather_api")
            .map(ApiClient::from_config)
            .transpose()?;
        if profile_api.is_some() || weather_api.is_some() {
            Enricher::new(profile_api, weather_api, &config.enrichment)
                .enrich(&mut joined)
                .await;
        } else {
            tracing::info!("no enrichment APIs configured, skipping enrichment");
        }
    }

    let aggregations = aggregate::aggregate(&joined);
    // Validation ran above, so the report always exists for a run.
    let validation_report = report::generate_report(validator.history())?;
    let validation_passed = validation_report.validation_summary.failed_validations == 0;

    let mut artifacts: Vec<(String, String)> = Vec::new();
    artifacts.push((
        "output_data".to_owned(),
        serialize_artifact("output_data", &joined)?,
    ));
    for (name, result) in &aggregations {
        artifacts.push((name.clone(), serialize_artifact(name, result)?));
    }
    artifacts.push((
        "validation_report".to_owned(),
        serialize_artifact("validation_report", &validation_report)?,
    ));
    artifacts.push((
        "business_rules".to_owned(),
        serialize_artifact("business_rules", &business)?,
    ));

    let uploader = match (&config.upload, options.upload) {
        (Some(upload_config), true) => Some(Uploader::from_config(upload_config)?),
        _ => None,
    };
    let write_locally = uploader.as_ref().is_none_or(Uploader::writes_locally);

    if write_locally {
        let writer = ArtifactWriter::new(&config.output_dir)?;
        for (name, body) in &artifacts {
            writer.write_raw(name, body)?;
        }
    }
    if let Some(uploader) = &uploader {
        if uploader.uploads_remotely() {
            for (name, body) in &artifacts {
                uploader.upload(&format!("{name}.json"), body.clone()).await;
            }
        }
    }

    let summary = RunSummary {
        activities: activities.len(),
        api_logs: api_logs.len(),
        joined: joined.len(),
        artifacts: artifacts.into_iter().map(|(name, _)| name).collect(),
        validation_passed,
        business_rules_passed: business.passed,
    };
    tracing::info!(
        joined = summary.joined,
        artifacts = summary.artifacts.len(),
        validation_passed = summary.validation_passed,
        "pipeline run complete"
    );
    Ok(summary)
}
