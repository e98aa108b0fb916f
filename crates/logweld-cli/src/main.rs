use std::path::PathBuf;

use clap::{Parser, Subcommand};
use logweld_core::{load_pipeline_config, Dataset, SchemaSet, SourceRole};
use logweld_etl::{
    extract, generate_report, run_pipeline, validate_business_rules, PipelineOptions,
    SchemaValidator,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "logweld")]
#[command(about = "Batch ETL for user activity and API logs")]
struct Cli {
    /// Path to the pipeline config file.
    #[arg(long, global = true, default_value = "pipeline.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full pipeline: extract, validate, join, enrich, aggregate,
    /// report, and write artifacts.
    Run {
        /// Override the output directory from the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Skip API enrichment even when APIs are configured.
        #[arg(long)]
        no_enrich: bool,
        /// Skip remote upload even when a destination is configured.
        #[arg(long)]
        no_upload: bool,
    },
    /// Validate the input files against their schemas and business rules
    /// without running the rest of the pipeline.
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_pipeline_config(&cli.config)?;

    match cli.command {
        Commands::Run {
            output_dir,
            no_enrich,
            no_upload,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            let options = PipelineOptions {
                enrich: !no_enrich,
                upload: !no_upload,
            };
            let summary = run_pipeline(&config, options).await?;
            tracing::info!(
                activities = summary.activities,
                api_logs = summary.api_logs,
                joined = summary.joined,
                artifacts = summary.artifacts.len(),
                output_dir = %config.output_dir.display(),
                "run finished"
            );
            if !summary.validation_passed {
                anyhow::bail!("schema validation failed, see validation_report.json");
            }
        }
        Commands::Validate => {
            let activities = extract::read_ndjson(
                config
                    .source_path(SourceRole::UserActivities)
                    .ok_or_else(|| anyhow::anyhow!("no user_activities source configured"))?,
            )?;
            let api_logs = extract::read_ndjson(
                config
                    .source_path(SourceRole::ApiLogs)
                    .ok_or_else(|| anyhow::anyhow!("no api_logs source configured"))?,
            )?;

            let schemas = config
                .schema_path
                .as_deref()
                .map_or_else(SchemaSet::default, SchemaSet::load_or_default);
            let mut validator = SchemaValidator::new(schemas);
            validator.validate_schema(&activities, Dataset::UserActivities);
            validator.validate_schema(&api_logs, Dataset::ApiLogs);
            let business = validate_business_rules(&api_logs);

            let report = generate_report(validator.history())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            println!("{}", serde_json::to_string_pretty(&business)?);
            if report.validation_summary.failed_validations > 0 || !business.passed {
                anyhow::bail!("validation failed");
            }
        }
    }

    Ok(())
}
