use std::path::PathBuf;

use clap::Args;
use clientsync_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use clientsync_core::{BatchPlan, SyncEngine, SyncReport};
use clientsync_http::{HttpDestinationDirectory, HttpSourceDirectory};
use serde_json::{json, Value};

use crate::commands::CommandResult;
use crate::logging;

const COMMAND: &str = "sync";

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    #[arg(long, help = "Number of source customers to synchronize")]
    pub total: u64,
    #[arg(long, help = "Customers fetched per source request [default: sync.batch_size]")]
    pub batch_size: Option<u64>,
    #[arg(long, help = "Source offset of the first customer [default: sync.start_offset]")]
    pub offset: Option<u64>,
}

pub fn run(config_path: Option<PathBuf>, args: &SyncArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions {
        require_file: config_path.is_some(),
        config_path,
        overrides: ConfigOverrides {
            batch_size: args.batch_size,
            start_offset: args.offset,
            ..ConfigOverrides::default()
        },
    }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    logging::init(&config.logging);

    let plan = match BatchPlan::new(args.total, config.sync.batch_size, config.sync.start_offset)
    {
        Ok(plan) => plan,
        Err(error) => return CommandResult::failure(COMMAND, "invalid_plan", error.to_string(), 4),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let source = HttpSourceDirectory::new(&config.source)
            .map_err(|error| ("http_setup", error.to_string()))?;
        let destination = HttpDestinationDirectory::new(&config.destination)
            .map_err(|error| ("http_setup", error.to_string()))?;

        let engine = SyncEngine::new(source, destination);
        Ok::<SyncReport, (&'static str, String)>(engine.run(&plan).await)
    });

    match result {
        Ok(report) => finish(&report),
        Err((error_class, message)) => CommandResult::failure(COMMAND, error_class, message, 4),
    }
}

fn finish(report: &SyncReport) -> CommandResult {
    let error_class = report.failure.as_ref().map(|failure| failure.error.error_class());
    let exit_code = if report.is_success() { 0 } else { 5 };
    CommandResult::with_report(COMMAND, error_class, report.summary(), exit_code, report_json(report))
}

fn report_json(report: &SyncReport) -> Value {
    let failure = report.failure.as_ref().map(|failure| {
        json!({
            "batch": failure.batch.number,
            "limit": failure.batch.limit,
            "offset": failure.batch.offset,
            "call": failure.error.call().as_str(),
            "error": failure.error.to_string(),
        })
    });

    json!({
        "run_id": report.run_id.to_string(),
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.map(|at| at.to_rfc3339()),
        "batches_planned": report.batches_planned,
        "batches_completed": report.batches_completed,
        "records_fetched": report.records_fetched,
        "records_created": report.records_created,
        "records_updated": report.records_updated,
        "failure": failure,
    })
}
