use std::process::ExitCode;

use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use typesense_indexer::logging::{self, LogFormat};
use typesense_indexer::{Dependencies, IndexingError};
use typesense_indexer_pipeline::{EntityEvent, IndexJob, JobOutcome};

#[derive(Parser)]
#[command(name = "typesense-indexer")]
#[command(about = "Build, drop and query the Typesense index of an Omeka S site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON lines (same as LOG_FORMAT=json)
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty collection for the configured properties
    Create,
    /// Delete the collection
    Delete,
    /// Drop and rebuild the collection from the item database
    Recreate,
    /// Run a search and print the result payload
    Search {
        /// Query text
        query: String,
    },
    /// Apply item change events read as JSON lines from stdin
    Sync,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::from_env()
    };
    logging::init(format);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), IndexingError> {
    let dependencies = Dependencies::new().await?;
    let index_name = dependencies.settings.index_name.clone();
    let index_fields = dependencies.settings.properties.clone();

    let job = match command {
        Commands::Create => IndexJob::CreateIndex {
            index_name,
            index_fields,
        },
        Commands::Delete => IndexJob::DeleteIndex { index_name },
        Commands::Recreate => IndexJob::RecreateIndex {
            index_name,
            index_fields,
        },
        Commands::Search { query } => {
            let payload = dependencies.search.search(&query).await;
            let body = serde_json::to_string_pretty(&payload)
                .map_err(|e| IndexingError::config(format!("Cannot encode results: {}", e)))?;
            println!("{}", body);
            return Ok(());
        }
        Commands::Sync => return sync_from_stdin(&dependencies).await,
    };

    // Create and delete need no item database.
    let outcome = match &job {
        IndexJob::CreateIndex {
            index_name,
            index_fields,
        } => {
            dependencies
                .lifecycle
                .create_index(index_name, index_fields)
                .await?;
            JobOutcome::Created
        }
        IndexJob::DeleteIndex { index_name } => {
            JobOutcome::Deleted(dependencies.lifecycle.delete_index(index_name).await?)
        }
        IndexJob::RecreateIndex { .. } => dependencies.job_runner()?.run(&job).await?,
    };

    match outcome {
        JobOutcome::Recreated(report) => info!(
            index_name = %report.index_name,
            started_at = %report.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            count = report.succeeded,
            failed = report.failed,
            elapsed_secs = report.elapsed.as_secs(),
            "Finished indexing"
        ),
        other => info!(index_name = %job.index_name(), outcome = ?other, "Done"),
    }
    Ok(())
}

async fn sync_from_stdin(dependencies: &Dependencies) -> Result<(), IndexingError> {
    let handler = dependencies.sync_handler();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EntityEvent>(&line) {
            Ok(event) => {
                let outcome = handler.on_entity_changed(&event).await;
                info!(resource_id = %event.resource_id, outcome = ?outcome, "Applied event");
            }
            Err(e) => warn!(error = %e, "Skipping malformed event"),
        }
    }
    Ok(())
}
