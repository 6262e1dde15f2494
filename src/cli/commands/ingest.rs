//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, ProgressReporter};
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use crate::vector_store::PersistOutcome;
use anyhow::Result;
use std::sync::Arc;

/// Apply command-line overrides on top of the loaded settings.
pub fn apply_overrides(
    mut settings: Settings,
    urls: &[String],
    db: Option<String>,
    concurrency: Option<usize>,
    only: bool,
) -> Settings {
    if only {
        settings.sources.videos.clear();
    }
    settings.sources.videos.extend(urls.iter().cloned());

    if let Some(db) = db {
        settings.general.db_path = db;
    }
    if let Some(concurrency) = concurrency {
        settings.embedding.concurrency = concurrency;
    }

    settings
}

/// Run the ingest command.
pub async fn run_ingest(
    urls: &[String],
    db: Option<String>,
    concurrency: Option<usize>,
    only: bool,
    settings: Settings,
) -> Result<()> {
    let settings = apply_overrides(settings, urls, db, concurrency, only);

    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidsearch doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = settings.embedding.model.clone();
    let concurrency = settings.embedding.concurrency;
    let pipeline = Pipeline::new(settings)?.with_observer(Arc::new(ProgressReporter::new()));

    Output::header("Ingest");
    Output::kv("Videos", &pipeline.videos().len().to_string());
    Output::kv("Embedding model", &model);
    Output::kv("Concurrency", &concurrency.to_string());
    Output::kv("Database", &pipeline.db_path().display().to_string());
    println!();

    let summary = pipeline.run().await?;

    println!();
    match &summary.outcome {
        PersistOutcome::Saved { path, records } => {
            Output::success(&format!("Saved {} vector records to {}", records, path.display()));
        }
        PersistOutcome::Empty => {
            Output::warning("No records were produced. Check the embedding endpoint and video URLs.");
        }
    }

    let failed = summary.failed_videos();
    if failed > 0 {
        Output::warning(&format!(
            "{} of {} video(s) failed",
            failed,
            summary.reports.len()
        ));
    }

    Ok(())
}
