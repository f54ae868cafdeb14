use crate::ai::{ClientFactory, EvaluationService};
use crate::batch::{run_batch, BatchEvent, BatchOutcome, SkippedDocument};
use crate::config::{Overrides, Settings};
use crate::documents::read_document;
use crate::error::HeadlessError;
use crate::export::export_to_path;
use std::path::PathBuf;
use std::sync::Arc;

/// Files named on the command line.
#[derive(Debug, Clone)]
pub struct HeadlessRun {
    pub golden: PathBuf,
    pub documents: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Evaluates `run.documents` against `run.golden` and writes the CSV.
///
/// Invalid settings, an unusable golden standard and a batch with nothing
/// decodable all fail before a client is built. Files that cannot be read
/// are reported as skipped.
pub async fn run_files<F>(
    settings: &Settings,
    overrides: &Overrides,
    factory: Arc<dyn ClientFactory>,
    run: &HeadlessRun,
    mut on_event: F,
) -> Result<BatchOutcome, HeadlessError>
where
    F: FnMut(BatchEvent),
{
    let config = settings.resolve(overrides)?;

    let golden_standard = read_document(&run.golden)
        .and_then(|doc| doc.decode())
        .map_err(HeadlessError::Golden)?;

    let mut documents = Vec::new();
    let mut unreadable = Vec::new();
    for path in &run.documents {
        match read_document(path) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable document");
                let entry = SkippedDocument {
                    name: e.name,
                    reason: e.reason,
                };
                on_event(BatchEvent::Skipped(entry.clone()));
                unreadable.push(entry);
            }
        }
    }

    if !documents.iter().any(|doc| doc.decode().is_ok()) {
        for doc in &documents {
            if let Err(e) = doc.decode() {
                on_event(BatchEvent::Skipped(SkippedDocument {
                    name: e.name,
                    reason: e.reason,
                }));
            }
        }
        return Err(HeadlessError::NoDocuments);
    }

    let service = EvaluationService::new(config, factory)?;
    let mut outcome = run_batch(&service, &golden_standard, &documents, &mut on_event).await;

    unreadable.append(&mut outcome.skipped);
    outcome.skipped = unreadable;

    export_to_path(&outcome.results, &run.output)?;
    Ok(outcome)
}
