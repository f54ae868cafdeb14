use crate::ai::EvaluationService;
use crate::documents::UploadedDocument;
use crate::models::{EvaluationRequest, EvaluationResult, ResultSet};
use chrono::{DateTime, Local};

/// Position reached after a document finished, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub index: usize,
    pub total: usize,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Evaluated(EvaluationResult),
    Skipped(SkippedDocument),
    Progress(BatchProgress),
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: ResultSet,
    pub skipped: Vec<SkippedDocument>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

/// Evaluates `documents` one after another, in order.
///
/// A document that does not decode is skipped; a failed remote call becomes
/// an `Error` result. Neither stops the batch.
pub async fn run_batch<F>(
    service: &EvaluationService,
    golden_standard: &str,
    documents: &[UploadedDocument],
    mut on_event: F,
) -> BatchOutcome
where
    F: FnMut(BatchEvent),
{
    let started_at = Local::now();
    let total = documents.len();
    let mut results = ResultSet::new();
    let mut skipped = Vec::new();

    tracing::info!(total, "batch started");

    for (i, document) in documents.iter().enumerate() {
        match document.decode() {
            Ok(candidate) => {
                let request = EvaluationRequest::new(golden_standard, candidate, &document.name);
                let result = service.evaluate_request(&request).await;
                results.push(result.clone());
                on_event(BatchEvent::Evaluated(result));
            }
            Err(e) => {
                tracing::warn!(document = %document.name, reason = %e.reason, "skipping document");
                let entry = SkippedDocument {
                    name: e.name,
                    reason: e.reason,
                };
                skipped.push(entry.clone());
                on_event(BatchEvent::Skipped(entry));
            }
        }

        on_event(BatchEvent::Progress(BatchProgress {
            index: i + 1,
            total,
            filename: document.name.clone(),
        }));
    }

    tracing::info!(
        evaluated = results.len(),
        skipped = skipped.len(),
        errors = results.errors(),
        "batch finished"
    );

    BatchOutcome {
        results,
        skipped,
        started_at,
        finished_at: Local::now(),
    }
}
