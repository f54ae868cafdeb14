use crate::ai::EvaluationService;
use crate::batch::run_batch;
use crate::models::{WorkerEvent, WorkerRequest};
use crossbeam_channel::{Receiver, Sender};
use std::io;
use std::thread;

/// Moves the service onto a background thread that handles one request at a
/// time. The thread exits once every request sender is dropped.
pub fn spawn_worker(
    mut service: EvaluationService,
    events_tx: Sender<WorkerEvent>,
    requests_rx: Receiver<WorkerRequest>,
) -> io::Result<thread::JoinHandle<()>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("docujudge::worker".to_string())
        .spawn(move || {
            while let Ok(request) = requests_rx.recv() {
                match request {
                    WorkerRequest::UpdateConfig(config) => {
                        let event = match service.update_config(config) {
                            Ok(rebuilt) => WorkerEvent::ConfigApplied { rebuilt },
                            Err(e) => {
                                tracing::error!(error = %e, "configuration rejected");
                                WorkerEvent::ConfigRejected(e.to_string())
                            }
                        };
                        let _ = events_tx.send(event);
                    }
                    WorkerRequest::RunBatch {
                        golden_standard,
                        documents,
                    } => {
                        tracing::info!(documents = documents.len(), "worker received batch");
                        let outcome = rt.block_on(run_batch(
                            &service,
                            &golden_standard,
                            &documents,
                            |event| {
                                let _ = events_tx.send(WorkerEvent::Batch(event));
                            },
                        ));
                        let _ = events_tx.send(WorkerEvent::BatchFinished(outcome));
                    }
                }
            }
            tracing::debug!("worker channel disconnected, exiting");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::evaluator::testing::{test_config, MockFactory};
    use crate::batch::BatchEvent;
    use crate::config::Provider;
    use crate::documents::UploadedDocument;
    use crossbeam_channel::unbounded;
    use std::sync::Arc;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_worker_runs_batch_and_reports_in_order() {
        let factory = MockFactory::replying("VERDICT: Pass\nCONFIDENCE: 0.7\nEXPLANATION: ok");
        let service =
            EvaluationService::new(test_config(Provider::OpenAi, "gpt-4"), factory).unwrap();
        let (events_tx, events_rx) = unbounded();
        let (requests_tx, requests_rx) = unbounded();
        let handle = spawn_worker(service, events_tx, requests_rx).unwrap();

        requests_tx
            .send(WorkerRequest::RunBatch {
                golden_standard: "# Standard".to_string(),
                documents: vec![
                    UploadedDocument::new("a.md", "a"),
                    UploadedDocument::new("b.md", "b"),
                ],
            })
            .unwrap();

        let mut progress = Vec::new();
        loop {
            match events_rx.recv_timeout(TIMEOUT).unwrap() {
                WorkerEvent::Batch(BatchEvent::Progress(p)) => progress.push(p.index),
                WorkerEvent::BatchFinished(outcome) => {
                    assert_eq!(outcome.results.len(), 2);
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(progress, vec![1, 2]);

        drop(requests_tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_worker_applies_config_updates() {
        let factory = MockFactory::replying("VERDICT: Pass");
        let service = EvaluationService::new(
            test_config(Provider::OpenAi, "gpt-4"),
            Arc::clone(&factory) as Arc<dyn crate::ai::ClientFactory>,
        )
        .unwrap();
        let (events_tx, events_rx) = unbounded();
        let (requests_tx, requests_rx) = unbounded();
        let handle = spawn_worker(service, events_tx, requests_rx).unwrap();

        requests_tx
            .send(WorkerRequest::UpdateConfig(test_config(Provider::OpenAi, "gpt-4")))
            .unwrap();
        requests_tx
            .send(WorkerRequest::UpdateConfig(test_config(Provider::Groq, "llama2-70b-4096")))
            .unwrap();

        assert!(matches!(
            events_rx.recv_timeout(TIMEOUT).unwrap(),
            WorkerEvent::ConfigApplied { rebuilt: false }
        ));
        assert!(matches!(
            events_rx.recv_timeout(TIMEOUT).unwrap(),
            WorkerEvent::ConfigApplied { rebuilt: true }
        ));

        drop(requests_tx);
        handle.join().unwrap();
        assert_eq!(factory.built(Provider::OpenAi), 1);
        assert_eq!(factory.built(Provider::Groq), 1);
    }
}
