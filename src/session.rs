use crate::batch::{BatchEvent, BatchProgress, SkippedDocument};
use crate::config::{
    EvaluationConfig, Overrides, Provider, Settings, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use crate::documents::{display_name, list_documents, read_document};
use crate::export::export_to_path;
use crate::models::{AppState, ResultSet, WorkerEvent, WorkerRequest};
use chrono::{DateTime, Local};
use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeSet;
use std::path::PathBuf;

const TEMPERATURE_STEP: f64 = 0.1;
const MAX_TOKENS_STEP: i64 = 250;
const WORKER_UNAVAILABLE: &str = "Evaluation worker is not running; restart docujudge";

/// Everything the terminal UI shows, plus the handle to the worker.
pub struct App {
    pub state: AppState,
    pub documents_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub cursor: usize,
    pub golden: Option<usize>,
    pub selected: BTreeSet<usize>,
    pub settings: Settings,
    pub overrides: Overrides,
    /// Last resolved configuration, or why resolution failed.
    pub config: Result<EvaluationConfig, String>,
    pub results: ResultSet,
    pub skipped: Vec<SkippedDocument>,
    pub progress: Option<BatchProgress>,
    pub batch_total: usize,
    pub result_cursor: usize,
    pub finished_at: Option<DateTime<Local>>,
    pub export_path: PathBuf,
    pub status: Option<String>,
    pub should_quit: bool,
    requests_tx: Sender<WorkerRequest>,
}

impl App {
    pub fn new(
        documents_dir: PathBuf,
        settings: Settings,
        overrides: Overrides,
        config: EvaluationConfig,
        export_path: PathBuf,
        requests_tx: Sender<WorkerRequest>,
    ) -> Self {
        let mut app = Self {
            state: AppState::Menu,
            documents_dir,
            files: Vec::new(),
            cursor: 0,
            golden: None,
            selected: BTreeSet::new(),
            settings,
            overrides,
            config: Ok(config),
            results: ResultSet::new(),
            skipped: Vec::new(),
            progress: None,
            batch_total: 0,
            result_cursor: 0,
            finished_at: None,
            export_path,
            status: None,
            should_quit: false,
            requests_tx,
        };
        app.refresh_files();
        app
    }

    pub fn refresh_files(&mut self) {
        self.files = list_documents(&self.documents_dir);
        self.cursor = self.cursor.min(self.files.len().saturating_sub(1));
        self.golden = self.golden.filter(|g| *g < self.files.len());
        self.selected.retain(|i| *i < self.files.len());
    }

    pub fn current_provider(&self) -> Provider {
        self.overrides
            .provider
            .as_deref()
            .and_then(|p| p.parse().ok())
            .or_else(|| self.settings.default_provider().ok())
            .unwrap_or(Provider::OpenAi)
    }

    pub fn current_model(&self) -> String {
        self.overrides
            .model
            .clone()
            .or_else(|| self.settings.model.clone())
            .unwrap_or_else(|| self.current_provider().default_model().to_string())
    }

    pub fn current_temperature(&self) -> f64 {
        self.overrides
            .temperature
            .or(self.settings.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn current_max_tokens(&self) -> i64 {
        self.overrides
            .max_tokens
            .or(self.settings.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn can_start(&self) -> bool {
        self.golden.is_some() && !self.selected.is_empty() && self.config.is_ok()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Menu => self.handle_menu_key(key.code),
            AppState::Running => {}
            AppState::Results => self.handle_results_key(key.code),
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor < self.files.len().saturating_sub(1) {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('g') if !self.files.is_empty() => {
                self.golden = Some(self.cursor);
                self.selected.remove(&self.cursor);
            }
            KeyCode::Char(' ') if !self.files.is_empty() => {
                if self.golden == Some(self.cursor) {
                    self.status = Some("The golden standard cannot also be a candidate".into());
                } else if !self.selected.remove(&self.cursor) {
                    self.selected.insert(self.cursor);
                }
            }
            KeyCode::Char('a') => {
                self.selected = (0..self.files.len())
                    .filter(|i| Some(*i) != self.golden)
                    .collect();
            }
            KeyCode::Char('r') => self.refresh_files(),
            KeyCode::Char('p') => {
                let provider = self.current_provider().next();
                self.overrides.provider = Some(provider.id().to_string());
                self.overrides.model = Some(provider.default_model().to_string());
                self.apply_settings();
            }
            KeyCode::Char('m') => {
                let models = self.current_provider().models();
                let current = self.current_model();
                let next = models
                    .iter()
                    .position(|m| *m == current)
                    .map(|i| (i + 1) % models.len())
                    .unwrap_or(0);
                self.overrides.model = Some(models[next].to_string());
                self.apply_settings();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_temperature(TEMPERATURE_STEP),
            KeyCode::Char('-') => self.step_temperature(-TEMPERATURE_STEP),
            KeyCode::Char(']') => self.step_max_tokens(MAX_TOKENS_STEP),
            KeyCode::Char('[') => self.step_max_tokens(-MAX_TOKENS_STEP),
            KeyCode::Enter => self.start_batch(),
            _ => {}
        }
    }

    fn handle_results_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.result_cursor = self.result_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.result_cursor < self.results.len().saturating_sub(1) {
                    self.result_cursor += 1;
                }
            }
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('r') => self.start_batch(),
            KeyCode::Char('m') => {
                self.state = AppState::Menu;
                self.status = None;
            }
            _ => {}
        }
    }

    fn step_temperature(&mut self, delta: f64) {
        let next = ((self.current_temperature() + delta) * 10.0).round() / 10.0;
        self.overrides.temperature = Some(next.clamp(0.0, 1.0));
        self.apply_settings();
    }

    fn step_max_tokens(&mut self, delta: i64) {
        let next = (self.current_max_tokens() + delta).max(MAX_TOKENS_STEP);
        self.overrides.max_tokens = Some(next);
        self.apply_settings();
    }

    /// Re-resolves the settings and hands a valid config to the worker. The
    /// worker skips the rebuild when nothing changed.
    pub fn apply_settings(&mut self) {
        match self.settings.resolve(&self.overrides) {
            Ok(config) => {
                if self
                    .requests_tx
                    .send(WorkerRequest::UpdateConfig(config.clone()))
                    .is_err()
                {
                    self.worker_gone();
                    return;
                }
                self.status = Some(format!("Using {}", config.summary()));
                self.config = Ok(config);
            }
            Err(e) => {
                tracing::warn!(error = %e, "settings rejected");
                self.status = Some(format!("Configuration error: {}", e));
                self.config = Err(e.to_string());
            }
        }
    }

    pub fn start_batch(&mut self) {
        if let Err(e) = &self.config {
            self.status = Some(format!("Cannot evaluate: {}", e));
            return;
        }
        let Some(golden_index) = self.golden else {
            self.status = Some("Mark a golden standard with 'g' first".into());
            return;
        };
        if self.selected.is_empty() {
            self.status = Some("Select at least one document with Space".into());
            return;
        }

        let golden_standard = match read_document(&self.files[golden_index]).and_then(|d| d.decode()) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "golden standard unreadable");
                self.status = Some(e.to_string());
                return;
            }
        };

        self.results.clear();
        self.skipped.clear();
        let mut documents = Vec::new();
        for &i in &self.selected {
            match read_document(&self.files[i]) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable document");
                    self.skipped.push(SkippedDocument {
                        name: e.name,
                        reason: e.reason,
                    });
                }
            }
        }

        self.batch_total = documents.len();
        self.progress = None;
        self.result_cursor = 0;
        self.finished_at = None;
        self.status = Some(format!(
            "Evaluating {} document(s) against {}",
            documents.len(),
            display_name(&self.files[golden_index])
        ));
        self.state = AppState::Running;

        let request = WorkerRequest::RunBatch {
            golden_standard,
            documents,
        };
        if self.requests_tx.send(request).is_err() {
            self.worker_gone();
        }
    }

    fn worker_gone(&mut self) {
        tracing::error!("evaluation worker is no longer running");
        self.state = AppState::Menu;
        self.status = Some(WORKER_UNAVAILABLE.to_string());
        self.config = Err(WORKER_UNAVAILABLE.to_string());
    }

    pub fn export(&mut self) {
        self.status = Some(match export_to_path(&self.results, &self.export_path) {
            Ok(()) => format!("Results exported to {}", self.export_path.display()),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                format!("Export failed: {}", e)
            }
        });
    }

    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::ConfigApplied { rebuilt } => {
                tracing::debug!(rebuilt, "worker applied configuration");
            }
            WorkerEvent::ConfigRejected(message) => {
                self.status = Some(format!("Configuration error: {}", message));
                self.config = Err(message);
            }
            WorkerEvent::Batch(BatchEvent::Evaluated(result)) => self.results.push(result),
            WorkerEvent::Batch(BatchEvent::Skipped(skipped)) => {
                self.status = Some(format!("Skipped {}: {}", skipped.name, skipped.reason));
                self.skipped.push(skipped);
            }
            WorkerEvent::Batch(BatchEvent::Progress(progress)) => {
                self.progress = Some(progress);
            }
            WorkerEvent::BatchFinished(outcome) => {
                self.results = outcome.results;
                self.finished_at = Some(outcome.finished_at);
                self.status = Some(format!(
                    "Evaluation complete: {} passed, {} errors, {} skipped",
                    self.results.passed(),
                    self.results.errors(),
                    self.skipped.len()
                ));
                self.state = AppState::Results;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ParsedVerdict;
    use crate::batch::BatchOutcome;
    use crate::models::EvaluationResult;
    use crossbeam_channel::{unbounded, Receiver};
    use std::fs;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn env_settings() -> Settings {
        Settings {
            openai_api_key: Some("sk-test".to_string()),
            ..Settings::default()
        }
    }

    fn create_test_app(files: &[(&str, &str)]) -> (App, Receiver<WorkerRequest>, TempDir) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let settings = env_settings();
        let config = settings.resolve(&Overrides::default()).unwrap();
        let (tx, rx) = unbounded();
        let app = App::new(
            dir.path().to_path_buf(),
            settings,
            Overrides::default(),
            config,
            dir.path().join("out.csv"),
            tx,
        );
        (app, rx, dir)
    }

    #[test]
    fn test_menu_selection() {
        let (mut app, _rx, _dir) =
            create_test_app(&[("a.md", "a"), ("b.md", "b"), ("golden.md", "g")]);
        assert_eq!(app.files.len(), 3);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.golden, Some(2));

        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.selected.is_empty(), "golden cannot be a candidate");

        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.selected.iter().copied().collect::<Vec<_>>(), vec![0, 1]);

        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.selected.iter().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_start_batch_sends_documents_in_order() {
        let (mut app, rx, _dir) =
            create_test_app(&[("a.md", "# A"), ("b.md", "# B"), ("golden.md", "# Golden")]);
        app.golden = Some(2);
        app.selected = [1, 0].into_iter().collect();

        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state, AppState::Running);
        match rx.try_recv().unwrap() {
            WorkerRequest::RunBatch {
                golden_standard,
                documents,
            } => {
                assert_eq!(golden_standard, "# Golden");
                let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
                assert_eq!(names, vec!["a.md", "b.md"]);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_start_requires_golden_and_candidates() {
        let (mut app, rx, _dir) = create_test_app(&[("a.md", "a")]);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Menu);
        assert!(app.status.as_deref().unwrap().contains("golden"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_invalid_settings_block_evaluation() {
        let (mut app, rx, _dir) = create_test_app(&[("a.md", "a"), ("g.md", "g")]);
        app.golden = Some(1);
        app.selected.insert(0);

        // No Groq key in the environment.
        app.handle_key(key(KeyCode::Char('p')));
        assert!(app.config.is_err());
        assert!(app.status.as_deref().unwrap().contains("GROQ_API_KEY"));
        assert!(!app.can_start());

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Menu);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_settings_changes_are_sent_to_worker() {
        let (mut app, rx, _dir) = create_test_app(&[]);

        app.handle_key(key(KeyCode::Char('+')));
        assert_eq!(app.current_temperature(), 0.4);
        match rx.try_recv().unwrap() {
            WorkerRequest::UpdateConfig(config) => assert_eq!(config.temperature, 0.4),
            other => panic!("unexpected request: {:?}", other),
        }

        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.current_model(), "gpt-4o");

        app.handle_key(key(KeyCode::Char('[')));
        assert_eq!(app.current_max_tokens(), 1750);
    }

    #[test]
    fn test_temperature_stays_in_range() {
        let (mut app, _rx, _dir) = create_test_app(&[]);
        for _ in 0..20 {
            app.handle_key(key(KeyCode::Char('+')));
        }
        assert_eq!(app.current_temperature(), 1.0);
        assert!(app.config.is_ok());
    }

    #[test]
    fn test_worker_events_fill_results() {
        let (mut app, _rx, _dir) = create_test_app(&[]);
        app.state = AppState::Running;

        let result = EvaluationResult::from_verdict(
            "a.md",
            ParsedVerdict {
                verdict: "Pass".to_string(),
                confidence: 0.9,
                explanation: "ok".to_string(),
            },
        );
        app.handle_worker_event(WorkerEvent::Batch(BatchEvent::Evaluated(result.clone())));
        app.handle_worker_event(WorkerEvent::Batch(BatchEvent::Progress(BatchProgress {
            index: 1,
            total: 2,
            filename: "a.md".to_string(),
        })));
        app.handle_worker_event(WorkerEvent::Batch(BatchEvent::Skipped(SkippedDocument {
            name: "b.md".to_string(),
            reason: "content is binary, not text".to_string(),
        })));
        assert_eq!(app.results.len(), 1);
        assert_eq!(app.progress.as_ref().unwrap().index, 1);

        let now = Local::now();
        app.handle_worker_event(WorkerEvent::BatchFinished(BatchOutcome {
            results: vec![result].into_iter().collect(),
            skipped: vec![],
            started_at: now,
            finished_at: now,
        }));
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.skipped.len(), 1);
        assert!(app.status.as_deref().unwrap().contains("1 passed"));
    }

    #[test]
    fn test_export_from_results() {
        let (mut app, _rx, dir) = create_test_app(&[]);
        app.state = AppState::Results;
        app.results.push(EvaluationResult::failed("a.md", "API Error"));

        app.handle_key(key(KeyCode::Char('x')));

        let csv = fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert!(csv.starts_with("Document,Verdict,Confidence,Explanation"));
        assert!(csv.contains("a.md,Error,0.0,API Error"));
        assert!(app.status.as_deref().unwrap().contains("exported"));
    }

    #[test]
    fn test_cli_key_does_not_follow_provider_switch() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let overrides = Overrides {
            api_key: Some((Provider::OpenAi, "sk-openai-cli".to_string())),
            ..Overrides::default()
        };
        let config = settings.resolve(&overrides).unwrap();
        let (tx, rx) = unbounded();
        let mut app = App::new(
            dir.path().to_path_buf(),
            settings,
            overrides,
            config,
            dir.path().join("out.csv"),
            tx,
        );

        app.handle_key(key(KeyCode::Char('p')));
        assert_eq!(app.current_provider(), Provider::Groq);
        assert!(app.config.as_ref().unwrap_err().contains("GROQ_API_KEY"));
        assert!(rx.try_recv().is_err());

        app.handle_key(key(KeyCode::Char('p')));
        assert_eq!(app.config.as_ref().unwrap().api_key, "sk-openai-cli");
    }

    #[test]
    fn test_start_batch_without_worker_returns_to_menu() {
        let (mut app, rx, _dir) = create_test_app(&[("a.md", "a"), ("g.md", "g")]);
        app.golden = Some(1);
        app.selected.insert(0);
        drop(rx);

        app.start_batch();

        assert_eq!(app.state, AppState::Menu);
        assert_eq!(app.status.as_deref(), Some(WORKER_UNAVAILABLE));
        assert!(!app.can_start());
    }

    #[test]
    fn test_settings_change_without_worker_is_reported() {
        let (mut app, rx, _dir) = create_test_app(&[]);
        drop(rx);

        app.handle_key(key(KeyCode::Char('+')));

        assert_eq!(app.status.as_deref(), Some(WORKER_UNAVAILABLE));
        assert!(app.config.is_err());
    }

    #[test]
    fn test_ctrl_c_quits_while_running() {
        let (mut app, _rx, _dir) = create_test_app(&[]);
        app.state = AppState::Running;

        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
