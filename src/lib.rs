pub mod ai;
pub mod ai_worker;
pub mod batch;
pub mod config;
pub mod documents;
pub mod error;
pub mod export;
pub mod headless;
pub mod logger;
pub mod models;
pub mod session;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use ai::{parse_response, EvaluationService, ParsedVerdict};
pub use batch::{run_batch, BatchEvent, BatchOutcome};
pub use config::{EvaluationConfig, Overrides, Provider, Settings};
pub use error::{ConfigError, DecodeError, ExportError, HeadlessError, RemoteCallError};
pub use headless::{run_files, HeadlessRun};
pub use models::{AppState, EvaluationRequest, EvaluationResult, ResultSet};
