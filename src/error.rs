use thiserror::Error;

/// Invalid or missing settings. Nothing is evaluated while one of these is
/// outstanding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
    #[error("{provider} API key is required ({var} is not set)")]
    MissingApiKey {
        provider: &'static str,
        var: &'static str,
    },
    #[error("Model name must not be empty")]
    MissingModel,
    #[error("Temperature must be between 0.0 and 1.0 (got {0})")]
    TemperatureOutOfRange(f64),
    #[error("Max tokens must be greater than 0 (got {0})")]
    InvalidMaxTokens(i64),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("Failed to create {provider} client: {message}")]
    Client {
        provider: &'static str,
        message: String,
    },
}

/// A document that could not be read as text.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Could not read {name}: {reason}")]
pub struct DecodeError {
    pub name: String,
    pub reason: String,
}

/// Any failure of the remote text-generation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteCallError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("{provider} API error (status {status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("Response format error: {0}")]
    ResponseFormat(String),
}

impl From<reqwest::Error> for RemoteCallError {
    fn from(err: reqwest::Error) -> Self {
        RemoteCallError::Http(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a command-line run stops before or after the batch.
#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Golden standard is unusable. {0}")]
    Golden(DecodeError),
    #[error("No readable documents to evaluate")]
    NoDocuments,
    #[error(transparent)]
    Export(#[from] ExportError),
}
