use crate::ai::client::{ChatClient, ClientFactory, HttpClientFactory};
use crate::ai::parser::parse_response;
use crate::ai::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::config::EvaluationConfig;
use crate::error::ConfigError;
use crate::models::{EvaluationRequest, EvaluationResult};
use std::sync::Arc;

/// Holds the active configuration and the client built from it.
///
/// Construct one per process and hand it to whatever runs evaluations.
pub struct EvaluationService {
    config: EvaluationConfig,
    client: Box<dyn ChatClient>,
    factory: Arc<dyn ClientFactory>,
}

impl EvaluationService {
    pub fn new(
        config: EvaluationConfig,
        factory: Arc<dyn ClientFactory>,
    ) -> Result<Self, ConfigError> {
        let client = factory.connect(&config)?;
        tracing::info!(config = %config.summary(), "evaluation service ready");
        Ok(Self {
            config,
            client,
            factory,
        })
    }

    /// Service backed by the real HTTP clients.
    pub fn with_http(config: EvaluationConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(HttpClientFactory))
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Applies a new configuration. The client is rebuilt only when the
    /// configuration actually changed; returns whether it was.
    ///
    /// On error the previous configuration and client stay in place.
    pub fn update_config(&mut self, config: EvaluationConfig) -> Result<bool, ConfigError> {
        if config == self.config {
            tracing::debug!("configuration unchanged, keeping client");
            return Ok(false);
        }

        let client = self.factory.connect(&config)?;
        tracing::info!(config = %config.summary(), "evaluation client rebuilt");
        self.client = client;
        self.config = config;
        Ok(true)
    }

    /// Judges one candidate against the golden standard. Never fails: a
    /// remote error is reported as an `Error` verdict.
    pub async fn evaluate(&self, golden_standard: &str, candidate: &str) -> EvaluationResult {
        self.judge("", golden_standard, candidate).await
    }

    pub async fn evaluate_request(&self, request: &EvaluationRequest) -> EvaluationResult {
        self.judge(
            &request.source_filename,
            &request.golden_standard,
            &request.candidate,
        )
        .await
    }

    async fn judge(&self, document: &str, golden_standard: &str, candidate: &str) -> EvaluationResult {
        let prompt = build_prompt(golden_standard, candidate);
        tracing::info!(document, provider = self.client.provider().id(), "starting evaluation");

        match self.client.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => {
                tracing::debug!(document, raw = %raw, "raw judge response");
                let parsed = parse_response(&raw);
                tracing::info!(
                    document,
                    verdict = %parsed.verdict,
                    confidence = parsed.confidence,
                    "evaluation complete"
                );
                EvaluationResult::from_verdict(document, parsed)
            }
            Err(e) => {
                tracing::error!(document, error = %e, "evaluation failed");
                EvaluationResult::failed(document, e.to_string())
            }
        }
    }
}
