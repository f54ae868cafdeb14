use crate::ai::ParsedVerdict;
use crate::batch::{BatchEvent, BatchOutcome};
use crate::config::EvaluationConfig;
use crate::documents::UploadedDocument;
use serde::Serialize;

pub const VERDICT_ERROR: &str = "Error";

/// One golden standard / candidate pair, built right before it is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub golden_standard: String,
    pub candidate: String,
    pub source_filename: String,
}

impl EvaluationRequest {
    pub fn new(
        golden_standard: impl Into<String>,
        candidate: impl Into<String>,
        source_filename: impl Into<String>,
    ) -> Self {
        Self {
            golden_standard: golden_standard.into(),
            candidate: candidate.into(),
            source_filename: source_filename.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub document: String,
    pub verdict: String,
    pub confidence: f64,
    pub explanation: String,
    pub success: bool,
    pub error: Option<String>,
}

impl EvaluationResult {
    pub fn from_verdict(document: impl Into<String>, parsed: ParsedVerdict) -> Self {
        Self {
            document: document.into(),
            verdict: parsed.verdict,
            confidence: parsed.confidence,
            explanation: parsed.explanation,
            success: true,
            error: None,
        }
    }

    /// The remote call failed; the message doubles as the explanation.
    pub fn failed(document: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            document: document.into(),
            verdict: VERDICT_ERROR.to_string(),
            confidence: 0.0,
            explanation: message.clone(),
            success: false,
            error: Some(message),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.success && self.verdict.eq_ignore_ascii_case("pass")
    }
}

/// Results of one batch run in upload order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet(Vec<EvaluationResult>);

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: EvaluationResult) {
        self.0.push(result);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EvaluationResult> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvaluationResult> {
        self.0.iter()
    }

    pub fn passed(&self) -> usize {
        self.0.iter().filter(|r| r.is_pass()).count()
    }

    pub fn errors(&self) -> usize {
        self.0.iter().filter(|r| !r.success).count()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a EvaluationResult;
    type IntoIter = std::slice::Iter<'a, EvaluationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<EvaluationResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = EvaluationResult>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug)]
pub enum WorkerRequest {
    UpdateConfig(EvaluationConfig),
    RunBatch {
        golden_standard: String,
        documents: Vec<UploadedDocument>,
    },
}

#[derive(Debug)]
pub enum WorkerEvent {
    ConfigApplied { rebuilt: bool },
    ConfigRejected(String),
    Batch(BatchEvent),
    BatchFinished(BatchOutcome),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AppState {
    Menu,
    Running,
    Results,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_shape() {
        let result = EvaluationResult::failed("doc.md", "API Error");
        assert!(!result.success);
        assert_eq!(result.verdict, "Error");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.explanation, "API Error");
        assert_eq!(result.error.as_deref(), Some("API Error"));
    }

    #[test]
    fn test_result_set_counts() {
        let results: ResultSet = vec![
            EvaluationResult::from_verdict(
                "a.md",
                ParsedVerdict {
                    verdict: "Pass".to_string(),
                    confidence: 0.8,
                    explanation: String::new(),
                },
            ),
            EvaluationResult::from_verdict("b.md", ParsedVerdict::default()),
            EvaluationResult::failed("c.md", "timeout"),
        ]
        .into_iter()
        .collect();

        assert_eq!(results.len(), 3);
        assert_eq!(results.passed(), 1);
        assert_eq!(results.errors(), 1);
        let names: Vec<&str> = results.iter().map(|r| r.document.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.md", "c.md"]);
    }
}
