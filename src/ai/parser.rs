const VERDICT_PREFIX: &str = "VERDICT:";
const CONFIDENCE_PREFIX: &str = "CONFIDENCE:";
const EXPLANATION_PREFIX: &str = "EXPLANATION:";

/// Fields recovered from a judge response. Missing fields keep their
/// defaults: empty verdict, 0.0 confidence, empty explanation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedVerdict {
    pub verdict: String,
    pub confidence: f64,
    pub explanation: String,
}

/// Best-effort line scan of a `VERDICT:/CONFIDENCE:/EXPLANATION:` response.
///
/// Prefixes are case sensitive. Verdict and confidence take the text up to the
/// next colon; the explanation keeps everything after its prefix. When a
/// prefix repeats, the last line wins.
pub fn parse_response(raw: &str) -> ParsedVerdict {
    let mut parsed = ParsedVerdict::default();

    for line in raw.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(VERDICT_PREFIX) {
            parsed.verdict = first_token(rest).to_string();
        } else if let Some(rest) = line.strip_prefix(CONFIDENCE_PREFIX) {
            parsed.confidence = parse_confidence(first_token(rest));
        } else if let Some(rest) = line.strip_prefix(EXPLANATION_PREFIX) {
            parsed.explanation = rest.trim().to_string();
        }
    }

    if !(0.0..=1.0).contains(&parsed.confidence) {
        tracing::warn!(
            confidence = parsed.confidence,
            "judge returned a confidence outside [0, 1]"
        );
    }

    parsed
}

fn first_token(rest: &str) -> &str {
    rest.split(':').next().unwrap_or_default().trim()
}

fn parse_confidence(token: &str) -> f64 {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}
