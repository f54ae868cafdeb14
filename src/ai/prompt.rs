pub const SYSTEM_PROMPT: &str = "You are a judge and your task is to evaluate documents based on the provided golden standard. \
Analyze the content thoroughly and provide a verdict with confidence score.";

/// Output contract the parser relies on. Sent to the model verbatim.
pub const RESPONSE_FORMAT: &str = "VERDICT: [Pass/Fail]
CONFIDENCE: [0-1]
EXPLANATION: [Your explanation]";

/// Builds the user prompt for one candidate. Inputs are embedded unmodified.
pub fn build_prompt(golden_standard: &str, candidate: &str) -> String {
    format!(
        r#"GOLDEN STANDARD:
{golden_standard}

DOCUMENT TO EVALUATE:
{candidate}

Please provide:
1. A verdict (Pass/Fail) based on the document's alignment with the golden standard
2. A confidence score between 0 and 1 (1 being most confident)
3. A brief explanation for your verdict

Format your response as:
{RESPONSE_FORMAT}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_both_documents() {
        let prompt = build_prompt("# Standard\n- Item 1", "# Candidate\n- Item 2");
        assert!(prompt.contains("GOLDEN STANDARD:\n# Standard\n- Item 1"));
        assert!(prompt.contains("DOCUMENT TO EVALUATE:\n# Candidate\n- Item 2"));
    }

    #[test]
    fn test_prompt_states_output_format_verbatim() {
        let prompt = build_prompt("a", "b");
        assert!(prompt.contains("VERDICT: [Pass/Fail]\nCONFIDENCE: [0-1]\nEXPLANATION:"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt("x", "y"), build_prompt("x", "y"));
    }

    #[test]
    fn test_large_input_is_not_truncated() {
        let candidate = "lorem ipsum ".repeat(10_000);
        let prompt = build_prompt("std", &candidate);
        assert!(prompt.contains(&candidate));
    }
}
