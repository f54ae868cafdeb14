pub mod client;
pub mod evaluator;
pub mod parser;
pub mod prompt;

// Public API exports
pub use client::{ChatClient, ChatCompletionsClient, ClientFactory, HttpClientFactory};
pub use evaluator::EvaluationService;
pub use parser::{parse_response, ParsedVerdict};
pub use prompt::{build_prompt, SYSTEM_PROMPT};
