use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PROVIDER: Provider = Provider::OpenAi;
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_TOKENS: i64 = 2000;

const OPENAI_MODELS: &[&str] = &["gpt-4", "gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"];
const GROQ_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "mixtral-8x7b-32768",
    "llama2-70b-4096",
];

/// The chat completion backends a judge can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Groq,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Groq];

    pub fn id(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Groq => "groq",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Groq => "Groq",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    /// Models offered in the settings panel. Other names are accepted as-is.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            Provider::OpenAi => OPENAI_MODELS,
            Provider::Groq => GROQ_MODELS,
        }
    }

    pub fn default_model(self) -> &'static str {
        self.models()[0]
    }

    pub fn next(self) -> Provider {
        match self {
            Provider::OpenAi => Provider::Groq,
            Provider::Groq => Provider::OpenAi,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "groq" => Ok(Provider::Groq),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Fully validated settings for one evaluation run.
#[derive(Clone, PartialEq)]
pub struct EvaluationConfig {
    pub provider: Provider,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub api_key: String,
}

impl EvaluationConfig {
    /// One-line description for status bars and logs.
    pub fn summary(&self) -> String {
        format!(
            "{} / {} (temperature {:.1}, max tokens {})",
            self.provider, self.model, self.temperature, self.max_tokens
        )
    }
}

impl fmt::Debug for EvaluationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// User-selected values that take precedence over the environment.
#[derive(Clone, Default, PartialEq)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
    /// Credential typed by the user, bound to the provider it was given for.
    pub api_key: Option<(Provider, String)>,
}

/// Snapshot of the environment taken once at startup.
#[derive(Clone, Default)]
pub struct Settings {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
}

impl Settings {
    /// Reads `LLM_PROVIDER`, `LLM_MODEL`, `LLM_TEMPERATURE`, `MAX_TOKENS` and
    /// the provider credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let temperature = match get("LLM_TEMPERATURE") {
            Some(raw) => Some(raw.trim().parse::<f64>().map_err(|_| {
                ConfigError::InvalidNumber {
                    var: "LLM_TEMPERATURE",
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        let max_tokens = match get("MAX_TOKENS") {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                ConfigError::InvalidNumber {
                    var: "MAX_TOKENS",
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            provider: get("LLM_PROVIDER"),
            model: get("LLM_MODEL"),
            temperature,
            max_tokens,
            openai_api_key: get(Provider::OpenAi.api_key_var()),
            groq_api_key: get(Provider::Groq.api_key_var()),
        })
    }

    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Groq => self.groq_api_key.as_deref(),
        }
    }

    /// Provider that applies when no override names one.
    pub fn default_provider(&self) -> Result<Provider, ConfigError> {
        match &self.provider {
            Some(name) => name.parse(),
            None => Ok(DEFAULT_PROVIDER),
        }
    }

    /// Merges `overrides` over the environment and validates the result.
    pub fn resolve(&self, overrides: &Overrides) -> Result<EvaluationConfig, ConfigError> {
        let provider = match &overrides.provider {
            Some(name) => name.parse::<Provider>()?,
            None => self.default_provider()?,
        };

        let api_key = overrides
            .api_key
            .as_ref()
            .filter(|(owner, key)| *owner == provider && !key.trim().is_empty())
            .map(|(_, key)| key.as_str())
            .or_else(|| self.api_key(provider).filter(|k| !k.trim().is_empty()))
            .ok_or(ConfigError::MissingApiKey {
                provider: provider.display_name(),
                var: provider.api_key_var(),
            })?
            .trim()
            .to_string();

        let temperature = overrides
            .temperature
            .or(self.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);
        if !temperature.is_finite() || !(0.0..=1.0).contains(&temperature) {
            return Err(ConfigError::TemperatureOutOfRange(temperature));
        }

        let requested_tokens = overrides
            .max_tokens
            .or(self.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);
        let max_tokens = u32::try_from(requested_tokens)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidMaxTokens(requested_tokens))?;

        let model = overrides
            .model
            .clone()
            .or_else(|| self.model.clone())
            .unwrap_or_else(|| provider.default_model().to_string());
        let model = model.trim().to_string();
        if model.is_empty() {
            return Err(ConfigError::MissingModel);
        }

        Ok(EvaluationConfig {
            provider,
            model,
            temperature,
            max_tokens,
            api_key,
        })
    }
}
