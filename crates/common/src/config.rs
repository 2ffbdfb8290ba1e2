use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when the config file carries no API key.
pub const API_KEY_ENV: &str = "SVC_ROUTER_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat-completions endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Optional; falls back to the `SVC_ROUTER_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Step budget for the ReAct loop
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Timeout for service calls made from the interactive ReAct loop
    #[serde(default = "default_react_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for service calls made by the batch plan executor
    #[serde(default = "default_plan_timeout")]
    pub plan_timeout_secs: u64,

    /// Cap on accumulated observation text fed back into prompts.
    /// None keeps the full history, which grows without bound on long runs.
    #[serde(default)]
    pub max_observation_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry file loaded at startup; a missing file yields an empty
    /// registry
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_max_steps() -> u32 {
    10
}

fn default_react_timeout() -> u64 {
    10
}

fn default_plan_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            request_timeout_secs: default_react_timeout(),
            plan_timeout_secs: default_plan_timeout(),
            max_observation_chars: None,
        }
    }
}

impl SystemConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: SystemConfig = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Fill credentials from the environment when the file leaves them unset.
    pub fn apply_env(&mut self) {
        if self.llm.api_key.is_none() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                if !key.is_empty() {
                    self.llm.api_key = Some(key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SystemConfig::default();
        assert_eq!(config.engine.max_steps, 10);
        assert_eq!(config.engine.request_timeout_secs, 10);
        assert_eq!(config.engine.plan_timeout_secs, 30);
        assert!(config.engine.max_observation_chars.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: SystemConfig = toml::from_str(
            r#"
            [llm]
            model = "llama3.3:70b"

            [engine]
            max_steps = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "llama3.3:70b");
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.engine.max_steps, 5);
        assert_eq!(config.engine.plan_timeout_secs, 30);
    }
}
