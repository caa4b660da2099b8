use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub crew: CrewConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: crate::llm::Provider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: crate::llm::Provider::default(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key_env: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_serper_key_env")]
    pub serper_api_key_env: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            serper_api_key_env: default_serper_key_env(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CrewConfig {
    /// Max tool-use turns per task before the agent must answer.
    #[serde(default = "default_max_tool_turns")]
    pub max_tool_turns: u32,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            max_tool_turns: default_max_tool_turns(),
        }
    }
}

// Defaults
fn default_model() -> String {
    "meta-llama/Meta-Llama-3.1-70B-Instruct".into()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_serper_key_env() -> String {
    "SERPER_API_KEY".into()
}
fn default_max_results() -> usize {
    5
}
fn default_max_tool_turns() -> u32 {
    6
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config {}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| Error::config(format!("Failed to parse config: {e}")))
    }

    /// Check that the LLM credential env var resolves to a non-empty value.
    pub fn validate(&self) -> Result<()> {
        let env_var = self
            .llm
            .api_key_env
            .clone()
            .unwrap_or_else(|| self.llm.provider.default_api_key_env().into());
        let key = std::env::var(&env_var).unwrap_or_default();
        if key.is_empty() {
            return Err(Error::config(format!(
                "{env_var} not set. Export it or point [llm].api_key_env at another variable"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let toml = r#"
[llm]
provider = "openrouter"
model = "test-model"
max_tokens = 2048
api_key_env = "MY_KEY"
base_url = "https://example.com/v1"

[tools]
serper_api_key_env = "MY_SERPER_KEY"
max_results = 3

[crew]
max_tool_turns = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.model, "test-model");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.llm.api_key_env.as_deref(), Some("MY_KEY"));
        assert_eq!(config.tools.serper_api_key_env, "MY_SERPER_KEY");
        assert_eq!(config.tools.max_results, 3);
        assert_eq!(config.crew.max_tool_turns, 10);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.llm.model, "meta-llama/Meta-Llama-3.1-70B-Instruct");
        assert_eq!(config.llm.max_tokens, 4096);
        assert!(config.llm.api_key_env.is_none());
        assert_eq!(config.tools.serper_api_key_env, "SERPER_API_KEY");
        assert_eq!(config.tools.max_results, 5);
        assert_eq!(config.crew.max_tool_turns, 6);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let toml = r#"
[llm]
model = "other-model"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.model, "other-model");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.crew.max_tool_turns, 6);
    }

    #[test]
    fn validate_rejects_unset_key_env() {
        let toml = r#"
[llm]
api_key_env = "CREWLINE_TEST_DEFINITELY_UNSET"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }
}
