pub mod config;
pub mod crew;
pub mod error;
pub mod http;
pub mod llm;
pub mod output;
pub mod pipelines;
pub mod tools;

/// CLI override for LLM provider/model.
pub struct LlmOverride {
    pub provider: llm::Provider,
    pub model: String,
}
