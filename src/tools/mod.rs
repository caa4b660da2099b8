//! Capability plugins agents may invoke mid-task: web search, YouTube video
//! search (both backed by the Serper API), and page fetching.
//!
//! Tools are dispatched by name and return `(result_text, is_error)` so a
//! failed call flows back to the model as an error tool message instead of
//! aborting the run.

pub mod fetch_page;
pub mod web_search;
pub mod youtube;

use crate::config::ToolsConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::llm::ToolDef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Max chars returned from any single tool invocation.
const MAX_RESULT_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    WebSearch,
    YoutubeSearch,
    FetchPage,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::YoutubeSearch => "youtube_search",
            Self::FetchPage => "fetch_page",
        }
    }

    /// Whether the tool needs the Serper API key to operate.
    fn needs_serper_key(&self) -> bool {
        matches!(self, Self::WebSearch | Self::YoutubeSearch)
    }

    fn definition(&self) -> ToolDef {
        match self {
            Self::WebSearch => web_search::definition(),
            Self::YoutubeSearch => youtube::definition(),
            Self::FetchPage => fetch_page::definition(),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry of available tools, holding the shared HTTP client and the
/// Serper credential resolved from the environment.
pub struct ToolSet {
    http: HttpClient,
    serper_api_key: String,
    max_results: usize,
}

impl ToolSet {
    pub fn new(config: &ToolsConfig) -> Result<Self> {
        let serper_api_key = std::env::var(&config.serper_api_key_env).unwrap_or_default();
        Ok(Self {
            http: HttpClient::new("crewline/0.1.0")?,
            serper_api_key,
            max_results: config.max_results,
        })
    }

    /// Fail early if any requested tool is missing its credential.
    pub fn ensure_available(&self, kinds: &[ToolKind]) -> Result<()> {
        if self.serper_api_key.is_empty()
            && let Some(kind) = kinds.iter().find(|k| k.needs_serper_key())
        {
            return Err(crate::error::Error::config(format!(
                "tool '{kind}' requires a Serper API key; set SERPER_API_KEY \
                 (or the env var named in [tools].serper_api_key_env)"
            )));
        }
        Ok(())
    }

    /// Build the tool definitions sent to the LLM, deduplicated in order.
    pub fn definitions(&self, kinds: &[ToolKind]) -> Vec<ToolDef> {
        let mut seen = Vec::new();
        let mut defs = Vec::new();
        for kind in kinds {
            if seen.contains(kind) {
                continue;
            }
            seen.push(*kind);
            defs.push(kind.definition());
        }
        defs
    }

    /// Dispatch a tool call by name. Returns `(result_text, is_error)`.
    pub async fn dispatch(&self, tool_name: &str, input: &Value) -> (String, bool) {
        debug!(tool = tool_name, "executing tool");
        let (result, is_error) = match tool_name {
            "web_search" => {
                web_search::run(&self.http, &self.serper_api_key, self.max_results, input).await
            }
            "youtube_search" => {
                youtube::run(&self.http, &self.serper_api_key, self.max_results, input).await
            }
            "fetch_page" => fetch_page::run(&self.http, input).await,
            _ => (format!("Unknown tool: {tool_name}"), true),
        };
        (truncate(result), is_error)
    }
}

fn truncate(s: String) -> String {
    if s.len() <= MAX_RESULT_CHARS {
        s
    } else {
        let mut end = MAX_RESULT_CHARS;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let mut out = s[..end].to_string();
        out.push_str("\n... [truncated]");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_dedup_preserving_order() {
        let set = ToolSet::new(&ToolsConfig::default()).unwrap();
        let defs = set.definitions(&[
            ToolKind::YoutubeSearch,
            ToolKind::WebSearch,
            ToolKind::YoutubeSearch,
        ]);
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["youtube_search", "web_search"]);
    }

    #[test]
    fn tool_kind_names_match_definitions() {
        for kind in [ToolKind::WebSearch, ToolKind::YoutubeSearch, ToolKind::FetchPage] {
            assert_eq!(kind.definition().name, kind.name());
        }
    }

    #[test]
    fn truncate_caps_long_results() {
        let long = "x".repeat(MAX_RESULT_CHARS + 100);
        let out = truncate(long);
        assert!(out.ends_with("[truncated]"));
        assert!(out.len() < MAX_RESULT_CHARS + 20);
    }

    #[test]
    fn tool_kind_serde_uses_snake_case() {
        let kind: ToolKind = serde_json::from_str("\"youtube_search\"").unwrap();
        assert_eq!(kind, ToolKind::YoutubeSearch);
        assert_eq!(serde_json::to_string(&ToolKind::WebSearch).unwrap(), "\"web_search\"");
    }
}
