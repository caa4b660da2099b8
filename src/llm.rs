use crate::error::{Error, Result};
use crate::http::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// LLM provider — determines default endpoint and credential env var.
/// All three speak the OpenAI chat-completions wire format.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Nebius,
    #[serde(rename = "openai")]
    OpenAi,
    OpenRouter,
}

impl Provider {
    fn default_base_url(&self) -> &'static str {
        match self {
            Self::Nebius => "https://api.studio.nebius.com/v1",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::Nebius => "NEBIUS_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One message in a chat-completions conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(ChatRole::Assistant, content)
    }

    /// Tool result message answering a specific `tool_call_id`.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }

    fn text(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn text_content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_call_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, as the wire format delivers it.
    pub arguments: String,
}

fn function_call_type() -> String {
    "function".into()
}

/// A tool made available to the model for one request.
#[derive(Debug, Clone)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDef {
    fn to_wire(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    ToolCalls,
    Length,
    Other,
}

impl FinishReason {
    fn from_wire(s: Option<&str>) -> Self {
        match s {
            Some("stop") => Self::Stop,
            Some("tool_calls") => Self::ToolCalls,
            Some("length") => Self::Length,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// One model turn: the assistant message plus bookkeeping.
#[derive(Debug, Clone)]
pub struct Completion {
    pub message: ChatMessage,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

pub struct LlmClient {
    provider: Provider,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
    http: HttpClient,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl LlmClient {
    pub fn new(
        provider: Provider,
        api_key: String,
        model: String,
        max_tokens: u32,
        base_url: Option<String>,
    ) -> Result<Self> {
        let http = HttpClient::new("crewline/0.1.0")?;
        let base_url = base_url
            .unwrap_or_else(|| provider.default_base_url().into())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            provider,
            api_key,
            model,
            max_tokens,
            base_url,
            http,
        })
    }

    /// Build from config, reading the API key from the specified env var.
    pub fn from_config(
        provider: Provider,
        model: String,
        max_tokens: u32,
        api_key_env: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self> {
        let env_var = api_key_env.unwrap_or_else(|| provider.default_api_key_env().into());
        let api_key = std::env::var(&env_var).unwrap_or_default();
        Self::new(provider, api_key, model, max_tokens, base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a full conversation, optionally offering tools, and return the
    /// assistant's next turn.
    pub async fn converse(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
    ) -> Result<Completion> {
        debug!(
            provider = ?self.provider,
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "sending LLM request"
        );

        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages,
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(ToolDef::to_wire).collect())
            },
        };

        let body = serde_json::to_string(&request)
            .map_err(|e| Error::parse(format!("serialize request: {e}")))?;

        let url = format!("{}/chat/completions", self.base_url);
        let response_text = self
            .http
            .post_json_raw(
                &url,
                &body,
                &[("Authorization", &format!("Bearer {}", self.api_key))],
            )
            .await
            .map_err(|e| {
                warn!("LLM API error: {e}");
                e
            })?;

        let resp: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| Error::parse(format!("parse LLM response: {e}")))?;

        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::parse("empty response from LLM"))?;

        Ok(Completion {
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
            message: choice.message,
            usage: resp.usage.unwrap_or_default(),
        })
    }
}

/// Extract JSON from a response that might be wrapped in markdown code fences.
pub fn extract_json(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        let content = &text[start + 7..];
        if let Some(end) = content.find("```") {
            return content[..end].trim();
        }
    }
    if let Some(start) = text.find("```") {
        let content = &text[start + 3..];
        if let Some(end) = content.find("```") {
            let inner = content[..end].trim();
            if inner.starts_with('{') || inner.starts_with('[') {
                return inner;
            }
        }
    }
    if let Some(start) = text.find('{')
        && let Some(end) = text.rfind('}')
    {
        return &text[start..=end];
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = LlmClient::new(
            Provider::Nebius,
            "key".into(),
            "m".into(),
            128,
            Some("https://api.studio.nebius.com/v1/".into()),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://api.studio.nebius.com/v1");
    }

    #[test]
    fn extract_json_handles_fences() {
        let fenced = "Here you go:\n```json\n{\"tool\": \"web_search\"}\n```\nDone.";
        assert_eq!(extract_json(fenced), "{\"tool\": \"web_search\"}");

        let bare = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(bare), "{\"a\": 1}");

        let inline = "prefix {\"a\": 1} suffix";
        assert_eq!(extract_json(inline), "{\"a\": 1}");
    }

    #[test]
    fn assistant_tool_call_round_trips() {
        let wire = r#"{
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "web_search", "arguments": "{\"query\":\"x\"}"}
            }]
        }"#;
        let msg: ChatMessage = serde_json::from_str(wire).unwrap();
        assert_eq!(msg.role, ChatRole::Assistant);
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(msg.tool_calls[0].function.name, "web_search");

        let back = serde_json::to_value(&msg).unwrap();
        assert!(back.get("tool_call_id").is_none());
        assert_eq!(back["tool_calls"][0]["id"], "call_1");
    }

    #[test]
    fn tool_result_serializes_call_id() {
        let msg = ChatMessage::tool_result("call_9", "results here");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["role"], "tool");
        assert_eq!(v["tool_call_id"], "call_9");
        assert!(v.get("tool_calls").is_none());
    }
}
