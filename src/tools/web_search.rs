//! Google web search via the Serper API.

use crate::http::HttpClient;
use crate::llm::ToolDef;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

const SEARCH_URL: &str = "https://google.serper.dev/search";

pub fn definition() -> ToolDef {
    ToolDef {
        name: "web_search".into(),
        description: "Search the web with Google. Returns the top results with title, \
                      URL, and snippet. Use to find current information, news, and \
                      sources on any topic."
            .into(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query."
                }
            },
            "required": ["query"]
        }),
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default, rename = "answerBox")]
    answer_box: Option<AnswerBox>,
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct AnswerBox {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[derive(Deserialize)]
struct OrganicResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

pub async fn run(
    http: &HttpClient,
    api_key: &str,
    max_results: usize,
    input: &Value,
) -> (String, bool) {
    let query = match input["query"].as_str() {
        Some(q) if !q.trim().is_empty() => q,
        _ => return ("Missing 'query' parameter".into(), true),
    };

    let body = json!({ "q": query, "num": max_results }).to_string();
    let response: SearchResponse = match http
        .post_json(SEARCH_URL, &body, &[("X-API-KEY", api_key)])
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!(query, error = %e, "web search failed");
            return (format!("Search failed: {e}"), true);
        }
    };

    let text = format_results(&response, max_results);
    if text.is_empty() {
        (format!("No results for '{query}'"), false)
    } else {
        (text, false)
    }
}

fn format_results(response: &SearchResponse, max_results: usize) -> String {
    let mut out = String::new();

    if let Some(answer_box) = &response.answer_box {
        let answer = answer_box
            .answer
            .as_deref()
            .or(answer_box.snippet.as_deref());
        if let Some(answer) = answer {
            out.push_str(&format!("Answer: {answer}\n\n"));
        }
    }

    for (i, result) in response.organic.iter().take(max_results).enumerate() {
        out.push_str(&format!(
            "{}. {}\n   {}\n   {}\n",
            i + 1,
            result.title,
            result.link,
            result.snippet,
        ));
    }

    out.trim_end().to_string()
}
