//! YouTube video search via the Serper videos endpoint.
//!
//! Returns video metadata (title, channel, date, duration, link) — the raw
//! material for niche analysis: which videos exist, who published them, when.

use crate::http::HttpClient;
use crate::llm::ToolDef;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

const VIDEOS_URL: &str = "https://google.serper.dev/videos";

pub fn definition() -> ToolDef {
    ToolDef {
        name: "youtube_search".into(),
        description: "Search for YouTube videos. Returns title, channel, publish date, \
                      duration, and URL for each match. Use to analyze what videos \
                      exist in a niche and who publishes them."
            .into(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The video search query, e.g. a niche or topic."
                }
            },
            "required": ["query"]
        }),
    }
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    videos: Vec<VideoResult>,
}

#[derive(Deserialize)]
struct VideoResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    duration: Option<String>,
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
    let response: VideosResponse = match http
        .post_json(VIDEOS_URL, &body, &[("X-API-KEY", api_key)])
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!(query, error = %e, "youtube search failed");
            return (format!("Video search failed: {e}"), true);
        }
    };

    if response.videos.is_empty() {
        return (format!("No videos found for '{query}'"), false);
    }

    (format_results(&response, max_results), false)
}

fn format_results(response: &VideosResponse, max_results: usize) -> String {
    let mut out = String::new();
    for (i, video) in response.videos.iter().take(max_results).enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, video.title));

        let mut meta = Vec::new();
        if let Some(channel) = &video.channel {
            meta.push(format!("channel: {channel}"));
        }
        if let Some(date) = &video.date {
            meta.push(format!("published: {date}"));
        }
        if let Some(duration) = &video.duration {
            meta.push(format!("duration: {duration}"));
        }
        if !meta.is_empty() {
            out.push_str(&format!("   {}\n", meta.join(" | ")));
        }
        if let Some(snippet) = &video.snippet {
            out.push_str(&format!("   {snippet}\n"));
        }
        out.push_str(&format!("   {}\n", video.link));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_video_metadata() {
        let raw = r#"{
            "videos": [{
                "title": "Building AI Agents",
                "link": "https://youtube.com/watch?v=abc",
                "channel": "DevChannel",
                "date": "2 weeks ago",
                "duration": "12:34"
            }]
        }"#;
        let resp: VideosResponse = serde_json::from_str(raw).unwrap();
        let text = format_results(&resp, 5);
        assert!(text.contains("Building AI Agents"));
        assert!(text.contains("channel: DevChannel"));
        assert!(text.contains("duration: 12:34"));
        assert!(text.contains("https://youtube.com/watch?v=abc"));
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let raw = r#"{"videos": [{"title": "T", "link": "https://y.t/v"}]}"#;
        let resp: VideosResponse = serde_json::from_str(raw).unwrap();
        let text = format_results(&resp, 5);
        assert!(text.contains("1. T"));
        assert!(!text.contains("channel:"));
    }
}
