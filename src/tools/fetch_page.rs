//! Fetch a web page and extract its readable text.

use crate::http::HttpClient;
use crate::llm::ToolDef;
use scraper::{Html, Selector};
use serde_json::{Value, json};
use tracing::warn;

pub fn definition() -> ToolDef {
    ToolDef {
        name: "fetch_page".into(),
        description: "Fetch a web page by URL and return its readable text content. \
                      Use to read an article or source found via search."
            .into(),
        parameters: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The http(s) URL of the page to fetch."
                }
            },
            "required": ["url"]
        }),
    }
}

pub async fn run(http: &HttpClient, input: &Value) -> (String, bool) {
    let url = match input["url"].as_str() {
        Some(u) => u,
        None => return ("Missing 'url' parameter".into(), true),
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return ("URL must start with http:// or https://".into(), true);
    }

    let html_text = match http.get_text(url).await {
        Ok(t) => t,
        Err(e) => {
            warn!(url, error = %e, "page fetch failed");
            return (format!("Fetch failed: {e}"), true);
        }
    };

    let text = extract_text(&html_text);
    if text.is_empty() {
        ("Page contained no readable text".into(), true)
    } else {
        (text, false)
    }
}

/// Pull the title plus paragraph/heading/list text out of an HTML document.
fn extract_text(html_text: &str) -> String {
    let document = Html::parse_document(html_text);
    let mut out = String::new();

    if let Ok(title_sel) = Selector::parse("title")
        && let Some(title) = document.select(&title_sel).next()
    {
        let title_text = title.text().collect::<String>().trim().to_string();
        if !title_text.is_empty() {
            out.push_str(&format!("# {title_text}\n\n"));
        }
    }

    if let Ok(content_sel) = Selector::parse("p, h1, h2, h3, li") {
        let mut seen = Vec::new();
        for element in document.select(&content_sel) {
            let text = element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            // Nested matches (li > p) produce duplicates; keep the first occurrence
            if text.len() > 2 && !seen.contains(&text) {
                out.push_str(&text);
                out.push('\n');
                seen.push(text);
            }
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_paragraphs() {
        let html = "<html><head><title>Quantum News</title></head>\
                    <body><h1>Breakthrough</h1><p>Qubits doubled.</p>\
                    <script>ignore();</script></body></html>";
        let text = extract_text(html);
        assert!(text.starts_with("# Quantum News"));
        assert!(text.contains("Breakthrough"));
        assert!(text.contains("Qubits doubled."));
        assert!(!text.contains("ignore"));
    }

    #[test]
    fn collapses_whitespace_and_skips_duplicates() {
        let html = "<body><p>one\n   two</p><ul><li><p>item</p></li></ul></body>";
        let text = extract_text(html);
        assert!(text.contains("one two"));
        assert_eq!(text.matches("item").count(), 1);
    }

    #[test]
    fn empty_document_reports_no_text() {
        assert!(extract_text("<html><body></body></html>").is_empty());
    }
}
