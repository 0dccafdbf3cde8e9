//! SerpAPI search (Google results through serpapi.com).
//!
//! Like most SERP wrappers it prefers the most direct answer available:
//! the answer box, then the knowledge graph description, then organic
//! snippets.

use crate::{http_client, request_error};
use async_trait::async_trait;
use satscout_config::SearchConfig;
use satscout_core::error::ToolError;
use satscout_core::tool::Tool;
use serde_json::Value;
use tracing::debug;

const ENDPOINT: &str = "https://serpapi.com/search.json";
const NO_RESULT: &str = "No good search result found";

pub struct SerpApiSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    max_results: usize,
    timeout_secs: u64,
}

impl SerpApiSearch {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            api_key: config.serpapi_api_key.clone(),
            max_results: config.max_results,
            timeout_secs: config.timeout_secs,
        }
    }
}

#[async_trait]
impl Tool for SerpApiSearch {
    fn name(&self) -> &str {
        "serpapi_search"
    }

    fn description(&self) -> &str {
        "Search the web with SerpAPI for more comprehensive information"
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ToolError::NotConfigured {
            tool_name: self.name().into(),
            reason: "SERPAPI_API_KEY is not set".into(),
        })?;

        debug!(query, "SerpAPI search");

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", api_key),
                ("google_domain", "google.com"),
                ("gl", "us"),
                ("hl", "en"),
            ])
            .send()
            .await
            .map_err(|e| request_error(self.name(), self.timeout_secs, e))?;

        let body: Value = response.json().await.map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: format!("Failed to parse response: {e}"),
        })?;

        if let Some(error) = body.get("error").and_then(Value::as_str) {
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: error.to_string(),
            });
        }

        Ok(process_response(&body, self.max_results))
    }
}

/// Pick the most useful text out of a SerpAPI response.
fn process_response(body: &Value, max_results: usize) -> String {
    let answer_box = match body.get("answer_box") {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };

    if let Some(answer_box) = answer_box {
        for key in ["answer", "snippet"] {
            if let Some(text) = answer_box.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
        if let Some(words) = answer_box.get("snippet_highlighted_words").and_then(Value::as_array)
        {
            if let Some(first) = words.first().and_then(Value::as_str) {
                return first.to_string();
            }
        }
    }

    if let Some(description) = body
        .get("knowledge_graph")
        .and_then(|kg| kg.get("description"))
        .and_then(Value::as_str)
    {
        return description.to_string();
    }

    let snippets: Vec<String> = body
        .get("organic_results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|r| {
                    let snippet = r.get("snippet").and_then(Value::as_str)?;
                    Some(match r.get("link").and_then(Value::as_str) {
                        Some(link) => format!("{snippet} (source: {link})"),
                        None => snippet.to_string(),
                    })
                })
                .take(max_results)
                .collect()
        })
        .unwrap_or_default();

    if snippets.is_empty() {
        NO_RESULT.into()
    } else {
        snippets.join("\n")
    }
}
