//! Tavily search — the primary web search backend.
//!
//! POSTs the query to `https://api.tavily.com/search` and renders each hit
//! as its URL followed by the extracted content, so the agent can cite the
//! URL as a source.

use crate::{http_client, request_error};
use async_trait::async_trait;
use satscout_config::SearchConfig;
use satscout_core::error::ToolError;
use satscout_core::tool::Tool;
use serde::Deserialize;
use tracing::debug;

const ENDPOINT: &str = "https://api.tavily.com/search";

pub struct TavilySearch {
    client: reqwest::Client,
    api_key: Option<String>,
    max_results: usize,
    timeout_secs: u64,
    description: String,
}

impl TavilySearch {
    pub fn new(config: &SearchConfig, description: impl Into<String>) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            api_key: config.tavily_api_key.clone(),
            max_results: config.max_results,
            timeout_secs: config.timeout_secs,
            description: description.into(),
        }
    }
}

#[async_trait]
impl Tool for TavilySearch {
    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ToolError::NotConfigured {
            tool_name: self.name().into(),
            reason: "TAVILY_API_KEY is not set".into(),
        })?;

        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": self.max_results,
            "search_depth": "advanced",
        });

        debug!(query, "Tavily search");

        let response = self
            .client
            .post(ENDPOINT)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(self.name(), self.timeout_secs, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: format!("HTTP {}: {text}", status.as_u16()),
            });
        }

        let parsed: TavilyResponse =
            response.json().await.map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: format!("Failed to parse response: {e}"),
            })?;

        Ok(render(&parsed))
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Debug, Deserialize)]
struct TavilyHit {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

fn render(response: &TavilyResponse) -> String {
    let mut sections = Vec::new();
    if let Some(answer) = response.answer.as_deref().filter(|a| !a.trim().is_empty()) {
        sections.push(format!("Answer: {answer}"));
    }
    for hit in &response.results {
        sections.push(format!("URL: {}\nContent: {}", hit.url, hit.content.trim()));
    }
    if sections.is_empty() {
        "No search results found.".into()
    } else {
        sections.join("\n\n")
    }
}
