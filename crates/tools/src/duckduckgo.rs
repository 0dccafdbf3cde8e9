//! DuckDuckGo instant answers, the keyless fallback backend.
//!
//! Uses the instant answer API. It returns abstracts and related topics
//! rather than a full result page, which is enough for encyclopedic facts.

use crate::{http_client, request_error};
use async_trait::async_trait;
use satscout_config::SearchConfig;
use satscout_core::error::ToolError;
use satscout_core::tool::Tool;
use serde::Deserialize;
use tracing::debug;

const ENDPOINT: &str = "https://api.duckduckgo.com/";
const NO_RESULT: &str = "No good DuckDuckGo Search Result was found";

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    max_results: usize,
    timeout_secs: u64,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            max_results: config.max_results,
            timeout_secs: config.timeout_secs,
        }
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Alternative search engine. Use when other searches don't return sufficient results."
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        debug!(query, "DuckDuckGo search");

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| request_error(self.name(), self.timeout_secs, e))?;

        // The API serves JSON as application/x-javascript
        let text = response
            .text()
            .await
            .map_err(|e| request_error(self.name(), self.timeout_secs, e))?;

        let parsed: InstantAnswer =
            serde_json::from_str(&text).map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: format!("Failed to parse response: {e}"),
            })?;

        Ok(render(&parsed, self.max_results))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "FirstURL")]
    first_url: Option<String>,
}

fn render(answer: &InstantAnswer, max_results: usize) -> String {
    let mut parts = Vec::new();
    if !answer.answer.is_empty() {
        parts.push(answer.answer.clone());
    }
    if !answer.abstract_text.is_empty() {
        if answer.abstract_url.is_empty() {
            parts.push(answer.abstract_text.clone());
        } else {
            parts.push(format!("{} (source: {})", answer.abstract_text, answer.abstract_url));
        }
    }
    parts.extend(
        answer
            .related_topics
            .iter()
            .filter_map(|t| {
                let text = t.text.as_deref().filter(|s| !s.is_empty())?;
                Some(match t.first_url.as_deref() {
                    Some(url) => format!("{text} (source: {url})"),
                    None => text.to_string(),
                })
            })
            .take(max_results),
    );

    if parts.is_empty() {
        NO_RESULT.into()
    } else {
        parts.join("\n")
    }
}
