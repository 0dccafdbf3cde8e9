//! Search tools for the SatScout research pipeline.
//!
//! Each tool maps a free-text query to a blob of result text the agent
//! reads as an observation:
//! - [`TavilySearch`]: Tavily search API, the default backend
//! - [`SerpApiSearch`]: Google results via SerpAPI
//! - [`DuckDuckGoSearch`]: DuckDuckGo instant answers, no key needed
//! - [`SiteScopedSearch`]: Tavily restricted to curated source sites
//!
//! [`tool_set`] assembles the tools each research domain is allowed to use.

pub mod duckduckgo;
pub mod serpapi;
pub mod site_scoped;
pub mod tavily;
pub mod toolset;

pub use duckduckgo::DuckDuckGoSearch;
pub use serpapi::SerpApiSearch;
pub use site_scoped::SiteScopedSearch;
pub use tavily::TavilySearch;
pub use toolset::tool_set;

use std::time::Duration;

/// Shared HTTP client construction for the search backends.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("satscout/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Map a reqwest failure onto the tool error vocabulary.
pub(crate) fn request_error(
    tool_name: &str,
    timeout_secs: u64,
    e: reqwest::Error,
) -> satscout_core::ToolError {
    if e.is_timeout() {
        satscout_core::ToolError::Timeout {
            tool_name: tool_name.into(),
            timeout_secs,
        }
    } else {
        satscout_core::ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: e.to_string(),
        }
    }
}
