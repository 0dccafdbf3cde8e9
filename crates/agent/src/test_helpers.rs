//! Shared test helpers for the research loop tests.

use async_trait::async_trait;
use satscout_core::error::{ProviderError, ToolError};
use satscout_core::message::Message;
use satscout_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use satscout_core::tool::{Tool, ToolRegistry};
use std::sync::{Arc, Mutex};

/// A mock provider that returns a sequence of scripted completions.
///
/// Each call to `complete` returns the next completion in the queue and
/// records the prompt it was given. Panics if more calls are made than
/// completions provided.
pub struct ScriptedProvider {
    completions: Vec<String>,
    prompts: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new<S: Into<String>>(completions: impl IntoIterator<Item = S>) -> Self {
        Self {
            completions: completions.into_iter().map(Into::into).collect(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// The same completion, `n` times.
    pub fn repeating(text: &str, n: usize) -> Self {
        Self::new(std::iter::repeat_n(text, n))
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// The requests received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let idx = prompts.len();
        let Some(text) = self.completions.get(idx) else {
            panic!(
                "ScriptedProvider: no more completions (call #{idx}, have {})",
                self.completions.len()
            );
        };
        prompts.push(request);
        Ok(make_text_response(text))
    }
}

/// A provider that is always unreachable.
pub struct UnreachableProvider;

#[async_trait]
impl Provider for UnreachableProvider {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A tool that answers every query with the same text.
pub struct StaticTool {
    name: &'static str,
    output: &'static str,
    pub queries: Mutex<Vec<String>>,
}

impl StaticTool {
    pub fn new(name: &'static str, output: &'static str) -> Self {
        Self {
            name,
            output,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Returns canned search results"
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.output.to_string())
    }
}

/// A tool whose every call fails.
pub struct FailingTool(pub &'static str);

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn invoke(&self, _query: &str) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: self.0.into(),
            reason: "upstream returned 503".into(),
        })
    }
}

/// `tavily_search` and `serpapi_search` stand-ins.
pub fn offline_tools() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(StaticTool::new(
        "tavily_search",
        "URL: https://www.isro.gov.in/INSAT_3D.html\nContent: INSAT-3D operates at 820 km",
    )));
    registry.register(Arc::new(StaticTool::new(
        "serpapi_search",
        "INSAT-3D carries an imager and a sounder",
    )));
    registry
}
