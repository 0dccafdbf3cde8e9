//! Tool trait — the abstraction over research capabilities.
//!
//! A tool maps a query string to a blob of result text. Tools may call out
//! to the network, but they never hold per-call state.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The outcome of invoking a tool through the registry.
///
/// Failures are folded into `output` so the agent can read them as an
/// observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool the agent asked for
    pub tool_name: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The observation text
    pub output: String,
}

/// The core Tool trait.
///
/// Each search backend (Tavily, SerpAPI, DuckDuckGo) and each site-scoped
/// composite implements this trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "tavily_search").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// Run the tool against a query.
    async fn invoke(&self, query: &str) -> std::result::Result<String, ToolError>;
}

/// An ordered set of tools.
///
/// Order is preserved because it is rendered into the prompt.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// All tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    /// List all registered tool names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, query: &str) -> std::result::Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.invoke(query).await
    }

    /// Execute a tool by name, folding every failure into the observation text.
    pub async fn observe(&self, name: &str, query: &str) -> ToolResult {
        match self.execute(name, query).await {
            Ok(output) => ToolResult {
                tool_name: name.to_string(),
                success: true,
                output,
            },
            Err(ToolError::NotFound(_)) => ToolResult {
                tool_name: name.to_string(),
                success: false,
                output: format!(
                    "{name} is not a valid tool, try one of [{}].",
                    self.names().join(", ")
                ),
            },
            Err(e) => ToolResult {
                tool_name: name.to_string(),
                success: false,
                output: format!("Error: {e}"),
            },
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
