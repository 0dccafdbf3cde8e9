//! Domain profiles: the configuration that specializes the one pipeline.

use crate::prompt::PromptTemplate;
use satscout_config::SearchConfig;
use satscout_core::schema::{Domain, Schema, define_schema};
use satscout_core::tool::ToolRegistry;
use std::sync::Arc;

/// Everything domain-specific about a research run.
#[derive(Debug, Clone)]
pub struct DomainProfile {
    pub domain: Domain,
    pub schema: Schema,
    pub tools: Arc<ToolRegistry>,
    pub template: PromptTemplate,
}

impl DomainProfile {
    /// A profile with a caller-supplied tool set.
    pub fn new(domain: Domain, tools: ToolRegistry) -> Self {
        Self {
            domain,
            schema: define_schema(domain),
            tools: Arc::new(tools),
            template: PromptTemplate::for_domain(domain),
        }
    }

    /// A profile with the live search tools for the domain.
    pub fn from_config(domain: Domain, search: &SearchConfig) -> Self {
        Self::new(domain, satscout_tools::tool_set(domain, search))
    }

    pub fn build_prompt(&self, entity: &str, scratchpad: &str) -> String {
        self.template
            .render(&self.schema, &self.tools, entity, scratchpad)
    }
}
