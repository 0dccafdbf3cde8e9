//! Per-domain tool composition.

use crate::{DuckDuckGoSearch, SerpApiSearch, SiteScopedSearch, TavilySearch};
use satscout_config::SearchConfig;
use satscout_core::schema::Domain;
use satscout_core::tool::{Tool, ToolRegistry};
use std::sync::Arc;

/// The ordered tools a research domain may call.
pub fn tool_set(domain: Domain, config: &SearchConfig) -> ToolRegistry {
    let tavily: Arc<dyn Tool> = Arc::new(TavilySearch::new(config, tavily_description(domain)));

    let mut registry = ToolRegistry::new();
    registry.register(tavily.clone());
    registry.register(Arc::new(SerpApiSearch::new(config)));

    if matches!(domain, Domain::TechnicalSpecs | Domain::LaunchCost) {
        registry.register(Arc::new(DuckDuckGoSearch::new(config)));
    }

    if domain == Domain::LaunchCost {
        registry.register(Arc::new(SiteScopedSearch::space_industry(tavily.clone())));
        registry.register(Arc::new(SiteScopedSearch::financial(tavily.clone())));
        registry.register(Arc::new(SiteScopedSearch::technical_specs(tavily)));
    }

    registry
}

fn tavily_description(domain: Domain) -> &'static str {
    match domain {
        Domain::BasicInfo => "Search the web for basic satellite information",
        Domain::TechnicalSpecs => "Search the web for technical specifications",
        Domain::LaunchCost => "Search the web for launch and cost information",
    }
}
