//! Site-scoped search: a query rewrite in front of another search tool.
//!
//! The rewritten query is `"{query}[ {extra terms}] (site:a OR site:b ...)"`.

use async_trait::async_trait;
use satscout_core::error::ToolError;
use satscout_core::tool::Tool;
use std::sync::Arc;

pub struct SiteScopedSearch {
    name: &'static str,
    description: &'static str,
    extra_terms: Option<&'static str>,
    sites: &'static [&'static str],
    inner: Arc<dyn Tool>,
}

impl SiteScopedSearch {
    pub fn new(
        name: &'static str,
        description: &'static str,
        extra_terms: Option<&'static str>,
        sites: &'static [&'static str],
        inner: Arc<dyn Tool>,
    ) -> Self {
        Self {
            name,
            description,
            extra_terms,
            sites,
            inner,
        }
    }

    /// Space agencies and trade press.
    pub fn space_industry(inner: Arc<dyn Tool>) -> Self {
        Self::new(
            "space_industry_search",
            "Search specialized space industry websites for authoritative satellite information.",
            None,
            &[
                "spacenews.com",
                "spaceflightnow.com",
                "spacex.com",
                "nasa.gov",
                "esa.int",
                "spacepolicyonline.com",
                "satellitetoday.com",
            ],
            inner,
        )
    }

    /// Financial news and filings.
    pub fn financial(inner: Arc<dyn Tool>) -> Self {
        Self::new(
            "financial_search",
            "Search financial news and SEC filings for satellite mission costs and budgets.",
            Some("cost budget funding"),
            &[
                "reuters.com",
                "bloomberg.com",
                "cnbc.com",
                "sec.gov",
                "investor.com",
            ],
            inner,
        )
    }

    /// Technical reference databases.
    pub fn technical_specs(inner: Arc<dyn Tool>) -> Self {
        Self::new(
            "technical_specs_search",
            "Search technical databases and specifications for satellite mass and launch vehicle details.",
            Some("specifications mass launch vehicle"),
            &[
                "wikipedia.org",
                "gunterspace.com",
                "skyrocket.de",
                "rocketrundown.com",
            ],
            inner,
        )
    }

    pub fn rewrite(&self, query: &str) -> String {
        let sites = self
            .sites
            .iter()
            .map(|s| format!("site:{s}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        match self.extra_terms {
            Some(extra) => format!("{query} {extra} ({sites})"),
            None => format!("{query} ({sites})"),
        }
    }
}

#[async_trait]
impl Tool for SiteScopedSearch {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        self.inner.invoke(&self.rewrite(query)).await
    }
}
