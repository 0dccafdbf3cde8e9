//! Prompt builder for the per-domain ReAct instruction prompt.
//!
//! The rendered prompt is deterministic in its inputs: the domain template,
//! the schema, the tool set, the entity name, and the scratchpad.

use satscout_core::schema::{Domain, Schema, define_schema};
use satscout_core::tool::ToolRegistry;
use std::fmt::Write;

/// Domain-specific prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub domain: Domain,
    role: &'static str,
    focus: &'static [&'static str],
    guidelines: &'static [&'static str],
    search_strategy: &'static [&'static str],
    rules: &'static [&'static str],
}

impl PromptTemplate {
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::BasicInfo => BASIC_INFO,
            Domain::TechnicalSpecs => TECHNICAL_SPECS,
            Domain::LaunchCost => LAUNCH_COST,
        }
    }

    /// The research question posed for an entity.
    pub fn question(&self, entity: &str) -> String {
        match self.domain {
            Domain::BasicInfo => format!("Find basic information about {entity}"),
            Domain::TechnicalSpecs => format!("Find technical specifications for {entity}"),
            Domain::LaunchCost => format!("Find launch and cost information for {entity}"),
        }
    }

    pub fn render(
        &self,
        schema: &Schema,
        tools: &ToolRegistry,
        entity: &str,
        scratchpad: &str,
    ) -> String {
        let tool_names = tools.names().join(", ");
        let mut out = String::new();

        let _ = writeln!(out, "{}\n", self.role);

        out.push_str("Available tools:\n");
        for tool in tools.iter() {
            let _ = writeln!(out, "{}: {}", tool.name(), tool.description());
        }
        let _ = writeln!(out, "\nTools names:\n{tool_names}\n");

        out.push_str("IMPORTANT GUIDELINES:\n");
        let _ = writeln!(out, "1. Focus ONLY on {}:", focus_label(self.domain));
        for item in self.focus {
            let _ = writeln!(out, "   - {item}");
        }
        for (i, line) in self.guidelines.iter().enumerate() {
            let _ = writeln!(out, "{}. {line}", i + 2);
        }
        out.push('\n');

        if !self.search_strategy.is_empty() {
            out.push_str("SEARCH STRATEGY - FOLLOW THIS EXACTLY:\n");
            write_numbered(&mut out, self.search_strategy);
            out.push('\n');
        }

        out.push_str("CRITICAL INSTRUCTION - YOU MUST FOLLOW THIS EXACT FORMAT:\n");
        out.push_str("For EVERY response, you must use this exact format:\n\n");
        out.push_str("Thought: (explain what you're going to do next)\n");
        let _ = writeln!(out, "Action: (MUST be one of these exact tool names: {tool_names})");
        out.push_str("Action Input: (the search query or input for the tool)\n");
        out.push_str("Observation: (the result from the tool)\n\n");

        if !self.rules.is_empty() {
            out.push_str("IMPORTANT RULES:\n");
            write_numbered(&mut out, self.rules);
            out.push('\n');
        }

        out.push_str("Repeat this Thought/Action/Action Input/Observation pattern as needed.\n\n");
        out.push_str("When you have all the information, end with:\n");
        out.push_str("Thought: I now have all the required information\n");
        let _ = writeln!(out, "Final Answer: {}\n", schema.json_skeleton());

        out.push_str(
            "DO NOT WAIT FOR COMPLETE INFORMATION. Return whatever data you have gathered, \
             even if some fields are missing.\n",
        );
        out.push_str("Use \"Not found\" for any fields where you couldn't find information.\n\n");

        let _ = writeln!(out, "{}\n", schema.format_instructions());

        let _ = writeln!(out, "Question: {}", self.question(entity));
        out.push_str(scratchpad);
        out
    }
}

/// Render the prompt for one turn of a domain's research loop.
pub fn build_prompt(domain: Domain, entity: &str, tools: &ToolRegistry, scratchpad: &str) -> String {
    PromptTemplate::for_domain(domain).render(&define_schema(domain), tools, entity, scratchpad)
}

fn focus_label(domain: Domain) -> &'static str {
    match domain {
        Domain::BasicInfo => "basic information",
        Domain::TechnicalSpecs => "technical specifications",
        Domain::LaunchCost => "launch and cost information",
    }
}

fn write_numbered(out: &mut String, lines: &[&str]) {
    for (i, line) in lines.iter().enumerate() {
        let _ = writeln!(out, "{}. {line}", i + 1);
    }
}

const BASIC_INFO: PromptTemplate = PromptTemplate {
    domain: Domain::BasicInfo,
    role: "You are a satellite basic information researcher. Your task is to find specific \
           basic information about the given satellite.",
    focus: &["Altitude", "Orbital life", "Orbit classification", "Number of payloads"],
    guidelines: &[
        "Always verify information from multiple sources",
        "Include source URLs for each piece of information",
        "Be precise with numerical values",
    ],
    search_strategy: &[],
    rules: &[],
};

const TECHNICAL_SPECS: PromptTemplate = PromptTemplate {
    domain: Domain::TechnicalSpecs,
    role: "You are a satellite technical specifications researcher. Your task is to find \
           detailed technical information about the given satellite.",
    focus: &[
        "Satellite type",
        "Application details",
        "Sensor specifications",
        "Technological breakthroughs",
    ],
    guidelines: &[
        "Look for detailed technical documentation",
        "Include source URLs for each piece of information",
        "Pay special attention to sensor specifications and technological innovations",
    ],
    search_strategy: &[],
    rules: &[
        "You MUST use one of the available tools listed above",
        "NEVER use \"None\" or any other tool name not listed",
        "After getting results, analyze them and decide if you need more information",
        "If you need more information, use another tool",
        "If you have enough information, proceed to the Final Answer",
        "NEVER output JSON directly without the proper Thought/Action format",
        "ALWAYS use the Final Answer format when providing the complete information",
        "NEVER make conclusions in the Thought section without using a tool",
        "ALWAYS use a tool to verify information before concluding",
        "If information is not found, use multiple tools to confirm before concluding",
    ],
};

const LAUNCH_COST: PromptTemplate = PromptTemplate {
    domain: Domain::LaunchCost,
    role: "You are a satellite launch and cost information researcher. Your task is to find \
           detailed information about the launch and costs of the given satellite.",
    focus: &[
        "Launch mass details",
        "Launch success/failure",
        "Vehicle reusability",
        "All cost components",
    ],
    guidelines: &[
        "Look for official documentation and news sources",
        "Include source URLs for each piece of information",
        "Pay special attention to cost breakdowns and launch specifications",
    ],
    search_strategy: &[
        "Search for launch mass details",
        "Search financial/cost information from multiple angles",
        "Search technical specifications and mass data",
        "Verify information across multiple sources",
        "If data is missing, try alternative search terms and sources",
    ],
    rules: &[],
};
