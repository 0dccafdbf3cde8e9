//! ReAct completion grammar.
//!
//! A completion is one of:
//!
//! ```text
//! Thought: <reasoning>
//! Action: <tool name>
//! Action Input: <query>
//! ```
//!
//! or
//!
//! ```text
//! Thought: <reasoning>
//! Final Answer: <answer>
//! ```
//!
//! Anything else is unparseable. The parser is total: it never fails, it
//! classifies.

use regex_lite::Regex;
use std::sync::LazyLock;

/// The stop sequence sent with every completion request.
pub const OBSERVATION_STOP: &str = "\nObservation:";

pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

pub const MISSING_ACTION: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
pub const MISSING_ACTION_INPUT: &str = "Invalid Format: Missing 'Action Input:' after 'Action:'";
pub const AMBIGUOUS_TURN: &str = "Invalid or incomplete response";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .unwrap()
});
static ACTION_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").unwrap());

/// One classified LLM completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTurn {
    Action {
        thought: String,
        tool: String,
        input: String,
    },
    FinalAnswer {
        thought: String,
        answer: String,
    },
    Unparseable {
        raw: String,
        /// Format reminder fed back to the LLM as the observation.
        failure: String,
    },
}

/// Cut a completion at the observation stop sequence, for backends that
/// ignore stop sequences and hallucinate their own observation.
pub fn truncate_at_stop(text: &str) -> &str {
    match text.find(OBSERVATION_STOP) {
        Some(idx) => &text[..idx],
        None => text,
    }
}

/// Classify a completion.
pub fn parse(text: &str) -> ParsedTurn {
    let includes_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return ParsedTurn::Unparseable {
                raw: text.to_string(),
                failure: AMBIGUOUS_TURN.into(),
            };
        }
        let whole = caps.get(0).map_or(0, |m| m.start());
        let tool = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let input = caps.get(2).map_or("", |m| m.as_str());
        let input = truncate_at_stop(input).trim().trim_matches('"').to_string();
        return ParsedTurn::Action {
            thought: thought_before(&text[..whole]),
            tool,
            input,
        };
    }

    if let Some(idx) = text.rfind(FINAL_ANSWER_MARKER) {
        let answer = text[idx + FINAL_ANSWER_MARKER.len()..].trim().to_string();
        let first = text.find(FINAL_ANSWER_MARKER).unwrap_or(idx);
        return ParsedTurn::FinalAnswer {
            thought: thought_before(&text[..first]),
            answer,
        };
    }

    let failure = if !ACTION_ONLY_RE.is_match(text) {
        MISSING_ACTION
    } else {
        MISSING_ACTION_INPUT
    };
    ParsedTurn::Unparseable {
        raw: text.to_string(),
        failure: failure.into(),
    }
}

fn thought_before(prefix: &str) -> String {
    let prefix = prefix.trim();
    prefix
        .strip_prefix("Thought:")
        .unwrap_or(prefix)
        .trim()
        .to_string()
}
