//! The reasoning trace, an append-only log of agent turns.
//!
//! The trace is replayed into every prompt as the scratchpad, so its
//! rendering follows the same Thought/Action/Observation grammar the LLM
//! is asked to produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of turn the LLM produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// A tool was requested and its observation recorded.
    Action,
    /// The LLM committed to an answer.
    FinalAnswer,
    /// The completion did not follow the grammar.
    Diagnostic,
}

/// One completed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTurn {
    pub kind: TurnKind,
    pub thought: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    /// The completion text as the LLM wrote it, cut at the stop sequence.
    pub raw_completion: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentTurn {
    pub fn action(
        thought: impl Into<String>,
        tool: impl Into<String>,
        input: impl Into<String>,
        observation: impl Into<String>,
        raw_completion: impl Into<String>,
    ) -> Self {
        Self {
            kind: TurnKind::Action,
            thought: thought.into(),
            action: Some(tool.into()),
            action_input: Some(input.into()),
            observation: Some(observation.into()),
            raw_completion: raw_completion.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn final_answer(thought: impl Into<String>, raw_completion: impl Into<String>) -> Self {
        Self {
            kind: TurnKind::FinalAnswer,
            thought: thought.into(),
            action: None,
            action_input: None,
            observation: None,
            raw_completion: raw_completion.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn diagnostic(raw_completion: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            kind: TurnKind::Diagnostic,
            thought: String::new(),
            action: None,
            action_input: None,
            observation: Some(failure.into()),
            raw_completion: raw_completion.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered turns, bounded by the iteration cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    turns: Vec<AgentTurn>,
    capacity: usize,
}

impl Trace {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a turn. Returns false (and drops the turn) once the trace is full.
    pub fn push(&mut self, turn: AgentTurn) -> bool {
        if self.is_full() {
            return false;
        }
        self.turns.push(turn);
        true
    }

    pub fn is_full(&self) -> bool {
        self.turns.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn turns(&self) -> &[AgentTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&AgentTurn> {
        self.turns.last()
    }

    /// Number of turns that invoked a tool.
    pub fn tool_calls(&self) -> usize {
        self.turns.iter().filter(|t| t.kind == TurnKind::Action).count()
    }

    /// Render the scratchpad appended after the question in the next prompt.
    ///
    /// Each replayed turn is its raw completion, then the observation, then a
    /// fresh `Thought:` cue for the LLM to continue from. A completion that
    /// opens with its own `Thought:` follows that cue without repeating it.
    pub fn render_scratchpad(&self) -> String {
        let mut out = String::new();
        for turn in self.turns.iter().filter(|t| t.kind != TurnKind::FinalAnswer) {
            let raw = turn.raw_completion.as_str();
            let raw = if out.is_empty() {
                raw
            } else {
                raw.trim_start()
                    .strip_prefix("Thought:")
                    .map_or(raw, str::trim_start)
            };
            out.push_str(raw);
            out.push_str("\nObservation: ");
            out.push_str(turn.observation.as_deref().unwrap_or_default());
            out.push_str("\nThought: ");
        }
        out
    }
}
