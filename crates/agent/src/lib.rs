//! The research loop — the heart of SatScout.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Build the prompt** for the domain (role, tools, schema, question)
//!    with the trace so far replayed as the scratchpad
//! 2. **Send to LLM** via the configured provider
//! 3. **If an action**: run the named search tool, record the observation,
//!    loop back to step 1
//! 4. **If a final answer**: coerce it into the domain schema and store it
//!
//! The loop also ends when the iteration cap is reached; the last
//! completion is then coerced instead.

pub mod coercion;
pub mod grammar;
pub mod pipeline;
pub mod profile;
pub mod prompt;
pub mod react;
pub mod trace;

#[cfg(test)]
mod test_helpers;

pub use coercion::{Coercion, CoercionOutcome, coerce};
pub use grammar::ParsedTurn;
pub use pipeline::{ResearchPipeline, ResearchReport};
pub use profile::DomainProfile;
pub use prompt::{PromptTemplate, build_prompt};
pub use react::{DEFAULT_MAX_ITERATIONS, LoopState, ReactExecutor, ReactOutcome};
pub use trace::{AgentTurn, Trace, TurnKind};
