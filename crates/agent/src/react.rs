//! The ReAct reasoning loop.
//!
//! Each turn renders the domain prompt with the trace so far, asks the LLM for
//! one completion, and classifies it. Actions run a tool and feed its output
//! back as an observation; a final answer ends the loop. When the iteration
//! cap is reached without an answer the loop is forced to stop and the last
//! completion becomes the candidate answer.

use crate::grammar::{self, OBSERVATION_STOP, ParsedTurn};
use crate::profile::DomainProfile;
use crate::trace::{AgentTurn, Trace};
use chrono::Utc;
use satscout_config::AppConfig;
use satscout_core::error::ProviderError;
use satscout_core::event::{DomainEvent, EventBus};
use satscout_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default cap on completed turns per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Where the loop ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    FinalAnswer,
    ForcedStop,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::FinalAnswer => "final_answer",
            Self::ForcedStop => "forced_stop",
        }
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one research run.
#[derive(Debug, Clone)]
pub struct ReactOutcome {
    pub state: LoopState,
    /// The final answer text, or the last raw completion after a forced stop.
    pub candidate_answer: String,
    pub trace: Trace,
}

impl ReactOutcome {
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }
}

/// Drives the LLM through Thought/Action/Observation turns.
pub struct ReactExecutor {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per completion
    max_tokens: Option<u32>,

    /// Cap on completed turns
    max_iterations: usize,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,
}

impl ReactExecutor {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            event_bus,
        }
    }

    /// An executor using the model settings and iteration cap from config.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        config: &AppConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self::new(provider, config.default_model.clone(), event_bus)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_max_iterations(config.agent.max_iterations)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the cap on completed turns. Zero is raised to one.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run the loop for one entity under one domain profile.
    ///
    /// Only an LLM failure is an error; everything else the model does is
    /// folded into the trace.
    pub async fn run(
        &self,
        profile: &DomainProfile,
        entity: &str,
    ) -> Result<ReactOutcome, ProviderError> {
        let domain = profile.domain;
        let mut trace = Trace::new(self.max_iterations);

        info!(
            entity = %entity,
            domain = %domain,
            provider = %self.provider.name(),
            max_iterations = self.max_iterations,
            "Starting research loop"
        );

        while !trace.is_full() {
            let iteration = trace.len() + 1;
            let prompt = profile.build_prompt(entity, &trace.render_scratchpad());

            let mut request = ProviderRequest::prompt(&self.model, prompt);
            request.temperature = self.temperature;
            request.max_tokens = self.max_tokens;
            request.stop = vec![OBSERVATION_STOP.to_string()];

            let response = self.provider.complete(request).await?;
            let completion = grammar::truncate_at_stop(response.text()).to_string();
            debug!(iteration, chars = completion.len(), "Completion received");

            let (turn, action) = match grammar::parse(&completion) {
                ParsedTurn::FinalAnswer { thought, answer } => {
                    trace.push(AgentTurn::final_answer(thought, completion));
                    self.publish_turn(entity, profile, iteration, None);
                    info!(entity = %entity, domain = %domain, iterations = iteration, "Final answer reached");
                    return Ok(ReactOutcome {
                        state: LoopState::FinalAnswer,
                        candidate_answer: answer,
                        trace,
                    });
                }
                ParsedTurn::Action { thought, tool, input } => {
                    debug!(tool = %tool, input = %input, "Executing tool");
                    let start = Instant::now();
                    let result = profile.tools.observe(&tool, &input).await;
                    let duration_ms = start.elapsed().as_millis() as u64;

                    if !result.success {
                        warn!(tool = %tool, "Tool call failed: {}", result.output);
                    }
                    self.event_bus.publish(DomainEvent::ToolExecuted {
                        tool_name: tool.clone(),
                        success: result.success,
                        duration_ms,
                        timestamp: Utc::now(),
                    });

                    let action = Some(tool.clone());
                    (
                        AgentTurn::action(thought, tool, input, result.output, completion),
                        action,
                    )
                }
                ParsedTurn::Unparseable { raw, failure } => {
                    warn!(iteration, "Completion did not follow the ReAct format: {failure}");
                    (AgentTurn::diagnostic(raw, failure), None)
                }
            };

            trace.push(turn);
            self.publish_turn(entity, profile, iteration, action);
        }

        let candidate_answer = trace
            .last()
            .map(|t| t.raw_completion.clone())
            .unwrap_or_default();

        warn!(
            entity = %entity,
            domain = %domain,
            iterations = trace.len(),
            "Iteration cap reached without a final answer"
        );

        Ok(ReactOutcome {
            state: LoopState::ForcedStop,
            candidate_answer,
            trace,
        })
    }

    fn publish_turn(
        &self,
        entity: &str,
        profile: &DomainProfile,
        iteration: usize,
        action: Option<String>,
    ) {
        self.event_bus.publish(DomainEvent::TurnCompleted {
            entity: entity.to_string(),
            domain: profile.domain,
            iteration,
            action,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{AMBIGUOUS_TURN, MISSING_ACTION};
    use crate::test_helpers::{
        FailingTool, ScriptedProvider, StaticTool, UnreachableProvider, offline_tools,
    };
    use crate::trace::TurnKind;
    use satscout_core::schema::Domain;
    use satscout_core::tool::ToolRegistry;

    fn executor(provider: Arc<dyn Provider>) -> ReactExecutor {
        ReactExecutor::new(provider, "mock-model", Arc::new(EventBus::default()))
    }

    fn basic_profile() -> DomainProfile {
        DomainProfile::new(Domain::BasicInfo, offline_tools())
    }

    #[tokio::test]
    async fn immediate_final_answer() {
        let provider = Arc::new(ScriptedProvider::new([
            "Thought: I now know the final answer\nFinal Answer: {\"altitude\": \"820\"}",
        ]));
        let outcome = executor(provider.clone())
            .run(&basic_profile(), "INSAT-3D")
            .await
            .unwrap();

        assert_eq!(outcome.state, LoopState::FinalAnswer);
        assert_eq!(outcome.candidate_answer, "{\"altitude\": \"820\"}");
        assert_eq!(outcome.iterations(), 1);
        assert_eq!(outcome.trace.turns()[0].kind, TurnKind::FinalAnswer);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn requests_carry_stop_sequence_and_settings() {
        let provider = Arc::new(ScriptedProvider::new(["Final Answer: {}"]));
        executor(provider.clone())
            .with_temperature(0.2)
            .with_max_tokens(512)
            .run(&basic_profile(), "INSAT-3D")
            .await
            .unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.stop, vec!["\nObservation:".to_string()]);
        assert_eq!(request.model, "mock-model");
        assert_eq!(request.max_tokens, Some(512));
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert!(request.messages[0]
            .content
            .ends_with("Question: Find basic information about INSAT-3D\n"));
    }

    #[tokio::test]
    async fn tool_observation_feeds_next_prompt() {
        let provider = Arc::new(ScriptedProvider::new([
            "Thought: search first\nAction: tavily_search\nAction Input: INSAT-3D altitude",
            "Thought: I now have all the required information\nFinal Answer: {\"altitude\": \"820\"}",
        ]));
        let outcome = executor(provider.clone())
            .run(&basic_profile(), "INSAT-3D")
            .await
            .unwrap();

        assert_eq!(outcome.state, LoopState::FinalAnswer);
        assert_eq!(outcome.iterations(), 2);
        assert_eq!(outcome.trace.tool_calls(), 1);

        let second_prompt = &provider.requests()[1].messages[0].content;
        assert!(second_prompt.ends_with(
            "Action Input: INSAT-3D altitude\nObservation: URL: https://www.isro.gov.in/INSAT_3D.html\
             \nContent: INSAT-3D operates at 820 km\nThought: "
        ));
    }

    #[tokio::test]
    async fn hallucinated_observation_is_discarded() {
        let provider = Arc::new(ScriptedProvider::new([
            "Action: tavily_search\nAction Input: q\nObservation: made up\nFinal Answer: {}",
            "Final Answer: {}",
        ]));
        let outcome = executor(provider.clone())
            .run(&basic_profile(), "INSAT-3D")
            .await
            .unwrap();

        let first = &outcome.trace.turns()[0];
        assert_eq!(first.kind, TurnKind::Action);
        assert!(!first.raw_completion.contains("made up"));
    }

    #[tokio::test]
    async fn unknown_tool_becomes_observation_and_loop_continues() {
        let provider = Arc::new(ScriptedProvider::new([
            "Thought: search\nAction: None\nAction Input: INSAT-3D",
            "Final Answer: {}",
        ]));
        let outcome = executor(provider).run(&basic_profile(), "INSAT-3D").await.unwrap();

        let first = &outcome.trace.turns()[0];
        assert_eq!(
            first.observation.as_deref(),
            Some("None is not a valid tool, try one of [tavily_search, serpapi_search].")
        );
        assert_eq!(outcome.state, LoopState::FinalAnswer);
    }

    #[tokio::test]
    async fn failing_tool_is_an_observation() {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(FailingTool("tavily_search")));
        let profile = DomainProfile::new(Domain::BasicInfo, tools);

        let provider = Arc::new(ScriptedProvider::new([
            "Action: tavily_search\nAction Input: INSAT-3D",
            "Final Answer: {}",
        ]));
        let outcome = executor(provider).run(&profile, "INSAT-3D").await.unwrap();
        let observation = outcome.trace.turns()[0].observation.clone().unwrap();
        assert!(observation.starts_with("Error:"));
        assert!(observation.contains("503"));
    }

    #[tokio::test]
    async fn tool_receives_action_input() {
        let tool = Arc::new(StaticTool::new("tavily_search", "ok"));
        let mut tools = ToolRegistry::new();
        tools.register(tool.clone());
        let profile = DomainProfile::new(Domain::TechnicalSpecs, tools);

        let provider = Arc::new(ScriptedProvider::new([
            "Action: tavily_search\nAction Input: \"Cartosat-3 sensor resolution\"",
            "Final Answer: {}",
        ]));
        executor(provider).run(&profile, "Cartosat-3").await.unwrap();
        assert_eq!(
            tool.queries.lock().unwrap().as_slice(),
            ["Cartosat-3 sensor resolution"]
        );
    }

    #[tokio::test]
    async fn forced_stop_after_cap() {
        let provider = Arc::new(ScriptedProvider::repeating("I am thinking about it", 8));
        let outcome = executor(provider.clone())
            .run(&basic_profile(), "INSAT-3D")
            .await
            .unwrap();

        assert_eq!(outcome.state, LoopState::ForcedStop);
        assert_eq!(outcome.iterations(), 8);
        assert_eq!(provider.call_count(), 8);
        assert_eq!(outcome.candidate_answer, "I am thinking about it");
        assert!(outcome
            .trace
            .turns()
            .iter()
            .all(|t| t.kind == TurnKind::Diagnostic && t.observation.as_deref() == Some(MISSING_ACTION)));
    }

    #[tokio::test]
    async fn forced_stop_respects_configured_cap() {
        let provider = Arc::new(ScriptedProvider::repeating(
            "Action: tavily_search\nAction Input: again",
            3,
        ));
        let outcome = executor(provider.clone())
            .with_max_iterations(3)
            .run(&basic_profile(), "INSAT-3D")
            .await
            .unwrap();

        assert_eq!(outcome.state, LoopState::ForcedStop);
        assert_eq!(outcome.iterations(), 3);
        assert_eq!(outcome.candidate_answer, "Action: tavily_search\nAction Input: again");
    }

    #[tokio::test]
    async fn action_with_final_answer_is_diagnostic() {
        let provider = Arc::new(ScriptedProvider::new([
            "Action: tavily_search\nAction Input: q\nFinal Answer: {\"altitude\": \"1\"}",
            "Final Answer: {\"altitude\": \"820\"}",
        ]));
        let outcome = executor(provider).run(&basic_profile(), "INSAT-3D").await.unwrap();
        assert_eq!(outcome.trace.turns()[0].observation.as_deref(), Some(AMBIGUOUS_TURN));
        assert_eq!(outcome.candidate_answer, "{\"altitude\": \"820\"}");
    }

    #[tokio::test]
    async fn provider_failure_is_an_error() {
        let err = executor(Arc::new(UnreachableProvider))
            .run(&basic_profile(), "INSAT-3D")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test]
    async fn publishes_turn_and_tool_events() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let provider = Arc::new(ScriptedProvider::new([
            "Action: serpapi_search\nAction Input: INSAT-3D payloads",
            "Final Answer: {}",
        ]));
        ReactExecutor::new(provider, "mock-model", bus.clone())
            .run(&basic_profile(), "INSAT-3D")
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(&*first, DomainEvent::ToolExecuted { tool_name, success: true, .. } if tool_name == "serpapi_search"));
        let second = rx.recv().await.unwrap();
        assert!(matches!(&*second, DomainEvent::TurnCompleted { iteration: 1, action: Some(a), .. } if a == "serpapi_search"));
        let third = rx.recv().await.unwrap();
        assert!(matches!(&*third, DomainEvent::TurnCompleted { iteration: 2, action: None, .. }));
    }

    #[test]
    fn zero_cap_is_raised() {
        let exec = executor(Arc::new(UnreachableProvider)).with_max_iterations(0);
        assert_eq!(exec.max_iterations(), 1);
    }
}
