//! End-to-end integration tests for the SatScout research pipeline.
//!
//! These tests exercise the full path from entity name to stored record:
//! prompt rendering, the ReAct loop, tool execution, output coercion, and
//! persistence.

use std::sync::Arc;

use satscout_agent::{DomainProfile, LoopState, ReactExecutor, ResearchPipeline, TurnKind};
use satscout_core::error::{ProviderError, ToolError};
use satscout_core::event::EventBus;
use satscout_core::message::Message;
use satscout_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use satscout_core::schema::{Domain, NOT_FOUND, define_schema};
use satscout_core::store::ResultStore;
use satscout_core::tool::{Tool, ToolRegistry};
use satscout_store::{FileStore, InMemoryStore};
use serde_json::json;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted completions in sequence.
struct ScriptedProvider {
    completions: Vec<String>,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(completions: &[&str]) -> Self {
        Self {
            completions: completions.iter().map(|s| s.to_string()).collect(),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompt(&self, idx: usize) -> String {
        self.prompts.lock().unwrap()[idx].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let count = prompts.len();
        if count >= self.completions.len() {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                count,
                self.completions.len()
            );
        }
        prompts.push(request.messages[0].content.clone());
        Ok(text_response(&self.completions[count]))
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
    }
}

// ── Mock Tools ───────────────────────────────────────────────────────────

struct CannedSearch {
    name: &'static str,
    result: &'static str,
}

#[async_trait::async_trait]
impl Tool for CannedSearch {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Canned web search"
    }

    async fn invoke(&self, _query: &str) -> Result<String, ToolError> {
        Ok(self.result.to_string())
    }
}

fn tools() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(CannedSearch {
        name: "tavily_search",
        result: "URL: https://www.isro.gov.in/INSAT_3D.html\nContent: INSAT-3D, altitude 820 km (sic), mission life 10 years",
    }));
    registry.register(Arc::new(CannedSearch {
        name: "serpapi_search",
        result: "INSAT-3D was launched on 26 July 2013 aboard Ariane 5",
    }));
    registry
}

fn pipeline(provider: Arc<dyn Provider>, store: Arc<dyn ResultStore>) -> ResearchPipeline {
    let bus = Arc::new(EventBus::default());
    let executor = ReactExecutor::new(provider, "mock", bus.clone());
    Domain::ALL
        .iter()
        .fold(ResearchPipeline::new(executor, store, bus), |p, &d| {
            p.with_profile(DomainProfile::new(d, tools()))
        })
}

// ── E2E: Research scenarios ──────────────────────────────────────────────

#[tokio::test]
async fn e2e_insat3d_immediate_final_answer() {
    let provider = Arc::new(ScriptedProvider::new(&[concat!(
        "Thought: I now have all the required information\n",
        "Final Answer: ```json\n",
        "{\"altitude\": \"820\", \"altitude_source\": \"https://www.isro.gov.in/INSAT_3D.html\"}\n",
        "```"
    )]));
    let store = Arc::new(InMemoryStore::new());
    let p = pipeline(provider.clone(), store.clone());

    let report = p.research("INSAT-3D", Domain::BasicInfo).await.unwrap();

    assert_eq!(report.state, LoopState::FinalAnswer);
    assert_eq!(report.trace.len(), 1);
    assert_eq!(report.trace.turns()[0].kind, TurnKind::FinalAnswer);
    assert_eq!(provider.calls(), 1);

    let record = report.record();
    assert!(record.is_complete_for(&define_schema(Domain::BasicInfo)));
    assert_eq!(record.get("altitude"), Some(&json!("820")));
    assert_eq!(record.get("orbital_life_years"), Some(&json!(NOT_FOUND)));

    let stored = store.get("INSAT-3D", Domain::BasicInfo).await.unwrap().unwrap();
    assert_eq!(stored.record.get("altitude"), Some(&json!("820")));
}

#[tokio::test]
async fn e2e_malformed_text_for_every_turn() {
    let garbage = ["The satellite is probably in orbit somewhere."; 8];
    let provider = Arc::new(ScriptedProvider::new(&garbage));
    let store = Arc::new(InMemoryStore::new());
    let p = pipeline(provider.clone(), store.clone());

    let record = p.process("INSAT-3D", Domain::LaunchCost).await;

    let record = record.expect("forced stop still yields a record");
    assert_eq!(provider.calls(), 8);
    assert!(record.is_complete_for(&define_schema(Domain::LaunchCost)));
    assert!(record.is_all_sentinel());
    assert_eq!(
        record.get("mission_cost").unwrap()["overall_cost"],
        json!(NOT_FOUND)
    );

    // Every later prompt replays the format reminder.
    assert!(provider
        .prompt(7)
        .contains("Observation: Invalid Format: Missing 'Action:' after 'Thought:'"));
}

#[tokio::test]
async fn e2e_tool_then_answer() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "Thought: I should search for the launch details\nAction: serpapi_search\nAction Input: INSAT-3D launch vehicle",
        "Thought: I now have all the required information\nFinal Answer: {\"launch_vehicle\": \"Ariane 5\", \"launch_date\": \"26 July 2013\", \"launch_mass\": {\"actual_mass\": \"2060 kg\"}}",
    ]));
    let store = Arc::new(InMemoryStore::new());
    let p = pipeline(provider.clone(), store);

    let report = p.research("INSAT-3D", Domain::LaunchCost).await.unwrap();

    assert_eq!(report.state, LoopState::FinalAnswer);
    assert_eq!(report.trace.tool_calls(), 1);
    assert!(provider
        .prompt(1)
        .contains("Observation: INSAT-3D was launched on 26 July 2013 aboard Ariane 5\nThought: "));
    assert_eq!(report.record().get("launch_vehicle"), Some(&json!("Ariane 5")));
    assert_eq!(
        report.record().get("launch_mass"),
        Some(&json!({"max_leo": NOT_FOUND, "actual_mass": "2060 kg"}))
    );
}

#[tokio::test]
async fn e2e_unknown_tool_observation_and_continue() {
    let provider = Arc::new(ScriptedProvider::new(&[
        "Thought: search\nAction: google_search\nAction Input: INSAT-3D payloads",
        "Thought: use a listed tool\nAction: tavily_search\nAction Input: INSAT-3D payloads",
        "Final Answer: {\"number_of_payloads\": \"4\"}",
    ]));
    let p = pipeline(provider.clone(), Arc::new(InMemoryStore::new()));

    let report = p.research("INSAT-3D", Domain::BasicInfo).await.unwrap();

    assert_eq!(report.trace.len(), 3);
    assert_eq!(
        report.trace.turns()[0].observation.as_deref(),
        Some("google_search is not a valid tool, try one of [tavily_search, serpapi_search].")
    );
    assert_eq!(report.trace.tool_calls(), 2);
    assert_eq!(report.record().get("number_of_payloads"), Some(&json!("4")));
}

#[tokio::test]
async fn e2e_domains_run_concurrently_into_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("satellite_data.json");
    let store: Arc<dyn ResultStore> = Arc::new(FileStore::open(&path).await.unwrap());

    let answers: Vec<_> = Domain::ALL
        .iter()
        .map(|_| Arc::new(ScriptedProvider::new(&["Final Answer: {}"])))
        .collect();

    let pipelines: Vec<_> = answers
        .iter()
        .map(|a| pipeline(a.clone(), store.clone()))
        .collect();
    let runs = Domain::ALL
        .iter()
        .zip(&pipelines)
        .map(|(&d, p)| p.process("GSAT-11", d));
    let results = futures::future::join_all(runs).await;
    assert!(results.iter().all(Option::is_some));

    let reopened = FileStore::open(&path).await.unwrap();
    let all = reopened.get_all("GSAT-11").await.unwrap().unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn e2e_delete_removes_every_domain() {
    let provider = Arc::new(ScriptedProvider::new(&["Final Answer: {}", "Final Answer: {}"]));
    let store = Arc::new(InMemoryStore::new());
    let p = pipeline(provider, store.clone());

    p.process("Cartosat-3", Domain::BasicInfo).await.unwrap();
    p.process("Cartosat-3", Domain::TechnicalSpecs).await.unwrap();
    assert_eq!(store.list_entities().await.unwrap(), vec!["Cartosat-3"]);

    assert!(p.delete("Cartosat-3").await.unwrap());
    assert!(store.get("Cartosat-3", Domain::BasicInfo).await.unwrap().is_none());
    assert!(store.get_all("Cartosat-3").await.unwrap().is_none());
    assert!(store.list_entities().await.unwrap().is_empty());
}

#[tokio::test]
async fn e2e_snapshot_layout() {
    let provider = Arc::new(ScriptedProvider::new(&["Final Answer: {\"altitude\": \"505\"}"]));
    let store = Arc::new(InMemoryStore::new());
    let p = pipeline(provider, store.clone());
    p.process("RISAT-2B", Domain::BasicInfo).await.unwrap();

    let snapshot = store.snapshot().await.unwrap();
    let slot = &snapshot["RISAT-2B"]["basic_info"];
    assert_eq!(slot["data"]["altitude"], json!("505"));
    assert!(chrono::DateTime::parse_from_rfc3339(slot["last_updated"].as_str().unwrap()).is_ok());
}
