//! The research pipeline: loop, coerce, store.
//!
//! One pipeline serves every domain; what differs per domain lives in its
//! [`DomainProfile`].

use crate::coercion::{self, CoercionOutcome};
use crate::profile::DomainProfile;
use crate::react::{LoopState, ReactExecutor};
use crate::trace::Trace;
use chrono::Utc;
use satscout_config::AppConfig;
use satscout_core::error::{Error, Result};
use satscout_core::event::{DomainEvent, EventBus};
use satscout_core::provider::Provider;
use satscout_core::record::{ExtractionRecord, StoredEntry};
use satscout_core::schema::Domain;
use satscout_core::store::ResultStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything one research run produced.
#[derive(Debug, Clone)]
pub struct ResearchReport {
    pub entity: String,
    pub domain: Domain,
    pub state: LoopState,
    pub outcome: CoercionOutcome,
    pub trace: Trace,
    pub entry: StoredEntry,
}

impl ResearchReport {
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }

    pub fn record(&self) -> &ExtractionRecord {
        &self.entry.record
    }
}

pub struct ResearchPipeline {
    profiles: BTreeMap<Domain, DomainProfile>,
    executor: ReactExecutor,
    store: Arc<dyn ResultStore>,
    event_bus: Arc<EventBus>,
}

impl ResearchPipeline {
    /// A pipeline with no domain profiles; add them with [`Self::with_profile`].
    pub fn new(
        executor: ReactExecutor,
        store: Arc<dyn ResultStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            profiles: BTreeMap::new(),
            executor,
            store,
            event_bus,
        }
    }

    /// A pipeline for every domain, with live search tools and LLM settings
    /// taken from `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        config: &AppConfig,
        store: Arc<dyn ResultStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let executor = ReactExecutor::from_config(provider, config, event_bus.clone());
        Domain::ALL.iter().fold(
            Self::new(executor, store, event_bus),
            |pipeline, &domain| {
                pipeline.with_profile(DomainProfile::from_config(domain, &config.search))
            },
        )
    }

    /// Register or replace the profile for its domain.
    pub fn with_profile(mut self, profile: DomainProfile) -> Self {
        self.profiles.insert(profile.domain, profile);
        self
    }

    pub fn profile(&self, domain: Domain) -> Option<&DomainProfile> {
        self.profiles.get(&domain)
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Research one (entity, domain) pair and store the coerced record.
    ///
    /// Returns `None` only when the LLM is unreachable or the store write
    /// fails. A run that never produced a usable answer still yields an
    /// all-sentinel record.
    pub async fn process(&self, entity: &str, domain: Domain) -> Option<ExtractionRecord> {
        match self.research(entity, domain).await {
            Ok(report) => Some(report.entry.record),
            Err(e) => {
                error!(entity = %entity, domain = %domain, "Research failed: {e}");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: format!("research {entity} {domain}"),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                None
            }
        }
    }

    /// Research one (entity, domain) pair, returning the full report.
    pub async fn research(&self, entity: &str, domain: Domain) -> Result<ResearchReport> {
        let entity = entity.trim();
        if entity.is_empty() {
            return Err(Error::InvalidInput("entity name must not be empty".into()));
        }
        let profile = self.profiles.get(&domain).ok_or_else(|| Error::Config {
            message: format!("no profile registered for domain {domain}"),
        })?;

        let run = self.executor.run(profile, entity).await?;
        let coerced = coercion::coerce(&run.candidate_answer, &profile.schema);
        if let Some(note) = coerced.diagnostic() {
            warn!(entity = %entity, domain = %domain, state = %run.state, "{note}");
        }

        self.event_bus.publish(DomainEvent::ExtractionCompleted {
            entity: entity.to_string(),
            domain,
            terminal_state: run.state.to_string(),
            iterations: run.trace.len(),
            defaulted: coerced.is_defaulted(),
            timestamp: Utc::now(),
        });

        let entry = self.store.put(entity, domain, coerced.record).await?;
        self.event_bus.publish(DomainEvent::RecordStored {
            entity: entity.to_string(),
            domain,
            timestamp: entry.last_updated,
        });

        info!(
            entity = %entity,
            domain = %domain,
            state = %run.state,
            iterations = run.trace.len(),
            tool_calls = run.trace.tool_calls(),
            "Record stored"
        );

        Ok(ResearchReport {
            entity: entity.to_string(),
            domain,
            state: run.state,
            outcome: coerced.outcome,
            trace: run.trace,
            entry,
        })
    }

    /// Domains still missing from the store for an entity, in display order.
    pub async fn pending_domains(&self, entity: &str) -> Result<Vec<Domain>> {
        let stored = self.store.get_all(entity.trim()).await?.unwrap_or_default();
        Ok(self
            .profiles
            .keys()
            .copied()
            .filter(|d| !stored.contains_key(d))
            .collect())
    }

    /// Remove an entity from the store.
    pub async fn delete(&self, entity: &str) -> Result<bool> {
        let removed = self.store.delete(entity).await?;
        if removed {
            self.event_bus.publish(DomainEvent::RecordDeleted {
                entity: entity.to_string(),
                timestamp: Utc::now(),
            });
        }
        Ok(removed)
    }
}
