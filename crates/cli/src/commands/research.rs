//! `satscout research` — Run the research pipeline for a satellite.

use futures::future::join_all;
use satscout_agent::{CoercionOutcome, ResearchPipeline};
use satscout_core::event::{DomainEvent, EventBus};
use satscout_core::schema::Domain;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

pub async fn run(
    entity: &str,
    domain: Option<Domain>,
    refresh: bool,
    timeout_secs: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No LLM API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GOOGLE_API_KEY     (Gemini, the default provider)");
        eprintln!("    OPENAI_API_KEY");
        eprintln!("    SATSCOUT_API_KEY   (generic)");
        eprintln!();
        eprintln!("  Or add api_key to {}", satscout_config::AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = satscout_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let store = satscout_store::open_from_config(&config).await?;

    let event_bus = Arc::new(EventBus::default());
    let pipeline = ResearchPipeline::from_config(provider, &config, store, event_bus.clone());

    let requested = domain.map_or_else(|| Domain::ALL.to_vec(), |d| vec![d]);
    let domains = if refresh {
        requested
    } else {
        let pending = pipeline.pending_domains(entity).await?;
        let (todo, skipped): (Vec<Domain>, Vec<Domain>) =
            requested.into_iter().partition(|d| pending.contains(d));
        for d in skipped {
            println!("  ⏭️  {d} already stored for {entity} (use --refresh to re-run)");
        }
        todo
    };

    if domains.is_empty() {
        return Ok(());
    }

    println!("🛰️  Researching {entity}: {}", join(&domains));
    let printer = tokio::spawn(print_progress(event_bus.subscribe()));

    let runs = join_all(domains.iter().map(|&d| pipeline.research(entity, d)));
    let results = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), runs)
            .await
            .map_err(|_| format!("Research timed out after {secs}s"))?,
        None => runs.await,
    };

    drop(pipeline);
    drop(event_bus);
    let _ = printer.await;

    println!();
    let mut failures = 0;
    for (domain, result) in domains.iter().zip(results) {
        match result {
            Ok(report) => {
                let note = match &report.outcome {
                    CoercionOutcome::Parsed => "complete".to_string(),
                    CoercionOutcome::Salvaged { missing } => {
                        format!("{} field(s) not found", missing.len())
                    }
                    CoercionOutcome::Defaulted { .. } => "no usable answer".to_string(),
                };
                println!(
                    "  ✅ {:<16} {} after {} turn(s), {note}",
                    domain.as_str(),
                    report.state,
                    report.iterations()
                );
            }
            Err(e) => {
                failures += 1;
                println!("  ❌ {:<16} {e}", domain.as_str());
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} domain(s) failed").into());
    }
    println!("\n  Run `satscout show \"{entity}\"` to see the results.");
    Ok(())
}

async fn print_progress(mut rx: tokio::sync::broadcast::Receiver<Arc<DomainEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => match event.as_ref() {
                DomainEvent::TurnCompleted {
                    domain,
                    iteration,
                    action,
                    ..
                } => match action {
                    Some(tool) => println!("  [{domain}] turn {iteration}: {tool}"),
                    None => println!("  [{domain}] turn {iteration}"),
                },
                DomainEvent::RecordStored { domain, .. } => {
                    println!("  [{domain}] 💾 stored");
                }
                _ => {}
            },
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn join(domains: &[Domain]) -> String {
    domains
        .iter()
        .map(Domain::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
