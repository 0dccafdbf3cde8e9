//! `satscout tools|prompt` — Inspect what the agent is given.

use satscout_agent::build_prompt;
use satscout_core::schema::Domain;
use satscout_tools::tool_set;

pub async fn tools(domain: Option<Domain>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let domains = domain.map_or_else(|| Domain::ALL.to_vec(), |d| vec![d]);

    for domain in domains {
        let registry = tool_set(domain, &config.search);
        println!("🔧 {} ({} tools)", domain.label(), registry.len());
        for tool in registry.iter() {
            println!("  {:<28} {}", tool.name(), tool.description());
        }
        println!();
    }

    Ok(())
}

pub async fn prompt(entity: &str, domain: Domain) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let registry = tool_set(domain, &config.search);
    println!("{}", build_prompt(domain, entity, &registry, ""));
    Ok(())
}
