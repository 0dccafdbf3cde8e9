//! `satscout show|list|delete|table|export` — Result store commands.

use satscout_core::record::StoredEntry;
use satscout_core::schema::Domain;
use satscout_core::store::ResultStore;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

async fn open_store() -> Result<Arc<dyn ResultStore>, Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    Ok(satscout_store::open_from_config(&config).await?)
}

pub async fn show(
    entity: &str,
    domain: Option<Domain>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;

    let Some(entries) = store.get_all(entity).await? else {
        println!("No data stored for {entity}. Run `satscout research \"{entity}\"` first.");
        return Ok(());
    };

    let entries: Vec<&StoredEntry> = entries
        .values()
        .filter(|e| domain.is_none_or(|d| e.domain == d))
        .collect();

    if entries.is_empty() {
        println!("No {} data stored for {entity}.", domain.map_or("", |d| d.as_str()));
        return Ok(());
    }

    if json {
        let out: serde_json::Map<String, Value> = entries
            .iter()
            .map(|e| (e.domain.as_str().to_string(), serde_json::to_value(&e.record).unwrap_or_default()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("🛰️  {entity}");
    for entry in entries {
        println!();
        println!("  {}  (updated {})", entry.domain.label(), entry.last_updated.format("%Y-%m-%d %H:%M UTC"));
        println!("  {}", "─".repeat(48));
        for (key, value) in entry.record.iter() {
            print_field(key, value, 2);
        }
    }

    Ok(())
}

fn print_field(key: &str, value: &Value, indent: usize) {
    let pad = " ".repeat(indent);
    match value {
        Value::Object(children) => {
            println!("{pad}{key}:");
            for (k, v) in children {
                print_field(k, v, indent + 2);
            }
        }
        Value::String(s) => println!("{pad}{key}: {s}"),
        other => println!("{pad}{key}: {other}"),
    }
}

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;
    let entities = store.list_entities().await?;

    if entities.is_empty() {
        println!("No satellites researched yet.");
        return Ok(());
    }

    println!("🛰️  Researched satellites ({})", entities.len());
    for entity in entities {
        let domains = store
            .get_all(&entity)
            .await?
            .map(|m| m.keys().map(|d| d.as_str()).collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        println!("  {entity:<24} {domains}");
    }

    Ok(())
}

pub async fn delete(entity: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;
    if store.delete(entity).await? {
        println!("🗑️  Deleted {entity}.");
    } else {
        println!("No data stored for {entity}.");
    }
    Ok(())
}

pub async fn table(domain: Option<Domain>) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;
    let rows = store.rows(domain).await?;

    if rows.is_empty() {
        println!("Store is empty.");
        return Ok(());
    }

    println!("{:<24} {:<16} {:<20} VALUE", "ENTITY", "DOMAIN", "LAST UPDATED");
    for row in rows {
        println!(
            "{:<24} {:<16} {:<20} {}",
            row.entity_name,
            row.domain.as_str(),
            row.last_updated.format("%Y-%m-%d %H:%M:%S"),
            truncate(&row.value, 80)
        );
    }

    Ok(())
}

pub async fn export(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;
    let snapshot = store.snapshot().await?;
    let count = snapshot.as_object().map_or(0, |m| m.len());

    std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
    println!("📤 Exported {count} satellite(s) to {}", path.display());

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{cut}…")
}
