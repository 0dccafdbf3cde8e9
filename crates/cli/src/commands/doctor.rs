//! `satscout doctor` — Diagnose configuration problems.

use satscout_config::AppConfig;
use satscout_core::store::ResultStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 SatScout Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — using defaults (run `satscout init`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running other checks.");
            return Ok(());
        }
    };

    println!(
        "  ✅ Provider: {} (model {})",
        config.default_provider, config.default_model
    );

    if config.has_api_key() || config.default_provider == "ollama" {
        println!("  ✅ LLM API key configured");
    } else {
        println!("  ❌ No LLM API key — set GOOGLE_API_KEY or SATSCOUT_API_KEY");
        issues += 1;
    }

    let search_keys = [
        ("TAVILY_API_KEY", config.search.tavily_api_key.is_some()),
        ("SERPAPI_API_KEY", config.search.serpapi_api_key.is_some()),
    ];
    for (name, present) in search_keys {
        if present {
            println!("  ✅ {name} configured");
        } else {
            println!("  ⚠️  {name} not set — that search tool will report itself unavailable");
            issues += 1;
        }
    }

    match satscout_store::open_from_config(&config).await {
        Ok(store) => {
            let count = store.list_entities().await.map(|e| e.len()).unwrap_or(0);
            println!(
                "  ✅ Store readable ({}, {} satellites)",
                config.store_path().display(),
                count
            );
        }
        Err(e) => {
            println!("  ❌ Store unreadable: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
