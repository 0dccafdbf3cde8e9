//! SatScout CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Write the default config file
//! - `research` — Research a satellite across one or all domains
//! - `show`     — Print stored records for a satellite
//! - `list`     — List researched satellites
//! - `delete`   — Remove a satellite from the store
//! - `table`    — Print the store as one row per satellite and domain
//! - `export`   — Write the whole store to a JSON file
//! - `tools`    — List the search tools each domain uses
//! - `prompt`   — Render the initial research prompt
//! - `doctor`   — Diagnose configuration problems

use clap::{Parser, Subcommand};
use satscout_core::schema::Domain;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "satscout",
    about = "SatScout — LLM-driven satellite research",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config to ~/.satscout/config.toml
    Init,

    /// Research a satellite
    Research {
        /// Satellite name, e.g. "INSAT-3D"
        entity: String,

        /// Only this domain (basic_info, technical_specs, launch_cost)
        #[arg(short, long)]
        domain: Option<Domain>,

        /// Re-run domains that are already stored
        #[arg(long)]
        refresh: bool,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Show stored records for a satellite
    Show {
        entity: String,

        #[arg(short, long)]
        domain: Option<Domain>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// List researched satellites
    List,

    /// Remove a satellite and all its records
    Delete { entity: String },

    /// Print stored records as a table
    Table {
        #[arg(short, long)]
        domain: Option<Domain>,
    },

    /// Export the whole store as JSON
    Export { path: PathBuf },

    /// List the search tools for each domain
    Tools {
        #[arg(short, long)]
        domain: Option<Domain>,
    },

    /// Render the initial prompt for a satellite and domain
    Prompt {
        entity: String,

        #[arg(short, long)]
        domain: Domain,
    },

    /// Diagnose configuration problems
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Research {
            entity,
            domain,
            refresh,
            timeout_secs,
        } => commands::research::run(&entity, domain, refresh, timeout_secs).await?,
        Commands::Show {
            entity,
            domain,
            json,
        } => commands::store::show(&entity, domain, json).await?,
        Commands::List => commands::store::list().await?,
        Commands::Delete { entity } => commands::store::delete(&entity).await?,
        Commands::Table { domain } => commands::store::table(domain).await?,
        Commands::Export { path } => commands::store::export(&path).await?,
        Commands::Tools { domain } => commands::inspect::tools(domain).await?,
        Commands::Prompt { entity, domain } => commands::inspect::prompt(&entity, domain).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
