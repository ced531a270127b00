mod charts;
mod config;
mod format;
mod loader;
mod models;
mod provider;
mod snapshot;
mod storage;
mod utils;
mod web;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::loader::load_companies_csv;
use crate::provider::YahooClient;
use crate::storage::Repository;
use crate::web::AppState;

#[derive(Parser)]
#[command(name = "hissekar", about = "BIST stock dashboard", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard over HTTP
    Serve {
        /// Overrides server.bind_addr
        #[arg(short, long, env = "HISSEKAR_BIND")]
        bind: Option<String>,
    },

    /// Replace the fundamentals table with the contents of a CSV file
    LoadCompanies {
        #[arg(short, long, default_value = "data/companies.csv")]
        file: PathBuf,
    },

    /// Apply schema migrations without loading data
    Migrate,

    /// Show database statistics
    Stats,

    /// List symbols that have fundamentals stored
    Symbols,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "hissekar=info,warn",
        1 => "hissekar=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Serve { bind } => {
            let repo = Repository::open(&config.storage.db_path)?;
            if config.storage.run_migrations {
                repo.run_migrations()?;
            }
            if repo.company_count()? == 0 {
                warn!("Fundamentals table is empty; run `hissekar load-companies` first");
            }

            let source = YahooClient::new(&config.provider)?;
            let state = AppState::new(Arc::new(source), Arc::new(repo), config.dashboard)
                .context("Failed to compile page templates")?;
            let app = web::router(state);

            let addr = bind.unwrap_or(config.server.bind_addr);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Could not bind {}", addr))?;
            info!("Listening on http://{}", addr);
            axum::serve(listener, app).await.context("HTTP server failed")?;
        }

        Command::LoadCompanies { file } => {
            let _t = utils::Timer::start("Company bulk load");
            let report = load_companies_csv(&file)?;

            let repo = Repository::open(&config.storage.db_path)?;
            repo.run_migrations()?;
            let inserted = repo.replace_companies(&report.companies)?;

            info!("Done: {} companies loaded, {} rows skipped", inserted, report.skipped);
            println!("Loaded {} companies.", utils::fmt_count(inserted as i64));
        }

        Command::Migrate => {
            Repository::open(&config.storage.db_path)?.run_migrations()?;
            println!("Migrations applied.");
        }

        Command::Stats => {
            let repo = Repository::open(&config.storage.db_path)?;
            let companies = repo.company_count()?;
            let stored = repo.list_symbols()?;
            let covered = config
                .dashboard
                .symbols
                .iter()
                .filter(|s| stored.contains(s))
                .count();
            println!("─────────────────────────────────");
            println!("  hissekar — Database Stats");
            println!("─────────────────────────────────");
            println!("  Companies : {}", utils::fmt_count(companies));
            println!(
                "  Universe  : {}/{} with fundamentals",
                covered,
                config.dashboard.symbols.len()
            );
            println!("─────────────────────────────────");
        }

        Command::Symbols => {
            let repo = Repository::open(&config.storage.db_path)?;
            let syms = repo.list_symbols()?;
            if syms.is_empty() {
                println!("No symbols — run `hissekar load-companies` first.");
            } else {
                println!("{} symbols:", syms.len());
                for s in &syms {
                    println!("  {}", s);
                }
            }
        }
    }

    Ok(())
}
