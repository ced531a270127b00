use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::charts::Theme;
use crate::snapshot::OfficerMatching;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Market-data provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_query_url")]
    pub query_url: String,

    #[serde(default = "default_timeseries_url")]
    pub timeseries_url: String,

    #[serde(default = "default_cookie_url")]
    pub cookie_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

/// What the pages show and how they fetch it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Fixed symbol universe, in display order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    #[serde(default = "default_history_start")]
    pub history_start: NaiveDate,

    /// 1 keeps the summary page strictly sequential.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub officer_matching: OfficerMatching,
}

impl DashboardConfig {
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// "THYAO.IS" → "THYAO"
    pub fn label<'a>(&self, symbol: &'a str) -> Option<&'a str> {
        if !self.contains(symbol) {
            return None;
        }
        Some(symbol.split('.').next().unwrap_or(symbol))
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const BIST_SYMBOLS: [&str; 27] = [
    "ARCLK.IS", "ALARK.IS", "ASELS.IS", "ASTOR.IS", "BIMAS.IS", "BRSAN.IS", "EKGYO.IS",
    "ENKAI.IS", "EREGL.IS", "FROTO.IS", "GUBRF.IS", "HEKTS.IS", "KCHOL.IS", "KONTR.IS",
    "KOZAL.IS", "KRDMD.IS", "ODAS.IS", "OYAKC.IS", "PETKM.IS", "PGSUS.IS", "SAHOL.IS",
    "SASA.IS", "SISE.IS", "TCELL.IS", "THYAO.IS", "TOASO.IS", "TUPRS.IS",
];

fn default_query_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
fn default_timeseries_url() -> String {
    "https://query2.finance.yahoo.com".to_string()
}
fn default_cookie_url() -> String {
    "https://fc.yahoo.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) hissekar/0.1".to_string()
}
fn default_db_path() -> PathBuf {
    PathBuf::from("data/hissekar.duckdb")
}
fn default_true() -> bool {
    true
}
fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_symbols() -> Vec<String> {
    BIST_SYMBOLS.iter().map(|s| s.to_string()).collect()
}
fn default_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}
fn default_fetch_concurrency() -> usize {
    1
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            query_url: default_query_url(),
            timeseries_url: default_timeseries_url(),
            cookie_url: default_cookie_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            run_migrations: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            history_start: default_history_start(),
            fetch_concurrency: default_fetch_concurrency(),
            theme: Theme::default(),
            officer_matching: OfficerMatching::default(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("HISSEKAR").separator("__"))
            .build()
            .context("Failed to read configuration")?;

        cfg.try_deserialize().context("Invalid configuration")
    }
}
