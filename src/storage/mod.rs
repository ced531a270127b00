use crate::models::{Company, Statement};
use anyhow::{Context, Result};
use chrono::Utc;
use duckdb::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

// ── Schema ────────────────────────────────────────────────────────────────────

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    symbol            VARCHAR PRIMARY KEY,
    name              VARCHAR NOT NULL,
    -- Statement documents, stored verbatim as JSON text
    cash_flow         VARCHAR NOT NULL,
    income_statement  VARCHAR NOT NULL,
    balance_sheet     VARCHAR NOT NULL,
    profitability     VARCHAR NOT NULL,
    loaded_at         TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TIMESTAMP NOT NULL
);
"#;

fn no_rows_as_none<T>(err: duckdb::Error) -> duckdb::Result<Option<T>> {
    match err {
        duckdb::Error::QueryReturnedNoRows => Ok(None),
        other => Err(other),
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

/// Read access to the fundamentals table. The only write path is the bulk
/// loader's `replace_companies`.
pub struct Repository {
    conn: Mutex<Connection>,
}

impl Repository {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DuckDB at {:?}", path))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self { conn: Mutex::new(Connection::open_in_memory()?) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("DuckDB connection mutex poisoned"))
    }

    pub fn run_migrations(&self) -> Result<()> {
        info!("Running migrations…");
        let conn = self.conn()?;
        conn.execute_batch(DDL).context("DDL failed")?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, ?)",
            params![Utc::now().naive_utc()],
        )?;
        info!("Migrations done.");
        Ok(())
    }

    // ── Bulk load ─────────────────────────────────────────────────────────────

    /// Wipe the table and insert `companies` in one transaction.
    pub fn replace_companies(&self, companies: &[Company]) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM companies", [])?;
        debug!("Cleared {} existing companies", removed);

        let now = Utc::now().naive_utc();
        for c in companies {
            tx.execute(
                r#"INSERT INTO companies
                       (symbol, name, cash_flow, income_statement, balance_sheet, profitability, loaded_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
                params![
                    c.symbol,
                    c.name,
                    c.cash_flow.to_string(),
                    c.income_statement.to_string(),
                    c.balance_sheet.to_string(),
                    c.profitability.to_string(),
                    now,
                ],
            )
            .with_context(|| format!("insert company {}", c.symbol))?;
        }

        tx.commit()?;
        Ok(companies.len())
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    /// One statement document for `symbol`, `None` when no company matches.
    pub fn statement(&self, symbol: &str, statement: Statement) -> Result<Option<Value>> {
        // Column names come from a closed enum, never from input.
        let sql = format!("SELECT {} FROM companies WHERE symbol = ?", statement.column());
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(&sql, params![symbol], |r| r.get(0))
            .map(Some)
            .or_else(no_rows_as_none)
            .with_context(|| format!("lookup {} for {}", statement.column(), symbol))?;

        raw.map(|s| {
            serde_json::from_str(&s)
                .with_context(|| format!("corrupt {} JSON for {}", statement.column(), symbol))
        })
        .transpose()
    }

    pub fn cash_flow(&self, symbol: &str) -> Result<Option<Value>> {
        self.statement(symbol, Statement::CashFlow)
    }

    pub fn income_statement(&self, symbol: &str) -> Result<Option<Value>> {
        self.statement(symbol, Statement::IncomeStatement)
    }

    pub fn balance_sheet(&self, symbol: &str) -> Result<Option<Value>> {
        self.statement(symbol, Statement::BalanceSheet)
    }

    pub fn profitability(&self, symbol: &str) -> Result<Option<Value>> {
        self.statement(symbol, Statement::Profitability)
    }

    pub fn company_name(&self, symbol: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row("SELECT name FROM companies WHERE symbol = ?", params![symbol], |r| r.get(0))
            .map(Some)
            .or_else(no_rows_as_none)?)
    }

    pub fn list_symbols(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT symbol FROM companies ORDER BY symbol")?;
        let syms: Vec<String> = stmt
            .query_map([], |r| r.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(syms)
    }

    pub fn company_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let mut s = conn.prepare("SELECT COUNT(*) FROM companies")?;
        Ok(s.query_row([], |r| r.get(0))?)
    }
}
