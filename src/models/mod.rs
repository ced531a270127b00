use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ── Company (fundamentals table) ──────────────────────────────────────────────

/// One row of the `companies` table. The four statement fields are opaque
/// JSON documents exactly as they came out of the bulk load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub symbol: String,
    pub name: String,
    pub cash_flow: Value,
    pub income_statement: Value,
    pub balance_sheet: Value,
    pub profitability: Value,
}

/// Which JSON statement column to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    CashFlow,
    IncomeStatement,
    BalanceSheet,
    Profitability,
}

impl Statement {
    pub fn column(self) -> &'static str {
        match self {
            Statement::CashFlow => "cash_flow",
            Statement::IncomeStatement => "income_statement",
            Statement::BalanceSheet => "balance_sheet",
            Statement::Profitability => "profitability",
        }
    }
}

/// companies.csv: name, symbol, cash_flow, income_statement, balance_sheet, profitability
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompanyRow {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub cash_flow: Option<String>,
    pub income_statement: Option<String>,
    pub balance_sheet: Option<String>,
    pub profitability: Option<String>,
}

// ── Price history ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<i64>,
}

/// Day-over-day move between the last two closes.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PriceChange {
    pub change: f64,
    pub change_pct: f64,
}

// ── Provider metadata bag ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Officer {
    pub name: Option<String>,
    pub title: Option<String>,
}

/// Everything the provider knows about a listing, flattened. Any metric the
/// provider omits stays `None`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct QuoteSummary {
    pub symbol: String,

    pub market_cap: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub ebitda: Option<f64>,
    pub enterprise_to_ebitda: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,

    pub long_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub long_business_summary: Option<String>,
    pub officers: Vec<Officer>,
}

// ── Balance-sheet history ─────────────────────────────────────────────────────

pub const TOTAL_DEBT: &str = "Total Debt";
pub const CASH_AND_EQUIVALENTS: &str = "Cash And Cash Equivalents";
pub const OTHER_SHORT_TERM_INVESTMENTS: &str = "Other Short Term Investments";

/// Annual balance-sheet line items: item name → fiscal year end → value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheetHistory {
    pub items: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl BalanceSheetHistory {
    pub fn insert(&mut self, item: &str, date: NaiveDate, value: f64) {
        self.items
            .entry(item.to_string())
            .or_default()
            .insert(date, value);
    }

    pub fn item(&self, name: &str) -> Option<&BTreeMap<NaiveDate, f64>> {
        self.items.get(name)
    }
}
