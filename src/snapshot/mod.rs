//! Per-request views derived from provider data: summary-table rows,
//! profile ratios, executive extraction and the day-over-day move.

use crate::format::{format_market_cap, format_ratio, format_signed_billions, round2};
use crate::models::{Officer, PriceBar, PriceChange, QuoteSummary};
use crate::provider::{MarketDataSource, ProviderError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

// ── Summary table ─────────────────────────────────────────────────────────────

/// One formatted row of the market-cap table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryRow {
    pub symbol: String,
    pub label: String,
    pub current_price: String,
    pub market_cap: String,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    pub pe_ratio: Option<String>,
    pub ev_ebitda: Option<String>,
    pub free_cash_flow: Option<String>,
    pub total_debt: Option<String>,
}

pub fn summary_row(symbol: &str, close: f64, q: &QuoteSummary) -> SummaryRow {
    let ev_ebitda = match (q.enterprise_value, q.ebitda) {
        (Some(ev), Some(ebitda)) if ebitda != 0.0 => Some(ev / ebitda),
        _ => None,
    };

    SummaryRow {
        symbol: symbol.to_string(),
        label: symbol.split('.').next().unwrap_or(symbol).to_string(),
        current_price: format!("{:.2}", close),
        market_cap: format_market_cap(q.market_cap),
        high_52w: q.fifty_two_week_high,
        low_52w: q.fifty_two_week_low,
        pe_ratio: format_ratio(q.trailing_pe),
        ev_ebitda: format_ratio(ev_ebitda),
        free_cash_flow: format_signed_billions(q.free_cash_flow),
        total_debt: format_signed_billions(q.total_debt),
    }
}

pub async fn fetch_summary_row(
    source: &dyn MarketDataSource,
    symbol: &str,
) -> Result<SummaryRow, ProviderError> {
    let close = source.latest_close(symbol).await?;
    let summary = source.quote_summary(symbol).await?;
    Ok(summary_row(symbol, close, &summary))
}

/// Rows for every symbol, in input order. With `concurrency <= 1` symbols
/// are fetched one after another; otherwise at most `concurrency` fetches
/// run at once. The first failure fails the whole batch.
pub async fn fetch_summary_rows(
    source: Arc<dyn MarketDataSource>,
    symbols: &[String],
    concurrency: usize,
) -> Result<Vec<SummaryRow>, ProviderError> {
    if concurrency <= 1 {
        let mut rows = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            rows.push(fetch_summary_row(source.as_ref(), symbol).await?);
        }
        return Ok(rows);
    }

    let sem = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let symbol = symbol.clone();
        let source = Arc::clone(&source);
        let sem = Arc::clone(&sem);

        handles.push(tokio::spawn(async move {
            let _permit = sem
                .acquire_owned()
                .await
                .map_err(|_| ProviderError::NoData(symbol.clone()))?;
            debug!("Fetching summary for {}", symbol);
            fetch_summary_row(source.as_ref(), &symbol).await
        }));
    }

    let mut rows = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();
    while let Some(handle) = pending.next() {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!("Summary task panicked: {}", e);
                Err(ProviderError::NoData("summary task".to_string()))
            }
        };
        match outcome {
            Ok(row) => rows.push(row),
            Err(e) => {
                pending.for_each(|h| h.abort());
                return Err(e);
            }
        }
    }
    Ok(rows)
}

// ── Profile ratios ────────────────────────────────────────────────────────────

/// Valuation and balance-sheet ratios for the profile page. `None` renders
/// as "N/A".
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProfileMetrics {
    pub pe_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub ebitda: Option<f64>,
    pub ev_fcff: Option<f64>,
    /// Percent, already multiplied by 100.
    pub roa: Option<f64>,
    pub roe: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub total_debt_to_fcf: Option<f64>,
    pub cash_to_market_cap: Option<f64>,
}

/// `num / den` rounded to 2 decimals; `None` when either side is missing or
/// the denominator is zero.
pub fn guarded_ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => Some(round2(n / d)),
        _ => None,
    }
}

pub fn profile_metrics(q: &QuoteSummary) -> ProfileMetrics {
    let cash_to_market_cap = match (q.total_cash, q.market_cap) {
        (Some(cash), Some(cap)) if cash != 0.0 && cap != 0.0 => Some(round2(cash / cap)),
        _ => None,
    };

    ProfileMetrics {
        pe_ratio: q.trailing_pe.map(round2),
        price_to_book: q.price_to_book.map(round2),
        ev_ebitda: q.enterprise_to_ebitda.map(round2),
        ebitda: q.ebitda.map(round2),
        ev_fcff: guarded_ratio(q.enterprise_value, q.free_cash_flow),
        roa: q.return_on_assets.map(|v| round2(v * 100.0)),
        roe: q.return_on_equity.map(|v| round2(v * 100.0)),
        current_ratio: q.current_ratio.map(round2),
        quick_ratio: q.quick_ratio.map(round2),
        total_debt_to_fcf: guarded_ratio(q.total_debt, q.free_cash_flow),
        cash_to_market_cap,
    }
}

// ── Executives ────────────────────────────────────────────────────────────────

const CEO_KEYWORDS: [&str; 4] = ["ceo", "chief executive", "gm", "general manager"];
const CFO_KEYWORDS: [&str; 4] = ["cfo", "chief financial", "head of financial", "director of finance"];

/// How officer titles are mapped to the CFO slot.
///
/// `Observed` reproduces the live dashboard: its CFO test ends in an
/// always-true clause, so the first officer that is not a CEO becomes CFO
/// whatever their title. `Strict` only accepts CFO keywords. The default
/// stays `Observed` until product signs off on the change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerMatching {
    #[default]
    Observed,
    Strict,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Executives {
    pub ceo: String,
    pub cfo: String,
}

pub fn extract_executives(officers: &[Officer], matching: OfficerMatching) -> Executives {
    let mut ceo: Option<String> = None;
    let mut cfo: Option<String> = None;

    for officer in officers {
        let title = officer.title.as_deref().unwrap_or_default().to_lowercase();
        let name = || officer.name.clone().unwrap_or_else(|| "N/A".to_string());

        if CEO_KEYWORDS.iter().any(|k| title.contains(k)) {
            ceo.get_or_insert_with(name);
        } else if matching == OfficerMatching::Observed
            || CFO_KEYWORDS.iter().any(|k| title.contains(k))
        {
            cfo.get_or_insert_with(name);
        }
    }

    Executives {
        ceo: ceo.unwrap_or_else(|| "N/A".to_string()),
        cfo: cfo.unwrap_or_else(|| "N/A".to_string()),
    }
}

// ── Price change ──────────────────────────────────────────────────────────────

/// Move from the second-to-last close to the last one, in lira and percent.
///
/// Signed as `latest - previous` over `previous`, so a rising price is
/// positive. The live dashboard computed `previous - latest` as a fraction of
/// `latest` and never displayed it.
pub fn price_change(bars: &[PriceBar]) -> Option<PriceChange> {
    let [.., prev, last] = bars else {
        return None;
    };
    if prev.close == 0.0 {
        return None;
    }
    let change = last.close - prev.close;
    Some(PriceChange {
        change: round2(change),
        change_pct: round2(change / prev.close * 100.0),
    })
}
