use super::{AppError, AppState};
use crate::charts::{self, PlotOptions};
use crate::format::{format_ratio, or_na};
use crate::models::{PriceChange, QuoteSummary};
use crate::storage::Repository;
use crate::snapshot::{
    extract_executives, fetch_summary_rows, price_change, profile_metrics, Executives,
    ProfileMetrics, SummaryRow,
};
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use chrono::{Days, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tera::Context;
use tracing::{debug, error, info};

// ── Market-cap table ──────────────────────────────────────────────────────────

pub async fn marketcap(State(state): State<AppState>) -> Response {
    match render_marketcap(&state).await {
        Ok(page) => page.into_response(),
        Err(e) => state.error_page(e),
    }
}

async fn render_marketcap(state: &AppState) -> Result<Html<String>, AppError> {
    let rows: Vec<SummaryRow> = fetch_summary_rows(
        Arc::clone(&state.source),
        &state.dashboard.symbols,
        state.dashboard.fetch_concurrency,
    )
    .await?;
    info!("Market-cap table: {} rows", rows.len());

    let mut ctx = Context::new();
    ctx.insert("rows", &rows);
    state.render("marketcap.html", &ctx)
}

// ── Profile ───────────────────────────────────────────────────────────────────

/// Ratio columns, already formatted; "N/A" where not computable.
#[derive(Debug, Serialize)]
struct MetricsView {
    pe_ratio: String,
    price_to_book: String,
    ev_ebitda: String,
    ebitda: String,
    ev_fcff: String,
    roa: String,
    roe: String,
    current_ratio: String,
    quick_ratio: String,
    total_debt_to_fcf: String,
    cash_to_market_cap: String,
}

impl From<ProfileMetrics> for MetricsView {
    fn from(m: ProfileMetrics) -> Self {
        let show = |v: Option<f64>| or_na(format_ratio(v));
        Self {
            pe_ratio: show(m.pe_ratio),
            price_to_book: show(m.price_to_book),
            ev_ebitda: show(m.ev_ebitda),
            ebitda: show(m.ebitda),
            ev_fcff: show(m.ev_fcff),
            roa: show(m.roa),
            roe: show(m.roe),
            current_ratio: show(m.current_ratio),
            quick_ratio: show(m.quick_ratio),
            total_debt_to_fcf: show(m.total_debt_to_fcf),
            cash_to_market_cap: show(m.cash_to_market_cap),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompanyView {
    long_name: String,
    address: String,
    city: String,
    country: String,
    phone: String,
    website: String,
    sector: String,
    industry: String,
    description: String,
}

impl From<&QuoteSummary> for CompanyView {
    fn from(q: &QuoteSummary) -> Self {
        Self {
            long_name: or_na(q.long_name.as_deref()),
            address: or_na(q.address.as_deref()),
            city: or_na(q.city.as_deref()),
            country: or_na(q.country.as_deref()),
            phone: or_na(q.phone.as_deref()),
            website: or_na(q.website.as_deref()),
            sector: or_na(q.sector.as_deref()),
            industry: or_na(q.industry.as_deref()),
            description: or_na(q.long_business_summary.as_deref()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChangeView {
    change: String,
    change_pct: String,
    direction: &'static str,
}

impl From<PriceChange> for ChangeView {
    fn from(c: PriceChange) -> Self {
        let direction = if c.change > 0.0 {
            "up"
        } else if c.change < 0.0 {
            "down"
        } else {
            "flat"
        };
        Self {
            change: format!("{:+.2}", c.change),
            change_pct: format!("{:+.2}%", c.change_pct),
            direction,
        }
    }
}

/// The four statement documents, verbatim from the fundamentals table.
#[derive(Debug, Default, Serialize)]
struct FundamentalsView {
    available: bool,
    cash_flow: Option<Value>,
    income_statement: Option<Value>,
    balance_sheet: Option<Value>,
    profitability: Option<Value>,
}

impl FundamentalsView {
    /// Stored company name plus its statements; empty when the symbol was
    /// never loaded.
    fn load(repo: &Repository, symbol: &str) -> anyhow::Result<(Option<String>, Self)> {
        let Some(name) = repo.company_name(symbol)? else {
            return Ok((None, Self::default()));
        };
        let view = Self {
            available: true,
            cash_flow: repo.cash_flow(symbol)?,
            income_statement: repo.income_statement(symbol)?,
            balance_sheet: repo.balance_sheet(symbol)?,
            profitability: repo.profitability(symbol)?,
        };
        Ok((Some(name), view))
    }
}

#[derive(Debug, Serialize)]
struct ProfileView {
    symbol: String,
    label: String,
    stock_name: String,
    metrics: MetricsView,
    company: CompanyView,
    executives: Executives,
    price_chart: Option<String>,
    net_debt_chart: Option<String>,
    price_change: Option<ChangeView>,
    fundamentals: FundamentalsView,
}

pub async fn profile(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    match render_profile(&state, &symbol).await {
        Ok(page) => page.into_response(),
        Err(e) => state.error_page(e),
    }
}

async fn render_profile(state: &AppState, symbol: &str) -> Result<Html<String>, AppError> {
    let label = state
        .dashboard
        .label(symbol)
        .ok_or_else(|| AppError::InvalidSymbol(symbol.to_string()))?
        .to_string();
    let dash = &state.dashboard;

    let summary = state.source.quote_summary(symbol).await?;
    let metrics = profile_metrics(&summary);
    let executives = extract_executives(&summary.officers, dash.officer_matching);

    let tomorrow = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or_else(|| Utc::now().date_naive());
    let (price_chart, change) = match state.source.history(symbol, dash.history_start, tomorrow).await {
        Ok(bars) => {
            debug!("{}: {} bars for price chart", symbol, bars.len());
            let fig = charts::line_chart(&bars, Some(symbol), dash.theme);
            let html = charts::to_html(&fig, "price-chart", &PlotOptions::price())?;
            (Some(html), price_change(&bars))
        }
        Err(e) => {
            error!("Price chart omitted for {}: {}", symbol, e);
            (None, None)
        }
    };

    let net_debt_chart = match state.source.balance_sheet_history(symbol).await {
        Ok(history) => charts::net_debt_change_chart(&history, dash.theme)
            .map(|fig| charts::to_html(&fig, "net-debt-chart", &PlotOptions::bars()))
            .transpose()?,
        Err(e) => {
            error!("Net debt chart omitted for {}: {}", symbol, e);
            None
        }
    };

    let repo = Arc::clone(&state.repo);
    let owned = symbol.to_string();
    let (stored_name, fundamentals) =
        tokio::task::spawn_blocking(move || FundamentalsView::load(&repo, &owned))
            .await?
            .map_err(AppError::Storage)?;

    let stock_name = stored_name
        .or_else(|| summary.long_name.clone())
        .unwrap_or_else(|| label.clone());

    let view = ProfileView {
        symbol: symbol.to_string(),
        label,
        stock_name,
        metrics: metrics.into(),
        company: (&summary).into(),
        executives,
        price_chart,
        net_debt_chart,
        price_change: change.map(ChangeView::from),
        fundamentals,
    };

    state.render("profile.html", &Context::from_serialize(&view)?)
}

// ── Datatables ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ListingView<'a> {
    symbol: &'a str,
    label: &'a str,
}

pub async fn datatables(State(state): State<AppState>) -> Response {
    let listings: Vec<ListingView<'_>> = state
        .dashboard
        .symbols
        .iter()
        .map(|s| ListingView {
            symbol: s,
            label: s.split('.').next().unwrap_or(s),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("listings", &listings);
    match state.render("datatables.html", &ctx) {
        Ok(page) => page.into_response(),
        Err(e) => state.error_page(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_view_signs_and_direction() {
        let up = ChangeView::from(PriceChange { change: 7.0, change_pct: 2.5 });
        assert_eq!(up.change, "+7.00");
        assert_eq!(up.change_pct, "+2.50%");
        assert_eq!(up.direction, "up");

        let down = ChangeView::from(PriceChange { change: -0.5, change_pct: -1.25 });
        assert_eq!(down.change, "-0.50");
        assert_eq!(down.direction, "down");
    }

    #[test]
    fn metrics_view_fills_gaps_with_na() {
        let view = MetricsView::from(ProfileMetrics {
            pe_ratio: Some(5.0),
            ..Default::default()
        });
        assert_eq!(view.pe_ratio, "5.00");
        assert_eq!(view.ev_fcff, "N/A");
        assert_eq!(view.cash_to_market_cap, "N/A");
    }
}
