//! Yahoo Finance adapter.
//!
//! Three unofficial endpoints cover everything the dashboard needs:
//! `quoteSummary` for metrics and company metadata, `chart` for daily bars,
//! and `fundamentals-timeseries` for annual balance-sheet items. The first
//! two want a crumb token bound to the session cookie.

use crate::config::ProviderConfig;
use crate::models::{
    BalanceSheetHistory, Officer, PriceBar, QuoteSummary, CASH_AND_EQUIVALENTS,
    OTHER_SHORT_TERM_INVESTMENTS, TOTAL_DEBT,
};
use crate::provider::http_client::HttpClient;
use crate::provider::{MarketDataSource, ProviderError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

const SUMMARY_MODULES: &str =
    "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";

/// Timeseries type → balance-sheet line item it feeds.
const BALANCE_SHEET_SERIES: [(&str, &str); 3] = [
    ("annualTotalDebt", TOTAL_DEBT),
    ("annualCashAndCashEquivalents", CASH_AND_EQUIVALENTS),
    ("annualOtherShortTermInvestments", OTHER_SHORT_TERM_INVESTMENTS),
];

// ── Client ────────────────────────────────────────────────────────────────────

pub struct YahooClient {
    http: HttpClient,
    query_url: String,
    timeseries_url: String,
    cookie_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            query_url: config.query_url.trim_end_matches('/').to_string(),
            timeseries_url: config.timeseries_url.trim_end_matches('/').to_string(),
            cookie_url: config.cookie_url.clone(),
            crumb: Mutex::new(None),
        })
    }

    /// Cached crumb, fetched on first use.
    async fn crumb(&self) -> Result<String, ProviderError> {
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        self.http.touch(&self.cookie_url).await?;
        let url = format!("{}/v1/test/getcrumb", self.query_url);
        let body = self.http.get_text(&url).await?;
        let crumb = body.trim();

        if crumb.is_empty() || crumb.len() > 100 || crumb.contains(' ') || crumb.contains('<') {
            return Err(ProviderError::Parse(format!("unusable crumb response: {:.40}", crumb)));
        }

        info!("Obtained Yahoo crumb");
        *guard = Some(crumb.to_string());
        Ok(crumb.to_string())
    }

    /// GET with the crumb attached. A 401 drops the cached crumb so the next
    /// call starts a fresh session.
    async fn get_authenticated(&self, mut url: Url) -> Result<String, ProviderError> {
        let crumb = self.crumb().await?;
        url.query_pairs_mut().append_pair("crumb", &crumb);

        match self.http.get_text(url.as_str()).await {
            Err(e @ ProviderError::Unauthorized { .. }) => {
                *self.crumb.lock().await = None;
                Err(e)
            }
            other => other,
        }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        Ok(Url::parse(&format!("{}/v8/finance/chart/", self.query_url))?.join(symbol)?)
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl MarketDataSource for YahooClient {
    async fn latest_close(&self, symbol: &str) -> Result<f64, ProviderError> {
        let mut url = self.chart_url(symbol)?;
        url.query_pairs_mut()
            .append_pair("range", "5d")
            .append_pair("interval", "1d");

        let body = self.get_authenticated(url).await?;
        let bars = parse_chart(symbol, &body)?;
        bars.last()
            .map(|b| b.close)
            .ok_or_else(|| ProviderError::NoData(symbol.to_string()))
    }

    async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummary, ProviderError> {
        let mut url =
            Url::parse(&format!("{}/v10/finance/quoteSummary/", self.query_url))?.join(symbol)?;
        url.query_pairs_mut().append_pair("modules", SUMMARY_MODULES);

        let body = self.get_authenticated(url).await?;
        parse_quote_summary(symbol, &body)
    }

    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let mut url = self.chart_url(symbol)?;
        url.query_pairs_mut()
            .append_pair("period1", &unix_seconds(start).to_string())
            .append_pair("period2", &unix_seconds(end).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");

        let body = self.get_authenticated(url).await?;
        let bars = parse_chart(symbol, &body)?;
        debug!("{}: {} bars {} → {}", symbol, bars.len(), start, end);
        Ok(bars)
    }

    async fn balance_sheet_history(&self, symbol: &str) -> Result<BalanceSheetHistory, ProviderError> {
        let mut url = Url::parse(&format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/",
            self.timeseries_url
        ))?
        .join(symbol)?;

        let types: Vec<&str> = BALANCE_SHEET_SERIES.iter().map(|(t, _)| *t).collect();
        let from = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default();
        url.query_pairs_mut()
            .append_pair("type", &types.join(","))
            .append_pair("period1", &unix_seconds(from).to_string())
            .append_pair("period2", &Utc::now().timestamp().to_string());

        let body = self.http.get_text(url.as_str()).await?;
        parse_timeseries(symbol, &body)
    }
}

// ── quoteSummary ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: Envelope<SummaryResult>,
}

/// `{ result: [...] | null, error: {...} | null }`, shared by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<Vec<T>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl ApiError {
    fn message(&self) -> String {
        match (&self.code, &self.description) {
            (Some(c), Some(d)) => format!("{}: {}", c, d),
            (Some(c), None) => c.clone(),
            (None, Some(d)) => d.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

impl<T> Envelope<T> {
    fn into_first(self, symbol: &str) -> Result<T, ProviderError> {
        if let Some(err) = self.error {
            return Err(ProviderError::Api {
                symbol: symbol.to_string(),
                message: err.message(),
            });
        }
        self.result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::NoData(symbol.to_string()))
    }
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`; sometimes `{}`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(v: &Option<RawValue>) -> Option<f64> {
    v.and_then(|v| v.raw).filter(|x| x.is_finite())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatisticsModule>,
    #[serde(default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(default)]
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    market_cap: Option<RawValue>,
    long_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    market_cap: Option<RawValue>,
    fifty_two_week_high: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    enterprise_value: Option<RawValue>,
    price_to_book: Option<RawValue>,
    enterprise_to_ebitda: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    ebitda: Option<RawValue>,
    free_cashflow: Option<RawValue>,
    total_debt: Option<RawValue>,
    total_cash: Option<RawValue>,
    return_on_assets: Option<RawValue>,
    return_on_equity: Option<RawValue>,
    current_ratio: Option<RawValue>,
    quick_ratio: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfileModule {
    address1: Option<String>,
    address2: Option<String>,
    city: Option<String>,
    country: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    industry: Option<String>,
    sector: Option<String>,
    long_business_summary: Option<String>,
    #[serde(default)]
    company_officers: Vec<OfficerEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct OfficerEntry {
    name: Option<String>,
    title: Option<String>,
}

pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<QuoteSummary, ProviderError> {
    let resp: QuoteSummaryResponse = serde_json::from_str(body)?;
    let r = resp.quote_summary.into_first(symbol)?;

    let price = r.price.unwrap_or_default();
    let detail = r.summary_detail.unwrap_or_default();
    let stats = r.default_key_statistics.unwrap_or_default();
    let fin = r.financial_data.unwrap_or_default();
    let profile = r.asset_profile.unwrap_or_default();

    Ok(QuoteSummary {
        symbol: symbol.to_string(),
        market_cap: raw(&detail.market_cap).or(raw(&price.market_cap)),
        fifty_two_week_high: raw(&detail.fifty_two_week_high),
        fifty_two_week_low: raw(&detail.fifty_two_week_low),
        trailing_pe: raw(&detail.trailing_pe),
        price_to_book: raw(&stats.price_to_book),
        enterprise_value: raw(&stats.enterprise_value),
        ebitda: raw(&fin.ebitda),
        enterprise_to_ebitda: raw(&stats.enterprise_to_ebitda),
        free_cash_flow: raw(&fin.free_cashflow),
        total_debt: raw(&fin.total_debt),
        total_cash: raw(&fin.total_cash),
        return_on_assets: raw(&fin.return_on_assets),
        return_on_equity: raw(&fin.return_on_equity),
        current_ratio: raw(&fin.current_ratio),
        quick_ratio: raw(&fin.quick_ratio),
        long_name: price.long_name,
        address: profile.address2.or(profile.address1),
        city: profile.city,
        country: profile.country,
        phone: profile.phone,
        website: profile.website,
        sector: profile.sector,
        industry: profile.industry,
        long_business_summary: profile.long_business_summary,
        officers: profile
            .company_officers
            .into_iter()
            .map(|o| Officer { name: o.name, title: o.title })
            .collect(),
    })
}

// ── chart ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Envelope<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// Daily bars from a chart payload. Rows without a close are dropped;
/// timestamps are shifted into exchange-local time before taking the date.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<PriceBar>, ProviderError> {
    let resp: ChartResponse = serde_json::from_str(body)?;
    let result = resp.chart.into_first(symbol)?;

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(close) = at(&quote.close, i) else { continue };
        let Some(dt) = DateTime::from_timestamp(ts + offset, 0) else {
            return Err(ProviderError::Parse(format!("bad timestamp {} for {}", ts, symbol)));
        };

        bars.push(PriceBar {
            date: dt.date_naive(),
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close,
            volume: quote.volume.get(i).copied().flatten(),
        });
    }

    Ok(bars)
}

// ── fundamentals-timeseries ───────────────────────────────────────────────────

/// Each result entry carries its data under a key named after its type,
/// so the payload is walked as untyped JSON.
pub fn parse_timeseries(symbol: &str, body: &str) -> Result<BalanceSheetHistory, ProviderError> {
    let doc: Value = serde_json::from_str(body)?;
    let ts = doc
        .get("timeseries")
        .ok_or_else(|| ProviderError::Parse("missing timeseries".to_string()))?;

    if let Some(err) = ts.get("error").filter(|e| !e.is_null()) {
        let err: ApiError = serde_json::from_value(err.clone())?;
        return Err(ProviderError::Api {
            symbol: symbol.to_string(),
            message: err.message(),
        });
    }

    let mut history = BalanceSheetHistory::default();
    let results = ts.get("result").and_then(Value::as_array).cloned().unwrap_or_default();

    for entry in &results {
        let Some(kind) = entry
            .pointer("/meta/type/0")
            .and_then(Value::as_str)
        else {
            continue;
        };
        let Some((_, item)) = BALANCE_SHEET_SERIES.iter().find(|(t, _)| *t == kind) else {
            continue;
        };
        let Some(points) = entry.get(kind).and_then(Value::as_array) else {
            continue;
        };

        for point in points.iter().filter(|p| !p.is_null()) {
            let date = point
                .get("asOfDate")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            let value = point.pointer("/reportedValue/raw").and_then(Value::as_f64);

            if let (Some(date), Some(value)) = (date, value) {
                history.insert(item, date, value);
            }
        }
    }

    debug!("{}: balance sheet items {:?}", symbol, history.items.keys().collect::<Vec<_>>());
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = r#"{
      "quoteSummary": {
        "result": [{
          "price": {"marketCap": {"raw": 4.1e11, "fmt": "410B"}, "longName": "Türk Hava Yollari Anonim Ortakligi"},
          "summaryDetail": {
            "marketCap": {"raw": 4.2e11},
            "fiftyTwoWeekHigh": {"raw": 331.5},
            "fiftyTwoWeekLow": {"raw": 240.1},
            "trailingPE": {}
          },
          "defaultKeyStatistics": {"enterpriseValue": {"raw": 6.0e11}, "priceToBook": {"raw": 0.91}},
          "financialData": {
            "ebitda": {"raw": 1.5e11},
            "freeCashflow": {"raw": -2.5e9},
            "totalDebt": {"raw": 3.3e11},
            "totalCash": {"raw": 1.2e11},
            "returnOnAssets": {"raw": 0.0731}
          },
          "assetProfile": {
            "address1": "Yesilköy Mahallesi",
            "address2": "Bakirköy",
            "city": "Istanbul",
            "country": "Turkey",
            "sector": "Industrials",
            "industry": "Airlines",
            "companyOfficers": [
              {"name": "Mr. Bilal Eksi", "title": "CEO & GM", "age": 55},
              {"name": "Mr. Murat Seker", "title": "Chief Financial Officer"}
            ]
          }
        }],
        "error": null
      }
    }"#;

    #[test]
    fn quote_summary_maps_modules_and_leaves_gaps_empty() {
        let s = parse_quote_summary("THYAO.IS", SUMMARY).unwrap();
        assert_eq!(s.symbol, "THYAO.IS");
        assert_eq!(s.market_cap, Some(4.2e11));
        assert_eq!(s.fifty_two_week_high, Some(331.5));
        assert_eq!(s.trailing_pe, None);
        assert_eq!(s.enterprise_to_ebitda, None);
        assert_eq!(s.free_cash_flow, Some(-2.5e9));
        assert_eq!(s.return_on_equity, None);
        assert_eq!(s.address.as_deref(), Some("Bakirköy"));
        assert_eq!(s.website, None);
        assert_eq!(s.officers.len(), 2);
        assert_eq!(s.officers[1].title.as_deref(), Some("Chief Financial Officer"));
    }

    #[test]
    fn quote_summary_api_error_is_surfaced() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for symbol: XYZ.IS"}}}"#;
        match parse_quote_summary("XYZ.IS", body) {
            Err(ProviderError::Api { symbol, message }) => {
                assert_eq!(symbol, "XYZ.IS");
                assert!(message.starts_with("Not Found"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    // 2024-03-01T06:30Z and 2024-03-04T06:30Z, exchange at UTC+3
    const CHART: &str = r#"{"chart":{"result":[{
        "meta": {"symbol": "SASA.IS", "gmtoffset": 10800},
        "timestamp": [1709274600, 1709361000, 1709533800],
        "indicators": {"quote": [{
            "open": [40.0, null, 41.2],
            "high": [41.0, null, 42.0],
            "low": [39.5, null, 40.9],
            "close": [40.6, null, 41.8],
            "volume": [1000, null, 2500]
        }]}
    }], "error": null}}"#;

    #[test]
    fn chart_skips_null_closes_and_applies_gmt_offset() {
        let body = CHART;
        let bars = parse_chart("SASA.IS", body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(bars[1].close, 41.8);
        assert_eq!(bars[1].volume, Some(2500));
    }

    #[test]
    fn chart_without_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart("ODAS.IS", body).unwrap().is_empty());

        // Some responses leave out the error key entirely.
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[]}}]}}"#;
        assert!(parse_chart("ODAS.IS", body).unwrap().is_empty());
    }

    #[test]
    fn timeseries_groups_points_by_line_item() {
        let body = r#"{"timeseries":{"result":[
            {"meta":{"symbol":["EREGL.IS"],"type":["annualTotalDebt"]},"timestamp":[1],
             "annualTotalDebt":[
                {"asOfDate":"2021-12-31","reportedValue":{"raw":100.0}},
                null,
                {"asOfDate":"2022-12-31","reportedValue":{"raw":150.0}}
             ]},
            {"meta":{"symbol":["EREGL.IS"],"type":["annualOtherShortTermInvestments"]}},
            {"meta":{"symbol":["EREGL.IS"],"type":["annualCashAndCashEquivalents"]},
             "annualCashAndCashEquivalents":[{"asOfDate":"2022-12-31","reportedValue":{"raw":80.0}}]}
        ],"error":null}}"#;

        let h = parse_timeseries("EREGL.IS", body).unwrap();
        let debt = h.item(TOTAL_DEBT).unwrap();
        assert_eq!(debt.len(), 2);
        assert_eq!(debt[&NaiveDate::from_ymd_opt(2022, 12, 31).unwrap()], 150.0);
        assert!(h.item(CASH_AND_EQUIVALENTS).is_some());
        assert!(h.item(OTHER_SHORT_TERM_INVESTMENTS).is_none());
    }

    #[test]
    fn unix_seconds_is_midnight_utc() {
        assert_eq!(unix_seconds(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()), 1_577_836_800);
    }

    // ── against a mock server ────────────────────────────────────────────────

    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> YahooClient {
        YahooClient::new(&ProviderConfig {
            query_url: server.base_url(),
            timeseries_url: server.base_url(),
            cookie_url: server.url("/consent"),
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap()
    }

    async fn session<'a>(
        server: &'a MockServer,
        crumb: &'static str,
    ) -> (httpmock::Mock<'a>, httpmock::Mock<'a>) {
        let consent = server
            .mock_async(|when, then| {
                when.method(GET).path("/consent");
                then.status(404).header("set-cookie", "A3=d=AQABBK; Path=/");
            })
            .await;
        let getcrumb = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/test/getcrumb").header_exists("cookie");
                then.status(200).body(crumb);
            })
            .await;
        (consent, getcrumb)
    }

    #[tokio::test]
    async fn crumb_follows_the_cookie_and_is_reused() {
        let server = MockServer::start_async().await;
        let (consent, getcrumb) = session(&server, "Xy7.crumb").await;
        let chart = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v8/finance/chart/SASA.IS")
                    .query_param("range", "5d")
                    .query_param("interval", "1d")
                    .query_param("crumb", "Xy7.crumb");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(CHART);
            })
            .await;

        let client = client_for(&server);
        assert_eq!(client.latest_close("SASA.IS").await.unwrap(), 41.8);
        assert_eq!(client.latest_close("SASA.IS").await.unwrap(), 41.8);

        consent.assert_async().await;
        getcrumb.assert_async().await;
        chart.assert_calls_async(2).await;
    }

    #[tokio::test]
    async fn unauthorized_drops_the_cached_crumb() {
        let server = MockServer::start_async().await;
        let (_, getcrumb) = session(&server, "stale").await;
        let summary = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v10/finance/quoteSummary/THYAO.IS")
                    .query_param("modules", SUMMARY_MODULES);
                then.status(401);
            })
            .await;

        let client = client_for(&server);
        for _ in 0..2 {
            assert!(matches!(
                client.quote_summary("THYAO.IS").await,
                Err(ProviderError::Unauthorized { .. })
            ));
        }

        summary.assert_calls_async(2).await;
        getcrumb.assert_calls_async(2).await;
    }

    #[tokio::test]
    async fn quote_summary_requests_every_module() {
        let server = MockServer::start_async().await;
        session(&server, "abc").await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v10/finance/quoteSummary/THYAO.IS")
                    .query_param("modules", SUMMARY_MODULES)
                    .query_param("crumb", "abc");
                then.status(200).body(SUMMARY);
            })
            .await;

        let summary = client_for(&server).quote_summary("THYAO.IS").await.unwrap();
        assert_eq!(summary.market_cap, Some(4.2e11));
        assert_eq!(summary.officers.len(), 2);
    }

    #[tokio::test]
    async fn history_sends_the_date_window() {
        let server = MockServer::start_async().await;
        session(&server, "abc").await;
        let chart = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v8/finance/chart/SASA.IS")
                    .query_param("period1", "1577836800")
                    .query_param("period2", "1580515200")
                    .query_param("interval", "1d")
                    .query_param("events", "history");
                then.status(200).body(CHART);
            })
            .await;

        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
        let bars = client_for(&server).history("SASA.IS", start, end).await.unwrap();

        chart.assert_async().await;
        assert_eq!(bars.len(), 2);
    }

    #[tokio::test]
    async fn balance_sheet_history_needs_no_crumb() {
        let server = MockServer::start_async().await;
        let (_, getcrumb) = session(&server, "abc").await;
        let series = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/ws/fundamentals-timeseries/v1/finance/timeseries/EREGL.IS")
                    .query_param(
                        "type",
                        "annualTotalDebt,annualCashAndCashEquivalents,annualOtherShortTermInvestments",
                    )
                    .query_param("period1", "1451606400")
                    .query_param_exists("period2");
                then.status(200).body(
                    r#"{"timeseries":{"result":[
                        {"meta":{"type":["annualTotalDebt"]},
                         "annualTotalDebt":[{"asOfDate":"2023-12-31","reportedValue":{"raw":42.0}}]}
                    ],"error":null}}"#,
                );
            })
            .await;

        let history = client_for(&server).balance_sheet_history("EREGL.IS").await.unwrap();

        series.assert_async().await;
        getcrumb.assert_calls_async(0).await;
        let debt = history.item(TOTAL_DEBT).unwrap();
        assert_eq!(debt[&NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()], 42.0);
    }
}
