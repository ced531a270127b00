//! Display formatting for financial metrics.

/// Placeholder rendered for a missing market cap.
pub const PLACEHOLDER: &str = "-";

/// Sentinel for metrics the provider did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Lira-prefixed market cap scaled to T/B/M with 3 decimals.
/// 1_500_000_000_000 → "₺1.500T" | 500 → "₺500"
pub fn format_market_cap(value: Option<f64>) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };

    let cap = value.trunc();
    if cap >= 1e12 {
        format!("₺{:.3}T", cap / 1e12)
    } else if cap >= 1e9 {
        format!("₺{:.3}B", cap / 1e9)
    } else if cap >= 1e6 {
        format!("₺{:.3}M", cap / 1e6)
    } else {
        format!("₺{}", cap as i64)
    }
}

/// Billions with 2 decimals and a detached minus sign.
/// -2_500_000_000 → "- 2.50B" | 0 → "0.00B" | None → None
pub fn format_signed_billions(value: Option<f64>) -> Option<String> {
    let value = value?;
    let billions = value.abs() / 1e9;
    if value < 0.0 {
        Some(format!("- {:.2}B", billions))
    } else {
        Some(format!("{:.2}B", billions))
    }
}

pub fn format_ratio(value: Option<f64>) -> Option<String> {
    value.map(|v| format!("{:.2}", v))
}

/// Round half away from zero to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn or_na<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
