//! CSV loader for bulk-importing company fundamentals.
//!
//! Expected header: `name,symbol,cash_flow,income_statement,balance_sheet,profitability`
//! where the last four columns hold JSON documents.

use crate::models::{Company, RawCompanyRow};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct LoadReport {
    pub companies: Vec<Company>,
    pub skipped: usize,
}

/// Parse a JSON column, naming the column in the error.
fn parse_json_column(column: &str, raw: Option<&str>) -> Result<Value> {
    let raw = raw.with_context(|| format!("missing column {}", column))?;
    serde_json::from_str(raw).with_context(|| format!("JSON parse error in {}", column))
}

pub fn row_to_company(row: &RawCompanyRow) -> Result<Company> {
    let symbol = row.symbol.as_deref().map(str::trim).unwrap_or_default();
    if symbol.is_empty() {
        bail!("empty symbol");
    }

    Ok(Company {
        symbol: symbol.to_string(),
        name: row.name.as_deref().map(str::trim).unwrap_or_default().to_string(),
        cash_flow: parse_json_column("cash_flow", row.cash_flow.as_deref())?,
        income_statement: parse_json_column("income_statement", row.income_statement.as_deref())?,
        balance_sheet: parse_json_column("balance_sheet", row.balance_sheet.as_deref())?,
        profitability: parse_json_column("profitability", row.profitability.as_deref())?,
    })
}

/// Read every row of `path`. Bad rows are logged and skipped; a missing or
/// unreadable file is an error.
pub fn load_companies_csv(path: &Path) -> Result<LoadReport> {
    if !path.exists() {
        bail!("CSV file not found: {:?}", path);
    }

    debug!("Loading companies from {:?}", path);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let mut report = LoadReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (i, result) in reader.deserialize::<RawCompanyRow>().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {} in {:?}: {}", i + 1, path, e);
                report.skipped += 1;
                continue;
            }
        };

        match row_to_company(&row) {
            Ok(company) if !seen.insert(company.symbol.clone()) => {
                warn!("Row {}: duplicate symbol {}, keeping the first", i + 1, company.symbol);
                report.skipped += 1;
            }
            Ok(company) => {
                debug!("✓ {} ({})", company.name, company.symbol);
                report.companies.push(company);
            }
            Err(e) => {
                warn!("Row {} ({}): {:#}", i + 1, row.name.as_deref().unwrap_or("?"), e);
                report.skipped += 1;
            }
        }
    }

    info!(
        "{:?}: {} companies parsed, {} skipped",
        path,
        report.companies.len(),
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_rows_and_skips_bad_json() {
        let file = write_csv(concat!(
            "name,symbol,cash_flow,income_statement,balance_sheet,profitability\n",
            "Türk Hava Yolları,THYAO.IS,\"{\"\"fcf\"\": 1}\",\"{}\",\"[]\",\"{\"\"roe\"\": 0.3}\"\n",
            "Broken,SASA.IS,\"{not json\",\"{}\",\"{}\",\"{}\"\n",
            "Tüpraş,TUPRS.IS,\"{}\",\"{}\",\"{}\",\"{}\"\n",
        ));

        let report = load_companies_csv(file.path()).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.companies.len(), 2);

        let thy = &report.companies[0];
        assert_eq!(thy.symbol, "THYAO.IS");
        assert_eq!(thy.name, "Türk Hava Yolları");
        assert_eq!(thy.cash_flow, serde_json::json!({"fcf": 1}));
        assert_eq!(thy.balance_sheet, serde_json::json!([]));
        assert_eq!(report.companies[1].symbol, "TUPRS.IS");
    }

    #[test]
    fn row_without_statement_columns_is_skipped() {
        let file = write_csv(concat!(
            "name,symbol,cash_flow,income_statement,balance_sheet,profitability\n",
            "Short,ODAS.IS,\"{}\"\n",
        ));

        let report = load_companies_csv(file.path()).unwrap();
        assert!(report.companies.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn repeated_symbol_keeps_first_row_and_loads_the_rest() {
        let file = write_csv(concat!(
            "name,symbol,cash_flow,income_statement,balance_sheet,profitability\n",
            "Türk Hava Yolları,THYAO.IS,\"{}\",\"{}\",\"{}\",\"{}\"\n",
            "Sasa,SASA.IS,\"{}\",\"{}\",\"{}\",\"{}\"\n",
            "THY again,THYAO.IS,\"{}\",\"{}\",\"{}\",\"{}\"\n",
        ));

        let report = load_companies_csv(file.path()).unwrap();
        assert_eq!(report.skipped, 1);
        let symbols: Vec<&str> = report.companies.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, ["THYAO.IS", "SASA.IS"]);
        assert_eq!(report.companies[0].name, "Türk Hava Yolları");

        let repo = crate::storage::Repository::open_in_memory().unwrap();
        repo.run_migrations().unwrap();
        assert_eq!(repo.replace_companies(&report.companies).unwrap(), 2);
        assert_eq!(repo.list_symbols().unwrap(), ["SASA.IS", "THYAO.IS"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_companies_csv(Path::new("/nonexistent/companies.csv")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let row = RawCompanyRow {
            name: Some("Nameless".into()),
            symbol: Some("  ".into()),
            ..Default::default()
        };
        assert!(row_to_company(&row).is_err());
    }
}
