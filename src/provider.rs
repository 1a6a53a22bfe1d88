// 📥 Fundamentals Provider - Per-symbol snapshot records
// CSV-backed and in-memory providers behind one trait

use crate::scoring::Fundamentals;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// STOCK RECORD
// ============================================================================

/// One instrument's snapshot as supplied by a provider.
///
/// Only `fundamentals` feeds the scorer; `name`, `sector` and `price` pass
/// through to presentation untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// NSE symbol, e.g. "RELIANCE.NS"
    pub symbol: String,

    /// Display name ("RELIANCE")
    pub name: String,

    pub sector: Option<String>,

    pub price: Option<f64>,

    pub fundamentals: Fundamentals,
}

impl StockRecord {
    pub fn new(symbol: &str, fundamentals: Fundamentals) -> Self {
        StockRecord {
            symbol: symbol.to_string(),
            name: crate::indices::display_symbol(symbol).to_string(),
            sector: None,
            price: None,
            fundamentals,
        }
    }
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Source of fundamentals snapshots, one record per symbol.
pub trait FundamentalsProvider {
    fn fetch(&self, symbol: &str) -> Result<StockRecord>;

    /// Fetch a whole index membership list. Symbols that fail to resolve are
    /// skipped silently - a sparse screener table beats an aborted one.
    fn fetch_index(&self, symbols: &[&str]) -> Vec<StockRecord> {
        symbols.iter().filter_map(|s| self.fetch(s).ok()).collect()
    }
}

// ============================================================================
// CSV PROVIDER
// ============================================================================

/// CSV row with the snapshot column headers. Empty cells deserialize to None.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Symbol")]
    symbol: String,

    #[serde(rename = "Stock")]
    name: String,

    #[serde(rename = "Sector")]
    sector: Option<String>,

    #[serde(rename = "Price")]
    price: Option<f64>,

    #[serde(rename = "PE")]
    pe_ratio: Option<f64>,

    #[serde(rename = "PB")]
    pb_ratio: Option<f64>,

    #[serde(rename = "ROE")]
    return_on_equity: Option<f64>,

    #[serde(rename = "DebtEquity")]
    debt_to_equity: Option<f64>,

    #[serde(rename = "RevenueGrowth")]
    revenue_growth: Option<f64>,

    #[serde(rename = "ProfitMargin")]
    profit_margin: Option<f64>,
}

impl From<CsvRow> for StockRecord {
    fn from(row: CsvRow) -> Self {
        StockRecord {
            symbol: row.symbol,
            name: row.name,
            sector: row.sector.filter(|s| !s.is_empty()),
            price: row.price,
            fundamentals: Fundamentals {
                pe_ratio: row.pe_ratio,
                pb_ratio: row.pb_ratio,
                return_on_equity: row.return_on_equity,
                debt_to_equity: row.debt_to_equity,
                revenue_growth: row.revenue_growth,
                profit_margin: row.profit_margin,
            },
        }
    }
}

/// Offline provider backed by a fundamentals snapshot CSV.
pub struct CsvProvider {
    records: HashMap<String, StockRecord>,
}

impl CsvProvider {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path.as_ref())
            .with_context(|| format!("Failed to open fundamentals CSV: {:?}", path.as_ref()))?;

        let mut records = HashMap::new();

        for result in rdr.deserialize() {
            let row: CsvRow = result.context("Failed to deserialize fundamentals row")?;
            let record: StockRecord = row.into();
            records.insert(record.symbol.clone(), record);
        }

        Ok(CsvProvider { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in the snapshot (unordered).
    pub fn all_records(&self) -> Vec<StockRecord> {
        self.records.values().cloned().collect()
    }
}

impl FundamentalsProvider for CsvProvider {
    fn fetch(&self, symbol: &str) -> Result<StockRecord> {
        self.records
            .get(symbol)
            .cloned()
            .with_context(|| format!("Symbol not in snapshot: {}", symbol))
    }
}

// ============================================================================
// STATIC PROVIDER
// ============================================================================

/// In-memory provider for tests and demos.
pub struct StaticProvider {
    records: HashMap<String, StockRecord>,
}

impl StaticProvider {
    pub fn new(records: Vec<StockRecord>) -> Self {
        StaticProvider {
            records: records.into_iter().map(|r| (r.symbol.clone(), r)).collect(),
        }
    }
}

impl FundamentalsProvider for StaticProvider {
    fn fetch(&self, symbol: &str) -> Result<StockRecord> {
        self.records
            .get(symbol)
            .cloned()
            .with_context(|| format!("Unknown symbol: {}", symbol))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(symbol: &str, pe: Option<f64>) -> StockRecord {
        StockRecord {
            symbol: symbol.to_string(),
            name: crate::indices::display_symbol(symbol).to_string(),
            sector: Some("Energy".to_string()),
            price: Some(2450.0),
            fundamentals: Fundamentals {
                pe_ratio: pe,
                ..Fundamentals::default()
            },
        }
    }

    #[test]
    fn test_static_provider_fetch() {
        let provider = StaticProvider::new(vec![sample_record("RELIANCE.NS", Some(24.0))]);

        let record = provider.fetch("RELIANCE.NS").unwrap();
        assert_eq!(record.name, "RELIANCE");
        assert_eq!(record.fundamentals.pe_ratio, Some(24.0));

        assert!(provider.fetch("TCS.NS").is_err());
    }

    #[test]
    fn test_fetch_index_skips_missing_symbols() {
        let provider = StaticProvider::new(vec![
            sample_record("RELIANCE.NS", Some(24.0)),
            sample_record("TCS.NS", None),
        ]);

        let records = provider.fetch_index(&["RELIANCE.NS", "MISSING.NS", "TCS.NS"]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_csv_provider_round_trip() {
        let dir = std::env::temp_dir();
        let path = dir.join("nifty_valuation_provider_test.csv");

        let csv = "\
Symbol,Stock,Sector,Price,PE,PB,ROE,DebtEquity,RevenueGrowth,ProfitMargin
RELIANCE.NS,RELIANCE,Energy,2450.0,24.0,1.8,0.09,0.44,0.12,0.08
TCS.NS,TCS,IT,3890.5,29.5,12.1,0.46,0.08,0.06,0.19
SPARSE.NS,SPARSE,,,,,,,,
";
        std::fs::write(&path, csv).unwrap();

        let provider = CsvProvider::from_path(&path).unwrap();
        assert_eq!(provider.len(), 3);

        let reliance = provider.fetch("RELIANCE.NS").unwrap();
        assert_eq!(reliance.sector.as_deref(), Some("Energy"));
        assert_eq!(reliance.fundamentals.debt_to_equity, Some(0.44));

        let sparse = provider.fetch("SPARSE.NS").unwrap();
        assert_eq!(sparse.price, None);
        assert_eq!(sparse.fundamentals, Fundamentals::default());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_csv_provider_missing_file() {
        assert!(CsvProvider::from_path("/nonexistent/fundamentals.csv").is_err());
    }
}
