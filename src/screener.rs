// 🔎 Stock Screener - Batch scoring, ranking and KPI counts
// Each stock is scored independently; sort order is deterministic

use crate::indices::NseIndex;
use crate::provider::StockRecord;
use crate::scoring::{ScoringConfig, Valuation};
use serde::{Deserialize, Serialize};

// ============================================================================
// SCORED STOCK
// ============================================================================

/// One screener row: a stock record with its score attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredStock {
    #[serde(flatten)]
    pub record: StockRecord,

    pub score: u8,

    pub valuation: Valuation,
}

impl ScoredStock {
    pub fn new(record: StockRecord, config: &ScoringConfig) -> Self {
        let result = config.score(&record.fundamentals, record.sector.as_deref());
        ScoredStock {
            record,
            score: result.score,
            valuation: result.valuation,
        }
    }
}

// ============================================================================
// KPI COUNTS
// ============================================================================

/// Per-bucket totals for the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationCounts {
    pub undervalued: usize,
    pub neutral: usize,
    pub overvalued: usize,
}

impl ValuationCounts {
    pub fn total(&self) -> usize {
        self.undervalued + self.neutral + self.overvalued
    }

    pub fn get(&self, valuation: Valuation) -> usize {
        match valuation {
            Valuation::Undervalued => self.undervalued,
            Valuation::Neutral => self.neutral,
            Valuation::Overvalued => self.overvalued,
        }
    }
}

// ============================================================================
// SCREENER REPORT
// ============================================================================

/// Scored and ranked screener table for one batch of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerReport {
    /// Rows sorted by score descending, symbol ascending as tie break
    pub rows: Vec<ScoredStock>,
}

impl ScreenerReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn counts(&self) -> ValuationCounts {
        let mut counts = ValuationCounts::default();
        for row in &self.rows {
            match row.valuation {
                Valuation::Undervalued => counts.undervalued += 1,
                Valuation::Neutral => counts.neutral += 1,
                Valuation::Overvalued => counts.overvalued += 1,
            }
        }
        counts
    }

    /// Percentage breakdown per bucket (pie chart data). Empty report gives
    /// 0% everywhere.
    pub fn distribution(&self) -> Vec<(Valuation, usize, f64)> {
        let counts = self.counts();
        let total = counts.total();

        Valuation::ALL
            .into_iter()
            .map(|v| {
                let count = counts.get(v);
                let pct = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                };
                (v, count, pct)
            })
            .collect()
    }

    pub fn filter(&self, valuation: Valuation) -> Vec<&ScoredStock> {
        self.rows.iter().filter(|row| row.valuation == valuation).collect()
    }

    pub fn find(&self, symbol: &str) -> Option<&ScoredStock> {
        self.rows.iter().find(|row| row.record.symbol == symbol)
    }
}

/// Score a batch of records and rank them.
///
/// Scoring is independent per record (no shared state, no ordering
/// constraint); the batch is small enough that sequential evaluation is the
/// right call - the expensive step is the upstream fetch, not this.
pub fn run_screener(records: Vec<StockRecord>, config: &ScoringConfig) -> ScreenerReport {
    let mut rows: Vec<ScoredStock> = records
        .into_iter()
        .map(|record| ScoredStock::new(record, config))
        .collect();

    rows.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.record.symbol.cmp(&b.record.symbol))
    });

    ScreenerReport { rows }
}

/// Score only the members of one index - the dashboard's index selector.
/// Records outside the membership list are dropped before scoring.
pub fn run_screener_for_index(
    records: Vec<StockRecord>,
    index: NseIndex,
    config: &ScoringConfig,
) -> ScreenerReport {
    let members = records
        .into_iter()
        .filter(|record| index.contains(&record.symbol))
        .collect();

    run_screener(members, config)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Fundamentals;

    fn record(symbol: &str, f: Fundamentals) -> StockRecord {
        StockRecord::new(symbol, f)
    }

    fn strong() -> Fundamentals {
        Fundamentals {
            pe_ratio: Some(15.0),
            pb_ratio: Some(2.0),
            return_on_equity: Some(0.25),
            debt_to_equity: Some(0.2),
            revenue_growth: Some(0.20),
            profit_margin: Some(0.15),
        }
    }

    fn middling() -> Fundamentals {
        Fundamentals {
            pe_ratio: Some(18.0),
            pb_ratio: Some(4.0),
            return_on_equity: Some(0.22),
            debt_to_equity: Some(0.3),
            revenue_growth: Some(0.05),
            profit_margin: Some(0.12),
        }
    }

    fn sample_report() -> ScreenerReport {
        run_screener(
            vec![
                record("WEAK.NS", Fundamentals::default()),
                record("STRONG.NS", strong()),
                record("MID.NS", middling()),
            ],
            &ScoringConfig::default(),
        )
    }

    #[test]
    fn test_rows_sorted_by_score_descending() {
        let report = sample_report();

        let symbols: Vec<&str> = report.rows.iter().map(|r| r.record.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["STRONG.NS", "MID.NS", "WEAK.NS"]);

        assert_eq!(report.rows[0].score, 9);
        assert_eq!(report.rows[1].score, 6);
        assert_eq!(report.rows[2].score, 0);
    }

    #[test]
    fn test_tie_break_on_symbol() {
        let report = run_screener(
            vec![
                record("ZULU.NS", strong()),
                record("ALPHA.NS", strong()),
            ],
            &ScoringConfig::default(),
        );

        assert_eq!(report.rows[0].record.symbol, "ALPHA.NS");
        assert_eq!(report.rows[1].record.symbol, "ZULU.NS");
    }

    #[test]
    fn test_kpi_counts() {
        let counts = sample_report().counts();

        assert_eq!(counts.undervalued, 1);
        assert_eq!(counts.neutral, 1);
        assert_eq!(counts.overvalued, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_distribution_percentages() {
        let distribution = sample_report().distribution();

        assert_eq!(distribution.len(), 3);
        for (_, count, pct) in distribution {
            assert_eq!(count, 1);
            assert!((pct - 33.333333).abs() < 0.001);
        }
    }

    #[test]
    fn test_empty_report() {
        let report = run_screener(vec![], &ScoringConfig::default());

        assert!(report.is_empty());
        assert_eq!(report.counts().total(), 0);
        for (_, count, pct) in report.distribution() {
            assert_eq!(count, 0);
            assert_eq!(pct, 0.0);
        }
    }

    #[test]
    fn test_filter_and_find() {
        let report = sample_report();

        let undervalued = report.filter(Valuation::Undervalued);
        assert_eq!(undervalued.len(), 1);
        assert_eq!(undervalued[0].record.symbol, "STRONG.NS");

        assert!(report.find("MID.NS").is_some());
        assert!(report.find("MISSING.NS").is_none());
    }

    #[test]
    fn test_run_screener_for_index_keeps_members_only() {
        let report = run_screener_for_index(
            vec![
                record("RELIANCE.NS", strong()),   // NIFTY 50
                record("DIXON.NS", middling()),    // NIFTY 151-250
                record("UNLISTED.NS", strong()),   // no index
            ],
            NseIndex::Nifty50,
            &ScoringConfig::default(),
        );

        assert_eq!(report.len(), 1);
        assert_eq!(report.rows[0].record.symbol, "RELIANCE.NS");
        assert_eq!(report.counts().undervalued, 1);
    }

    #[test]
    fn test_run_screener_for_index_empty_when_no_members() {
        let report = run_screener_for_index(
            vec![record("UNLISTED.NS", strong())],
            NseIndex::Nifty101To150,
            &ScoringConfig::default(),
        );

        assert!(report.is_empty());
    }

    #[test]
    fn test_sector_config_flows_through() {
        let mut config = ScoringConfig::default();
        config.sector_pe.set("IT", 40.0);

        let mut it_stock = record("TCS.NS", Fundamentals::default());
        it_stock.sector = Some("IT".to_string());
        it_stock.fundamentals.pe_ratio = Some(30.0);

        let other = record("OTHER.NS", Fundamentals {
            pe_ratio: Some(30.0),
            ..Fundamentals::default()
        });

        let report = run_screener(vec![it_stock, other], &config);

        assert_eq!(report.find("TCS.NS").unwrap().score, 2);
        assert_eq!(report.find("OTHER.NS").unwrap().score, 0);
    }
}
