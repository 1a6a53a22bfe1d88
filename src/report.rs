// 📄 Report Exporter - Templated text report + screener CSV export
// Plain placeholder substitution; rendering to PDF is someone else's job

use crate::screener::{ScoredStock, ScreenerReport};
use crate::scoring::{Fundamentals, MAX_SCORE};
use anyhow::{Context, Result};
use std::path::Path;

const STOCK_REPORT_TEMPLATE: &str = "\
==============================================
 FUNDAMENTAL VALUATION REPORT
==============================================
 Stock       : {stock}
 Symbol      : {symbol}
 Sector      : {sector}
 Price       : {price}
----------------------------------------------
 P/E Ratio        : {pe}
 P/B Ratio        : {pb}
 Return on Equity : {roe}
 Debt/Equity      : {de}
 Revenue Growth   : {growth}
 Profit Margin    : {margin}
 Metrics reported : {reported} / {metric_count}
----------------------------------------------
 Score       : {score} / {max_score}
 Valuation   : {valuation}
==============================================
 Educational purpose only. Not investment advice.
";

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

/// Fill the report template for one scored stock.
pub fn render_stock_report(stock: &ScoredStock) -> String {
    let f = &stock.record.fundamentals;

    STOCK_REPORT_TEMPLATE
        .replace("{stock}", &stock.record.name)
        .replace("{symbol}", &stock.record.symbol)
        .replace("{sector}", stock.record.sector.as_deref().unwrap_or("n/a"))
        .replace("{price}", &fmt_opt(stock.record.price))
        .replace("{pe}", &fmt_opt(f.pe_ratio))
        .replace("{pb}", &fmt_opt(f.pb_ratio))
        .replace("{roe}", &fmt_pct(f.return_on_equity))
        .replace("{de}", &fmt_opt(f.debt_to_equity))
        .replace("{growth}", &fmt_pct(f.revenue_growth))
        .replace("{margin}", &fmt_pct(f.profit_margin))
        .replace("{reported}", &f.reported_count().to_string())
        .replace("{metric_count}", &Fundamentals::METRIC_COUNT.to_string())
        .replace("{max_score}", &MAX_SCORE.to_string())
        .replace("{score}", &stock.score.to_string())
        .replace("{valuation}", stock.valuation.as_str())
}

pub fn write_stock_report<P: AsRef<Path>>(path: P, stock: &ScoredStock) -> Result<()> {
    std::fs::write(path.as_ref(), render_stock_report(stock))
        .with_context(|| format!("Failed to write report: {:?}", path.as_ref()))
}

/// Export the ranked screener table as CSV (the dashboard's download button).
pub fn export_csv<P: AsRef<Path>>(path: P, report: &ScreenerReport) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())
        .with_context(|| format!("Failed to create CSV: {:?}", path.as_ref()))?;

    wtr.write_record([
        "Stock", "Symbol", "Sector", "Price", "PE", "PB", "ROE", "DebtEquity",
        "RevenueGrowth", "ProfitMargin", "MetricsReported", "Score", "Valuation",
    ])?;

    for row in &report.rows {
        let f = &row.record.fundamentals;
        wtr.write_record([
            row.record.name.as_str(),
            row.record.symbol.as_str(),
            row.record.sector.as_deref().unwrap_or(""),
            &opt_cell(row.record.price),
            &opt_cell(f.pe_ratio),
            &opt_cell(f.pb_ratio),
            &opt_cell(f.return_on_equity),
            &opt_cell(f.debt_to_equity),
            &opt_cell(f.revenue_growth),
            &opt_cell(f.profit_margin),
            &f.reported_count().to_string(),
            &row.score.to_string(),
            row.valuation.as_str(),
        ])?;
    }

    wtr.flush().context("Failed to flush CSV")?;
    Ok(())
}

fn opt_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StockRecord;
    use crate::scoring::{Fundamentals, ScoringConfig};
    use crate::screener::run_screener;

    fn scored_stock() -> ScoredStock {
        let mut record = StockRecord::new(
            "RELIANCE.NS",
            Fundamentals {
                pe_ratio: Some(18.0),
                pb_ratio: Some(4.0),
                return_on_equity: Some(0.22),
                debt_to_equity: Some(0.3),
                revenue_growth: Some(0.05),
                profit_margin: Some(0.12),
            },
        );
        record.sector = Some("Energy".to_string());
        record.price = Some(2450.0);
        ScoredStock::new(record, &ScoringConfig::default())
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let rendered = render_stock_report(&scored_stock());

        assert!(!rendered.contains('{'), "unsubstituted placeholder in:\n{}", rendered);
        assert!(rendered.contains("Stock       : RELIANCE"));
        assert!(rendered.contains("Sector      : Energy"));
        assert!(rendered.contains("Score       : 6 / 9"));
        assert!(rendered.contains("Valuation   : Neutral"));
        assert!(rendered.contains("Return on Equity : 22.0%"));
        assert!(rendered.contains("Metrics reported : 6 / 6"));
    }

    #[test]
    fn test_render_sparse_record_uses_na() {
        let stock = ScoredStock::new(
            StockRecord::new("SPARSE.NS", Fundamentals::default()),
            &ScoringConfig::default(),
        );
        let rendered = render_stock_report(&stock);

        assert!(rendered.contains("P/E Ratio        : n/a"));
        assert!(rendered.contains("Sector      : n/a"));
        assert!(rendered.contains("Metrics reported : 0 / 6"));
        assert!(rendered.contains("Score       : 0 / 9"));
        assert!(rendered.contains("Valuation   : Overvalued"));
    }

    #[test]
    fn test_report_counts_zero_metric_as_unreported() {
        let stock = ScoredStock::new(
            StockRecord::new(
                "ZERO.NS",
                Fundamentals {
                    pe_ratio: Some(0.0),
                    pb_ratio: Some(1.0),
                    ..Fundamentals::default()
                },
            ),
            &ScoringConfig::default(),
        );

        let rendered = render_stock_report(&stock);
        assert!(rendered.contains("Metrics reported : 1 / 6"));
    }

    #[test]
    fn test_export_csv_writes_ranked_rows() {
        let report = run_screener(
            vec![
                StockRecord::new("WEAK.NS", Fundamentals::default()),
                scored_stock().record,
            ],
            &ScoringConfig::default(),
        );

        let path = std::env::temp_dir().join("nifty_valuation_export_test.csv");
        export_csv(&path, &report).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Stock,Symbol,Sector"));
        assert!(lines[0].contains("MetricsReported"));
        // Ranked: RELIANCE (6, all metrics reported) before WEAK (0, none)
        assert!(lines[1].contains("RELIANCE.NS"));
        assert!(lines[1].ends_with(",6,6,Neutral"));
        assert!(lines[2].contains("WEAK.NS"));
        assert!(lines[2].ends_with(",0,0,Overvalued"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_stock_report() {
        let path = std::env::temp_dir().join("nifty_valuation_report_test.txt");
        write_stock_report(&path, &scored_stock()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("FUNDAMENTAL VALUATION REPORT"));

        std::fs::remove_file(&path).ok();
    }
}
