// 📊 Valuation Scorer - Rules as Data
// Additive rule-based scoring: six fundamental ratios → score 0-9 → bucket

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// WEIGHT TABLE
// ============================================================================

/// Fixed rule weights. Sum = 9 (maximum attainable score).
pub const WEIGHT_PE: u8 = 2;
pub const WEIGHT_PB: u8 = 1;
pub const WEIGHT_ROE: u8 = 2;
pub const WEIGHT_DEBT_EQUITY: u8 = 1;
pub const WEIGHT_REVENUE_GROWTH: u8 = 2;
pub const WEIGHT_PROFIT_MARGIN: u8 = 1;

/// Maximum attainable score with the fixed weight table.
pub const MAX_SCORE: u8 =
    WEIGHT_PE + WEIGHT_PB + WEIGHT_ROE + WEIGHT_DEBT_EQUITY + WEIGHT_REVENUE_GROWTH + WEIGHT_PROFIT_MARGIN;

/// Global "sector average PE" fallback used when no per-sector threshold is
/// configured.
pub const SECTOR_PE_AVG: f64 = 25.0;

// ============================================================================
// FUNDAMENTALS RECORD
// ============================================================================

/// Snapshot of one instrument's fundamental ratios at fetch time.
///
/// Every field is independently optional - a sparse record is a normal,
/// expected state, not an error. Fractional fields: 0.15 = 15%.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    /// Trailing price-to-earnings ratio
    pub pe_ratio: Option<f64>,

    /// Price-to-book ratio
    pub pb_ratio: Option<f64>,

    /// Return on equity (fractional)
    pub return_on_equity: Option<f64>,

    /// Debt-to-equity ratio (fractional)
    pub debt_to_equity: Option<f64>,

    /// Year-over-year revenue growth (fractional)
    pub revenue_growth: Option<f64>,

    /// Net profit margin (fractional)
    pub profit_margin: Option<f64>,
}

impl Fundamentals {
    /// Number of metrics in the record.
    pub const METRIC_COUNT: usize = 6;

    /// Number of metrics actually reported (present and non-zero). Shown as
    /// the data-completeness figure next to the score.
    pub fn reported_count(&self) -> usize {
        [
            self.pe_ratio,
            self.pb_ratio,
            self.return_on_equity,
            self.debt_to_equity,
            self.revenue_growth,
            self.profit_margin,
        ]
        .iter()
        .filter(|m| reported(**m).is_some())
        .count()
    }
}

/// Presence check shared by every rule.
///
/// A value of exactly zero is treated the same as an absent value: neither
/// contributes to the score. The rule set cannot distinguish "reported as 0"
/// from "not reported" (zero-debt companies score like missing-data ones).
/// Preserved intentionally - see DESIGN.md before changing.
fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

// ============================================================================
// VALUATION LABEL
// ============================================================================

/// Coarse valuation bucket derived from the score via fixed cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Valuation {
    Undervalued,
    Neutral,
    Overvalued,
}

impl Valuation {
    pub const ALL: [Valuation; 3] = [Valuation::Undervalued, Valuation::Neutral, Valuation::Overvalued];

    pub fn as_str(&self) -> &'static str {
        match self {
            Valuation::Undervalued => "Undervalued",
            Valuation::Neutral => "Neutral",
            Valuation::Overvalued => "Overvalued",
        }
    }

    pub fn from_name(name: &str) -> Option<Valuation> {
        match name.to_lowercase().as_str() {
            "undervalued" => Some(Valuation::Undervalued),
            "neutral" => Some(Valuation::Neutral),
            "overvalued" => Some(Valuation::Overvalued),
            _ => None,
        }
    }
}

impl std::fmt::Display for Valuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SCORE RESULT
// ============================================================================

/// Score + bucket for one instrument.
///
/// A pure projection of a `Fundamentals` record - computed fresh every time,
/// never stored with its own identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Integer sum of weighted rule outcomes, always in 0..=9
    pub score: u8,

    /// Bucket derived from the score
    pub valuation: Valuation,
}

// ============================================================================
// SCORING CONFIG
// ============================================================================

/// Per-sector PE thresholds with a global fallback.
///
/// The original rule set uses one global "sector average" for every
/// instrument. Keeping the lookup behind this table lets a real sector-aware
/// threshold set drop in without touching the scoring algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorPeTable {
    pub default_threshold: f64,
    pub by_sector: HashMap<String, f64>,
}

impl SectorPeTable {
    pub fn global(threshold: f64) -> Self {
        SectorPeTable {
            default_threshold: threshold,
            by_sector: HashMap::new(),
        }
    }

    pub fn set(&mut self, sector: &str, threshold: f64) {
        self.by_sector.insert(sector.to_string(), threshold);
    }

    /// Threshold for a sector, falling back to the global default.
    pub fn threshold_for(&self, sector: Option<&str>) -> f64 {
        sector
            .and_then(|s| self.by_sector.get(s).copied())
            .unwrap_or(self.default_threshold)
    }
}

impl Default for SectorPeTable {
    fn default() -> Self {
        SectorPeTable::global(SECTOR_PE_AVG)
    }
}

/// Thresholds and label cutoffs for the scorer.
///
/// The label cutoffs (7/4) predate the current weight table (max 9); they are
/// configuration values rather than literals so they can be recalibrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub sector_pe: SectorPeTable,
    pub pb_max: f64,
    pub roe_min: f64,
    pub debt_equity_max: f64,
    pub revenue_growth_min: f64,
    pub profit_margin_min: f64,

    /// score >= undervalued_cutoff → Undervalued
    pub undervalued_cutoff: u8,

    /// undervalued_cutoff > score >= neutral_cutoff → Neutral, below → Overvalued
    pub neutral_cutoff: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            sector_pe: SectorPeTable::default(),
            pb_max: 3.0,
            roe_min: 0.15,
            debt_equity_max: 0.5,
            revenue_growth_min: 0.10,
            profit_margin_min: 0.10,
            undervalued_cutoff: 7,
            neutral_cutoff: 4,
        }
    }
}

impl ScoringConfig {
    /// Score a record against this config. Total function - never fails, a
    /// fully-empty record scores 0 / Overvalued.
    ///
    /// Each rule fires only when its metric is reported (present and
    /// non-zero) and passes a strict `<`/`>` predicate; everything else
    /// contributes nothing.
    pub fn score(&self, f: &Fundamentals, sector: Option<&str>) -> ScoreResult {
        let pe_threshold = self.sector_pe.threshold_for(sector);

        let mut score = 0u8;

        if reported(f.pe_ratio).is_some_and(|v| v < pe_threshold) {
            score += WEIGHT_PE;
        }
        if reported(f.pb_ratio).is_some_and(|v| v < self.pb_max) {
            score += WEIGHT_PB;
        }
        if reported(f.return_on_equity).is_some_and(|v| v > self.roe_min) {
            score += WEIGHT_ROE;
        }
        if reported(f.debt_to_equity).is_some_and(|v| v < self.debt_equity_max) {
            score += WEIGHT_DEBT_EQUITY;
        }
        if reported(f.revenue_growth).is_some_and(|v| v > self.revenue_growth_min) {
            score += WEIGHT_REVENUE_GROWTH;
        }
        if reported(f.profit_margin).is_some_and(|v| v > self.profit_margin_min) {
            score += WEIGHT_PROFIT_MARGIN;
        }

        ScoreResult {
            score,
            valuation: self.label(score),
        }
    }

    /// Map a raw score to its bucket. First match wins; the partition over
    /// 0..=9 is total and non-overlapping.
    pub fn label(&self, score: u8) -> Valuation {
        if score >= self.undervalued_cutoff {
            Valuation::Undervalued
        } else if score >= self.neutral_cutoff {
            Valuation::Neutral
        } else {
            Valuation::Overvalued
        }
    }
}

/// Score a record with the default config and no sector context.
pub fn score(f: &Fundamentals) -> ScoreResult {
    ScoringConfig::default().score(f, None)
}

// ============================================================================
// TESTS
// ============================================================================
