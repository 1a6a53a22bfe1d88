// NIFTY Fundamental Valuation Screener - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod db;
pub mod indices;
pub mod provider;
pub mod report;
pub mod scoring;
pub mod screener;

// Re-export commonly used types
pub use db::{
    setup_database, upsert_snapshots, get_snapshot, get_all_snapshots,
    count_snapshots, purge_stale, CachedProvider, CACHE_TTL_SECS,
};
pub use indices::{
    NseIndex, display_symbol,
    NIFTY_50, NIFTY_NEXT_50, NIFTY_101_150, NIFTY_151_250,
};
pub use provider::{
    FundamentalsProvider, StockRecord, CsvProvider, StaticProvider,
};
pub use report::{render_stock_report, write_stock_report, export_csv};
pub use scoring::{
    score, Fundamentals, ScoreResult, ScoringConfig, SectorPeTable, Valuation,
    MAX_SCORE, SECTOR_PE_AVG,
};
pub use screener::{
    run_screener, run_screener_for_index, ScoredStock, ScreenerReport, ValuationCounts,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
