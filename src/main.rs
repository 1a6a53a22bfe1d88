// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use rusqlite::Connection;
use std::env;
use std::path::Path;

// Use library instead of local modules
use nifty_valuation::{
    count_snapshots, export_csv, get_all_snapshots, run_screener, run_screener_for_index,
    setup_database, upsert_snapshots, write_stock_report, CachedProvider, CsvProvider,
    FundamentalsProvider, NseIndex, ScoringConfig,
};

const DEFAULT_DB_PATH: &str = "fundamentals.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(&args[2..])?,
        Some("screen") => run_screen(&args[2..])?,
        Some("report") => run_report(&args[2..])?,
        _ => run_ui_mode()?,
    }

    Ok(())
}

/// `import <csv> [db]` - load a fundamentals snapshot CSV into SQLite
fn run_import(args: &[String]) -> Result<()> {
    println!("🗄️  Snapshot Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let csv_path = match args.first() {
        Some(p) => Path::new(p),
        None => {
            eprintln!("Usage: nifty-valuation import <fundamentals.csv> [db]");
            std::process::exit(1);
        }
    };
    let db_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_DB_PATH);

    // 1. Load CSV
    println!("\n📂 Loading CSV...");
    let provider = CsvProvider::from_path(csv_path)?;
    println!("✓ Loaded {} snapshots from CSV", provider.len());

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    // 3. Write snapshots
    println!("\n💾 Writing snapshots...");
    let written = upsert_snapshots(&conn, &provider.all_records())?;
    println!("✓ Wrote {} snapshots", written);

    // 4. Verify count
    let count = count_snapshots(&conn)?;
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Database contains {} snapshots", count);

    Ok(())
}

struct ScreenOpts {
    db_path: String,
    index: Option<NseIndex>,
    csv_path: Option<String>,
    out_path: Option<String>,
}

fn parse_screen_opts(args: &[String]) -> ScreenOpts {
    let mut opts = ScreenOpts {
        db_path: DEFAULT_DB_PATH.to_string(),
        index: None,
        csv_path: None,
        out_path: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--index" => {
                i += 1;
                let name = args.get(i).map(String::as_str).unwrap_or("");
                match NseIndex::from_name(name) {
                    Some(index) => opts.index = Some(index),
                    None => {
                        eprintln!("❌ Unknown index: {}", name);
                        eprintln!("   Known indices:");
                        for index in NseIndex::ALL {
                            eprintln!("     {}", index.title());
                        }
                        std::process::exit(1);
                    }
                }
            }
            "--csv" => {
                i += 1;
                opts.csv_path = args.get(i).cloned();
            }
            "--out" => {
                i += 1;
                opts.out_path = args.get(i).cloned();
            }
            other => opts.db_path = other.to_string(),
        }
        i += 1;
    }

    opts
}

/// `screen [db] [--index <name>] [--csv <snapshot.csv>] [--out <table.csv>]`
/// headless ranked table + KPI counts, optionally scoped to one index
fn run_screen(args: &[String]) -> Result<()> {
    let opts = parse_screen_opts(args);

    let report = match &opts.csv_path {
        // Read-through: resolve the chosen index per symbol against the
        // snapshot cache, falling back to the CSV for misses/stale rows
        Some(csv_path) => {
            let index = opts.index.unwrap_or(NseIndex::Nifty50);
            let provider = CachedProvider::new(
                CsvProvider::from_path(csv_path)?,
                Connection::open(&opts.db_path)?,
            )?;
            let records = provider.fetch_index(index.symbols());
            println!("📋 {} - {} of {} symbols resolved\n", index.title(), records.len(), index.symbols().len());
            run_screener(records, &ScoringConfig::default())
        }
        None => {
            if let Some(index) = opts.index {
                println!("📋 {}\n", index.title());
            }
            load_report(&opts.db_path, opts.index)?
        }
    };

    let counts = report.counts();
    println!("🟢 Undervalued: {}", counts.undervalued);
    println!("🟡 Neutral:     {}", counts.neutral);
    println!("🔴 Overvalued:  {}", counts.overvalued);
    println!();
    println!("{:<14} {:<22} {:>5}  {}", "Stock", "Sector", "Score", "Valuation");
    println!("{}", "─".repeat(56));

    for row in &report.rows {
        println!(
            "{:<14} {:<22} {:>5}  {}",
            row.record.name,
            row.record.sector.as_deref().unwrap_or("-"),
            row.score,
            row.valuation
        );
    }

    if let Some(out) = &opts.out_path {
        export_csv(out, &report)?;
        println!("\n✓ Exported screener table to {}", out);
    }

    Ok(())
}

/// `report <symbol> [db]` - templated text report for one stock
fn run_report(args: &[String]) -> Result<()> {
    let symbol = match args.first() {
        Some(s) => s,
        None => {
            eprintln!("Usage: nifty-valuation report <symbol> [db]");
            std::process::exit(1);
        }
    };
    let db_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_DB_PATH);
    let report = load_report(db_path, None)?;

    match report.find(symbol) {
        Some(stock) => {
            let out = format!("{}_report.txt", nifty_valuation::display_symbol(symbol));
            write_stock_report(&out, stock)?;
            println!("✓ Report written to {}", out);
        }
        None => {
            eprintln!("❌ No snapshot for symbol: {}", symbol);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn load_report(db_path: &str, index: Option<NseIndex>) -> Result<nifty_valuation::ScreenerReport> {
    let db_path = Path::new(db_path);

    if !db_path.exists() {
        eprintln!("❌ Database not found!");
        eprintln!("   Run: cargo run import <fundamentals.csv>");
        eprintln!("   to load a snapshot first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path)?;
    let records = get_all_snapshots(&conn)?;
    let config = ScoringConfig::default();

    Ok(match index {
        Some(index) => run_screener_for_index(records, index, &config),
        None => run_screener(records, &config),
    })
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    println!("🖥️  Loading NIFTY Valuation Dashboard...\n");

    let report = load_report(DEFAULT_DB_PATH, None)?;
    println!("✓ Scored {} stocks\n", report.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(report);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin nifty-server --features server");
    std::process::exit(1);
}
