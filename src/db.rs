// 🗄️ Snapshot Cache - Fundamentals in SQLite with a 24h TTL
// Provider responses are cached per symbol; stale rows are refetched

use crate::provider::{FundamentalsProvider, StockRecord};
use crate::scoring::Fundamentals;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

/// Default cache lifetime: one trading day (86400s in the original).
pub const CACHE_TTL_SECS: i64 = 86_400;

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS fundamentals (
            symbol TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            sector TEXT,
            price REAL,
            pe_ratio REAL,
            pb_ratio REAL,
            return_on_equity REAL,
            debt_to_equity REAL,
            revenue_growth REAL,
            profit_margin REAL,
            fetched_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_fundamentals_sector ON fundamentals(sector)",
        [],
    )?;

    Ok(())
}

/// Insert or refresh a batch of snapshots. A re-fetched symbol replaces its
/// previous row and gets a fresh timestamp.
pub fn upsert_snapshots(conn: &Connection, records: &[StockRecord]) -> Result<usize> {
    let fetched_at = Utc::now().to_rfc3339();
    let mut written = 0;

    for record in records {
        conn.execute(
            "INSERT OR REPLACE INTO fundamentals (
                symbol, name, sector, price,
                pe_ratio, pb_ratio, return_on_equity,
                debt_to_equity, revenue_growth, profit_margin,
                fetched_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.symbol,
                record.name,
                record.sector,
                record.price,
                record.fundamentals.pe_ratio,
                record.fundamentals.pb_ratio,
                record.fundamentals.return_on_equity,
                record.fundamentals.debt_to_equity,
                record.fundamentals.revenue_growth,
                record.fundamentals.profit_margin,
                fetched_at,
            ],
        )?;
        written += 1;
    }

    Ok(written)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(StockRecord, String)> {
    let record = StockRecord {
        symbol: row.get(0)?,
        name: row.get(1)?,
        sector: row.get(2)?,
        price: row.get(3)?,
        fundamentals: Fundamentals {
            pe_ratio: row.get(4)?,
            pb_ratio: row.get(5)?,
            return_on_equity: row.get(6)?,
            debt_to_equity: row.get(7)?,
            revenue_growth: row.get(8)?,
            profit_margin: row.get(9)?,
        },
    };
    let fetched_at: String = row.get(10)?;
    Ok((record, fetched_at))
}

const SELECT_COLUMNS: &str = "symbol, name, sector, price, pe_ratio, pb_ratio, \
     return_on_equity, debt_to_equity, revenue_growth, profit_margin, fetched_at";

/// Fetch one snapshot if present and younger than `max_age`.
pub fn get_snapshot(conn: &Connection, symbol: &str, max_age: Duration) -> Result<Option<StockRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM fundamentals WHERE symbol = ?1",
        SELECT_COLUMNS
    ))?;

    let mut rows = stmt.query_map(params![symbol], row_to_record)?;

    match rows.next() {
        Some(row) => {
            let (record, fetched_at) = row?;
            let fetched_at: DateTime<Utc> = fetched_at
                .parse()
                .with_context(|| format!("Bad fetched_at timestamp for {}", symbol))?;

            if Utc::now() - fetched_at <= max_age {
                Ok(Some(record))
            } else {
                Ok(None)
            }
        }
        None => Ok(None),
    }
}

/// All cached snapshots regardless of age, symbol order.
pub fn get_all_snapshots(conn: &Connection) -> Result<Vec<StockRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM fundamentals ORDER BY symbol",
        SELECT_COLUMNS
    ))?;

    let records = stmt
        .query_map([], row_to_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(records.into_iter().map(|(record, _)| record).collect())
}

pub fn count_snapshots(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM fundamentals", [], |row| row.get(0))?;
    Ok(count)
}

/// Delete rows older than `max_age`. Returns the number removed.
pub fn purge_stale(conn: &Connection, max_age: Duration) -> Result<usize> {
    let cutoff = (Utc::now() - max_age).to_rfc3339();
    let removed = conn.execute("DELETE FROM fundamentals WHERE fetched_at < ?1", params![cutoff])?;
    Ok(removed)
}

// ============================================================================
// CACHED PROVIDER
// ============================================================================

/// Wraps any provider with the SQLite cache. Fresh rows are served from the
/// database; misses and stale rows go to the inner provider and are written
/// back.
pub struct CachedProvider<P: FundamentalsProvider> {
    inner: P,
    conn: Connection,
    max_age: Duration,
}

impl<P: FundamentalsProvider> CachedProvider<P> {
    pub fn new(inner: P, conn: Connection) -> Result<Self> {
        Self::with_ttl(inner, conn, Duration::seconds(CACHE_TTL_SECS))
    }

    pub fn with_ttl(inner: P, conn: Connection, max_age: Duration) -> Result<Self> {
        setup_database(&conn)?;
        Ok(CachedProvider { inner, conn, max_age })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl<P: FundamentalsProvider> FundamentalsProvider for CachedProvider<P> {
    fn fetch(&self, symbol: &str) -> Result<StockRecord> {
        if let Some(cached) = get_snapshot(&self.conn, symbol, self.max_age)? {
            return Ok(cached);
        }

        let record = self.inner.fetch(symbol)?;
        upsert_snapshots(&self.conn, std::slice::from_ref(&record))?;
        Ok(record)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;

    fn record(symbol: &str, pe: f64) -> StockRecord {
        StockRecord::new(
            symbol,
            Fundamentals {
                pe_ratio: Some(pe),
                ..Fundamentals::default()
            },
        )
    }

    fn open_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_upsert_and_read_back() {
        let conn = open_db();

        let records = vec![record("RELIANCE.NS", 24.0), record("TCS.NS", 29.5)];
        assert_eq!(upsert_snapshots(&conn, &records).unwrap(), 2);
        assert_eq!(count_snapshots(&conn).unwrap(), 2);

        let fetched = get_snapshot(&conn, "RELIANCE.NS", Duration::seconds(CACHE_TTL_SECS))
            .unwrap()
            .unwrap();
        assert_eq!(fetched.fundamentals.pe_ratio, Some(24.0));
        assert_eq!(fetched.name, "RELIANCE");
    }

    #[test]
    fn test_upsert_replaces_existing_symbol() {
        let conn = open_db();

        upsert_snapshots(&conn, &[record("TCS.NS", 29.5)]).unwrap();
        upsert_snapshots(&conn, &[record("TCS.NS", 31.0)]).unwrap();

        assert_eq!(count_snapshots(&conn).unwrap(), 1);
        let fetched = get_snapshot(&conn, "TCS.NS", Duration::seconds(CACHE_TTL_SECS))
            .unwrap()
            .unwrap();
        assert_eq!(fetched.fundamentals.pe_ratio, Some(31.0));
    }

    #[test]
    fn test_stale_snapshot_is_not_served() {
        let conn = open_db();
        upsert_snapshots(&conn, &[record("INFY.NS", 22.0)]).unwrap();

        // Zero TTL: everything already written counts as stale
        let stale = get_snapshot(&conn, "INFY.NS", Duration::seconds(-1)).unwrap();
        assert!(stale.is_none());

        let fresh = get_snapshot(&conn, "INFY.NS", Duration::hours(1)).unwrap();
        assert!(fresh.is_some());
    }

    #[test]
    fn test_get_all_snapshots_sorted_by_symbol() {
        let conn = open_db();
        upsert_snapshots(&conn, &[record("TCS.NS", 29.5), record("INFY.NS", 22.0)]).unwrap();

        let all = get_all_snapshots(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].symbol, "INFY.NS");
        assert_eq!(all[1].symbol, "TCS.NS");
    }

    #[test]
    fn test_purge_stale() {
        let conn = open_db();
        upsert_snapshots(&conn, &[record("SBIN.NS", 9.8)]).unwrap();

        assert_eq!(purge_stale(&conn, Duration::hours(1)).unwrap(), 0);
        assert_eq!(purge_stale(&conn, Duration::seconds(-1)).unwrap(), 1);
        assert_eq!(count_snapshots(&conn).unwrap(), 0);
    }

    #[test]
    fn test_cached_provider_writes_through() {
        let provider = StaticProvider::new(vec![record("HDFCBANK.NS", 18.2)]);
        let cached = CachedProvider::new(provider, Connection::open_in_memory().unwrap()).unwrap();

        // Miss goes to the inner provider and lands in the cache
        let fetched = cached.fetch("HDFCBANK.NS").unwrap();
        assert_eq!(fetched.fundamentals.pe_ratio, Some(18.2));
        assert_eq!(count_snapshots(cached.connection()).unwrap(), 1);

        // Unknown symbols still fail
        assert!(cached.fetch("MISSING.NS").is_err());
    }

    #[test]
    fn test_cached_provider_serves_from_cache() {
        // Inner provider is empty, but the cache has a fresh row
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        upsert_snapshots(&conn, &[record("ITC.NS", 27.0)]).unwrap();

        let cached = CachedProvider::new(StaticProvider::new(vec![]), conn).unwrap();
        let fetched = cached.fetch("ITC.NS").unwrap();
        assert_eq!(fetched.fundamentals.pe_ratio, Some(27.0));
    }

    #[test]
    fn test_sparse_record_survives_round_trip() {
        let conn = open_db();
        let sparse = StockRecord::new("SPARSE.NS", Fundamentals::default());
        upsert_snapshots(&conn, &[sparse.clone()]).unwrap();

        let fetched = get_snapshot(&conn, "SPARSE.NS", Duration::hours(1))
            .unwrap()
            .unwrap();
        assert_eq!(fetched, sparse);
    }
}
