use std::path::Path;

use rusqlite::{params, Connection};

use crate::collector::extract::PricePoint;
use crate::error::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS crypto_prices (
    id INTEGER PRIMARY KEY,
    symbol TEXT,
    timestamp TEXT,
    value REAL,
    UNIQUE(symbol, timestamp)
);
CREATE TABLE IF NOT EXISTS blacklist (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol VARCHAR(255) UNIQUE NOT NULL
);
";

/// One persisted price row, as read back for export.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub symbol: String,
    pub timestamp: String,
    pub value: f64,
}

/// SQLite-backed storage for curated prices and the symbol blacklist.
///
/// All writes go through a single `Store`, so the connection never needs
/// to be shared across tasks.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// In-memory database with the same schema, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert a batch of curated points in one transaction.
    ///
    /// Re-inserting an existing `(symbol, timestamp)` pair is silently
    /// absorbed; any real failure rolls the whole batch back.
    pub fn insert_prices(&mut self, points: &[PricePoint]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO crypto_prices (symbol, timestamp, value) VALUES (?1, ?2, ?3)",
            )?;
            for point in points {
                stmt.execute(params![point.symbol, point.date, point.value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn add_to_blacklist(&self, symbol: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO blacklist (symbol) VALUES (?1)",
            params![symbol],
        )?;
        Ok(())
    }

    pub fn is_blacklisted(&self, symbol: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM blacklist WHERE symbol = ?1",
            params![symbol],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn clear_blacklist(&self) -> Result<()> {
        self.conn.execute("DELETE FROM blacklist", [])?;
        Ok(())
    }

    /// Every stored price row, ordered by symbol then date.
    pub fn all_prices(&self) -> Result<Vec<PriceRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT symbol, timestamp, value FROM crypto_prices ORDER BY symbol, timestamp")?;
        let rows = stmt.query_map([], |row| {
            Ok(PriceRow {
                symbol: row.get(0)?,
                timestamp: row.get(1)?,
                value: row.get(2)?,
            })
        })?;

        let mut prices = Vec::new();
        for row in rows {
            prices.push(row?);
        }
        Ok(prices)
    }
}
