//! Storage layer for the cost tracker.
//!
//! Persists deduplicated usage records with `rusqlite`, keyed by message id.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Move it into the task that owns persistence, or wrap it in a `Mutex`.
//!
//! # Replay
//!
//! Writes are idempotent. A message id is inserted once; a later write for the
//! same id only replaces the stored row while that row is still a flushed
//! partial. Re-importing the same logs never double-counts.

use std::path::Path;

use ct_core::{BranchName, TokenCounts, UsageRecord};
use rusqlite::{Connection, Row, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to create the directory holding the database file.
    #[error("cannot create database directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

const USAGE_COLUMNS: &str = "message_id, record_id, timestamp_ms, model, input_tokens, output_tokens, \
     cache_write_tokens, cache_read_tokens, cost_usd, is_background, is_partial, session_id, branch";

impl Database {
    /// Opens a database at the given path, creating it and its parent directory if necessary.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the schema. Idempotent.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- One row per billable model invocation.
            -- timestamp_ms: unix epoch milliseconds
            -- is_partial: 1 when built from a streaming frame that never finished
            CREATE TABLE IF NOT EXISTS usage_records (
                message_id TEXT PRIMARY KEY,
                record_id TEXT,
                timestamp_ms INTEGER NOT NULL,
                model TEXT NOT NULL,
                input_tokens INTEGER NOT NULL DEFAULT 0,
                output_tokens INTEGER NOT NULL DEFAULT 0,
                cache_write_tokens INTEGER NOT NULL DEFAULT 0,
                cache_read_tokens INTEGER NOT NULL DEFAULT 0,
                cost_usd REAL NOT NULL DEFAULT 0,
                is_background INTEGER NOT NULL DEFAULT 0,
                is_partial INTEGER NOT NULL DEFAULT 0,
                session_id TEXT NOT NULL DEFAULT '',
                branch TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_usage_branch ON usage_records(branch);
            CREATE INDEX IF NOT EXISTS idx_usage_timestamp ON usage_records(timestamp_ms);
            ",
        )?;
        Ok(())
    }

    /// Stores usage records, returning how many rows were inserted or replaced.
    ///
    /// Existing complete rows are left untouched.
    pub fn upsert_usage(&mut self, records: &[UsageRecord]) -> Result<usize, DbError> {
        if records.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "
                INSERT INTO usage_records ({USAGE_COLUMNS})
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(message_id) DO UPDATE SET
                    record_id = excluded.record_id,
                    timestamp_ms = excluded.timestamp_ms,
                    model = excluded.model,
                    input_tokens = excluded.input_tokens,
                    output_tokens = excluded.output_tokens,
                    cache_write_tokens = excluded.cache_write_tokens,
                    cache_read_tokens = excluded.cache_read_tokens,
                    cost_usd = excluded.cost_usd,
                    is_background = excluded.is_background,
                    is_partial = excluded.is_partial,
                    session_id = excluded.session_id,
                    branch = excluded.branch
                WHERE usage_records.is_partial = 1
                "
            ))?;
            for record in records {
                written += stmt.execute(params![
                    record.message_id,
                    record.record_id,
                    record.timestamp,
                    record.model,
                    to_sql_int(record.tokens.input),
                    to_sql_int(record.tokens.output),
                    to_sql_int(record.tokens.cache_write),
                    to_sql_int(record.tokens.cache_read),
                    record.cost_usd,
                    record.is_background,
                    record.is_partial,
                    record.session_id,
                    record.branch_name.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(offered = records.len(), written, "persisted usage records");
        Ok(written)
    }

    /// Lists usage for one branch, oldest first.
    pub fn usage_for_branch(&self, branch: &BranchName) -> Result<Vec<UsageRecord>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {USAGE_COLUMNS}
            FROM usage_records
            WHERE branch = ?
            ORDER BY timestamp_ms ASC, message_id ASC
            "
        ))?;
        let rows = stmt.query_map([branch.as_str()], usage_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Lists all usage, oldest first.
    pub fn all_usage(&self) -> Result<Vec<UsageRecord>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {USAGE_COLUMNS}
            FROM usage_records
            ORDER BY timestamp_ms ASC, message_id ASC
            "
        ))?;
        let rows = stmt.query_map([], usage_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Distinct branches with persisted usage, sorted.
    pub fn branches(&self) -> Result<Vec<BranchName>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT branch FROM usage_records ORDER BY branch ASC")?;
        let rows = stmt.query_map([], |row| {
            let name: String = row.get(0)?;
            Ok(BranchName::or_unknown(Some(&name)))
        })?;
        let mut branches = Vec::new();
        for row in rows {
            branches.push(row?);
        }
        Ok(branches)
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_int(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn usage_from_row(row: &Row<'_>) -> rusqlite::Result<UsageRecord> {
    let branch: String = row.get(12)?;
    Ok(UsageRecord {
        message_id: row.get(0)?,
        record_id: row.get(1)?,
        timestamp: row.get(2)?,
        model: row.get(3)?,
        tokens: TokenCounts {
            input: from_sql_int(row.get(4)?),
            output: from_sql_int(row.get(5)?),
            cache_write: from_sql_int(row.get(6)?),
            cache_read: from_sql_int(row.get(7)?),
        },
        cost_usd: row.get(8)?,
        is_background: row.get(9)?,
        is_partial: row.get(10)?,
        session_id: row.get(11)?,
        branch_name: BranchName::or_unknown(Some(&branch)),
    })
}
