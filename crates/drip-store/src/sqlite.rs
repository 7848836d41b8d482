//! SQLite implementation of the Store trait.
//!
//! This is the persistent storage backend for the Drip ledger. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.
//!
//! Amounts are `i128` and do not fit SQLite's 64-bit INTEGER, so they are
//! stored as decimal TEXT.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use drip_core::{AccountId, Amount, AssetId, Stream, StreamDraft, StreamId};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{Store, StreamFilter};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

const STREAM_COLUMNS: &str = "stream_id, sender, recipient, asset, deposit, duration,
    rate_per_second, start_time, stop_time, accumulated_elapsed, withdrawn, is_running";

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn to_sql_int(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{} out of range: {}", column, value)))
}

fn column_u64(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let raw: i64 = row.get(idx)?;
    u64::try_from(raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn column_amount(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Amount> {
    let raw: String = row.get(idx)?;
    raw.parse::<Amount>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// Helper to convert a row to Stream
fn row_to_stream(row: &rusqlite::Row<'_>) -> rusqlite::Result<Stream> {
    Ok(Stream {
        id: StreamId::new(column_u64(row, 0)?),
        sender: AccountId::new(row.get::<_, String>(1)?),
        recipient: AccountId::new(row.get::<_, String>(2)?),
        asset: AssetId::new(row.get::<_, String>(3)?),
        deposit: column_amount(row, 4)?,
        duration: column_u64(row, 5)?,
        rate_per_second: column_amount(row, 6)?,
        start_time: column_u64(row, 7)?,
        stop_time: column_u64(row, 8)?,
        accumulated_elapsed: column_u64(row, 9)?,
        withdrawn: column_amount(row, 10)?,
        is_running: row.get(11)?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_stream(&self, draft: &StreamDraft) -> Result<Stream> {
        let draft = draft.clone();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let now = now_millis();

            // Id 0 is never allocated; AUTOINCREMENT assigns the real one.
            let pending = draft.into_stream(StreamId::new(0));

            tx.execute(
                "INSERT INTO streams (
                    sender, recipient, asset, deposit, duration, rate_per_second,
                    start_time, stop_time, accumulated_elapsed, withdrawn, is_running,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    pending.sender.as_str(),
                    pending.recipient.as_str(),
                    pending.asset.as_str(),
                    pending.deposit.to_string(),
                    to_sql_int(pending.duration, "duration")?,
                    pending.rate_per_second.to_string(),
                    to_sql_int(pending.start_time, "start_time")?,
                    to_sql_int(pending.stop_time, "stop_time")?,
                    to_sql_int(pending.accumulated_elapsed, "accumulated_elapsed")?,
                    pending.withdrawn.to_string(),
                    pending.is_running,
                    now,
                    now,
                ],
            )?;

            let rowid = tx.last_insert_rowid();
            let id = u64::try_from(rowid)
                .map_err(|_| StoreError::InvalidData(format!("negative stream id {}", rowid)))?;

            tx.commit()?;
            Ok(Stream {
                id: StreamId::new(id),
                ..pending
            })
        })
        .await
    }

    async fn get_stream(&self, id: StreamId) -> Result<Option<Stream>> {
        // Ids past i64::MAX can never have been allocated.
        let Ok(raw_id) = i64::try_from(id.get()) else {
            return Ok(None);
        };

        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM streams WHERE stream_id = ?1", STREAM_COLUMNS),
                params![raw_id],
                row_to_stream,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn update_stream(&self, stream: &Stream) -> Result<()> {
        let id = stream.id;
        let raw_id = i64::try_from(id.get()).map_err(|_| StoreError::NotFound(id))?;
        let start_time = to_sql_int(stream.start_time, "start_time")?;
        let stop_time = to_sql_int(stream.stop_time, "stop_time")?;
        let accumulated = to_sql_int(stream.accumulated_elapsed, "accumulated_elapsed")?;
        let withdrawn = stream.withdrawn.to_string();
        let is_running = stream.is_running;

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE streams SET
                    start_time = ?2,
                    stop_time = ?3,
                    accumulated_elapsed = ?4,
                    withdrawn = ?5,
                    is_running = ?6,
                    updated_at = ?7
                 WHERE stream_id = ?1",
                params![
                    raw_id,
                    start_time,
                    stop_time,
                    accumulated,
                    withdrawn,
                    is_running,
                    now_millis(),
                ],
            )?;

            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_streams(&self, filter: &StreamFilter) -> Result<Vec<StreamId>> {
        let filter = filter.clone();

        self.with_conn(move |conn| {
            let (sql, arg) = match &filter {
                StreamFilter::All => (
                    "SELECT stream_id FROM streams ORDER BY stream_id",
                    None,
                ),
                StreamFilter::Sender(account) => (
                    "SELECT stream_id FROM streams WHERE sender = ?1 ORDER BY stream_id",
                    Some(account.as_str().to_string()),
                ),
                StreamFilter::Recipient(account) => (
                    "SELECT stream_id FROM streams WHERE recipient = ?1 ORDER BY stream_id",
                    Some(account.as_str().to_string()),
                ),
            };

            let mut stmt = conn.prepare(sql)?;
            let map_id = |row: &rusqlite::Row<'_>| column_u64(row, 0).map(StreamId::new);

            let ids = match arg {
                Some(account) => stmt
                    .query_map(params![account], map_id)?
                    .collect::<rusqlite::Result<Vec<_>>>()?,
                None => stmt
                    .query_map([], map_id)?
                    .collect::<rusqlite::Result<Vec<_>>>()?,
            };

            Ok(ids)
        })
        .await
    }

    async fn stream_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM streams", [], |row| row.get(0))?;
            u64::try_from(count)
                .map_err(|_| StoreError::InvalidData(format!("negative stream count {}", count)))
        })
        .await
    }
}
