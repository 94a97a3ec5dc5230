//! SQLite Snapshot Backend
//!
//! One row per record, keyed by (kind, id). A kind's rows are replaced
//! inside a single transaction. The `collections` table remembers which
//! kinds have been written so an emptied collection is not re-seeded.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::traits::{SnapshotBackend, StoredRecord, StoredSnapshot};
use crate::domain::{DomainError, DomainResult};

/// Schema steps, applied in order; `PRAGMA user_version` is the index of
/// the last applied step
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS records (
        kind TEXT NOT NULL,
        id TEXT NOT NULL,
        seq INTEGER NOT NULL,
        body TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (kind, id)
    );
    CREATE INDEX IF NOT EXISTS idx_records_kind_seq ON records(kind, seq);",
    "CREATE TABLE IF NOT EXISTS collections (
        kind TEXT PRIMARY KEY,
        written_at TEXT NOT NULL
    );
    INSERT OR IGNORE INTO collections (kind, written_at)
        SELECT DISTINCT kind, datetime('now') FROM records;",
    "ALTER TABLE collections ADD COLUMN last_seq INTEGER NOT NULL DEFAULT 0;",
];

fn internal(e: rusqlite::Error) -> DomainError {
    DomainError::Internal(e.to_string())
}

pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open (or create) the database file and bring its schema up to date.
    /// `:memory:` gives a private in-memory database.
    pub fn open(path: &Path) -> DomainResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(internal)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> DomainResult<Self> {
        let conn = Connection::open_in_memory().map_err(internal)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> DomainResult<Self> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of stored rows for a kind
    pub async fn count(&self, kind: &str) -> DomainResult<usize> {
        let conn = self.conn.lock().await;
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE kind = ?1",
                params![kind],
                |row| row.get(0),
            )
            .map_err(internal)?;
        Ok(n as usize)
    }
}

fn schema_version(conn: &Connection) -> DomainResult<usize> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(internal)?;
    Ok(version.max(0) as usize)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    let current = schema_version(conn)?;
    for (index, step) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = index + 1;
        conn.execute_batch(&format!("BEGIN; {} PRAGMA user_version = {}; COMMIT;", step, version))
            .map_err(|e| DomainError::Internal(format!("migration {} failed: {}", version, e)))?;
        log::info!("database schema migrated to version {}", version);
    }
    Ok(())
}

#[async_trait]
impl SnapshotBackend for SqliteBackend {
    async fn load(&self, kind: &str) -> DomainResult<Option<StoredSnapshot>> {
        let conn = self.conn.lock().await;

        let last_seq: Option<i64> = conn
            .query_row(
                "SELECT last_seq FROM collections WHERE kind = ?1",
                params![kind],
                |row| row.get(0),
            )
            .optional()
            .map_err(internal)?;
        let Some(last_seq) = last_seq else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT id, updated_at, body FROM records WHERE kind = ?1 ORDER BY seq ASC")
            .map_err(internal)?;
        let rows = stmt
            .query_map(params![kind], |row| {
                Ok(StoredRecord {
                    id: row.get(0)?,
                    updated_at: row.get(1)?,
                    body: row.get(2)?,
                })
            })
            .map_err(internal)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(internal)?);
        }
        Ok(Some(StoredSnapshot {
            records,
            last_seq: last_seq.max(0) as u64,
        }))
    }

    async fn replace_all(&self, kind: &str, snapshot: StoredSnapshot) -> DomainResult<()> {
        let StoredSnapshot { records, last_seq } = snapshot;
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(internal)?;

        tx.execute("DELETE FROM records WHERE kind = ?1", params![kind])
            .map_err(internal)?;
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO records (kind, id, seq, body, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(internal)?;
            for (seq, record) in records.iter().enumerate() {
                insert
                    .execute(params![kind, record.id, seq as i64, record.body, record.updated_at])
                    .map_err(internal)?;
            }
        }
        tx.execute(
            "INSERT INTO collections (kind, written_at, last_seq) VALUES (?1, datetime('now'), ?2)
             ON CONFLICT(kind) DO UPDATE SET written_at = excluded.written_at, last_seq = excluded.last_seq",
            params![kind, last_seq as i64],
        )
        .map_err(internal)?;

        tx.commit().map_err(internal)?;
        log::debug!("[{}] wrote {} rows", kind, records.len());
        Ok(())
    }
}
