//! Session blob persistence
//!
//! The whole session state is written as one JSON blob under a fixed
//! key after every mutation and read back once at startup. The same
//! key/value scope also carries the store cache entries and the
//! language preference, so one backend instance models one browser
//! tab's storage.
//!
//! # Keys
//!
//! | Key | Value | Written by |
//! |-----|-------|------------|
//! | `session-state` | `SessionState` JSON | session service, every mutation |
//! | `language` | language tag | language preference |
//! | `stores` | store list JSON | client cache |
//! | `store:{id}` | store JSON | client cache |
//!
//! No migration versioning exists; a schema change invalidates the
//! blob and the state starts fresh.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Fixed key of the serialized session snapshot
pub const SESSION_BLOB_KEY: &str = "session-state";

/// Key of the persisted display language tag
pub const LANGUAGE_KEY: &str = "language";

/// Single key/value table holding all session-scoped blobs
const KV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// Backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Session-scoped blob storage
///
/// Implementations must behave like a plain key/value map: last write
/// wins, reads see the latest committed write.
pub trait SessionBackend: Send + Sync {
    fn load(&self, key: &str) -> BackendResult<Option<Vec<u8>>>;
    fn save(&self, key: &str, value: &[u8]) -> BackendResult<()>;
    fn remove(&self, key: &str) -> BackendResult<()>;
}

/// In-memory backend
///
/// Mirrors tab-scoped storage: contents live exactly as long as the
/// process. Default for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: parking_lot::RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, ready to hand to service and client cache
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl SessionBackend for MemoryBackend {
    fn load(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> BackendResult<()> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> BackendResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// redb-backed backend
///
/// Commits are durable as soon as `save` returns; the file is always
/// in a consistent state after a crash. Used when the host app wants
/// the session to survive a restart.
pub struct RedbBackend {
    db: Database,
}

impl RedbBackend {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        let db = Database::create(path)?;

        // Make sure the table exists before the first read
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl SessionBackend for RedbBackend {
    fn load(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;
        Ok(table.get(key)?.map(|v| v.value().to_vec()))
    }

    fn save(&self, key: &str, value: &[u8]) -> BackendResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> BackendResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
