//! Repository Layer - Core Traits
//!
//! `Repository` is the synchronous record-store contract every screen
//! relies on. `SnapshotBackend` is the async persistence seam underneath
//! it; implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;

use super::query::ListQuery;
use crate::domain::{DomainError, DomainResult, Entity, Searchable};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type. Operations complete without suspension.
pub trait Repository<T: Entity> {
    /// Filtered, sorted copies with derived fields computed
    fn list(&self, query: &ListQuery<'_, T>) -> Vec<T>;

    /// `None` when the id is unknown
    fn get(&self, id: &str) -> Option<T>;

    /// Validate, assign an id and timestamps, insert at the head
    fn create(&mut self, draft: T::Draft) -> DomainResult<T>;

    /// Merge a partial update into an existing record
    fn update(&mut self, id: &str, patch: T::Patch) -> DomainResult<T>;

    /// Delete a record together with everything it owns
    fn remove(&mut self, id: &str) -> DomainResult<()>;

    /// Like `get`, but reports a missing id as `NotFound`
    fn find(&self, id: &str) -> DomainResult<T> {
        self.get(id)
            .ok_or_else(|| DomainError::not_found(T::KIND, id))
    }
}

/// Extension for repositories that support text search
pub trait SearchableRepository<T: Searchable>: Repository<T> {
    /// Case-insensitive substring search; empty text matches everything
    fn search(&self, text: &str) -> Vec<T>;
}

/// One persisted record, already encoded
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    /// RFC 3339
    pub updated_at: String,
    /// JSON body
    pub body: String,
}

/// Everything persisted for one kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredSnapshot {
    /// Collection order, newest first
    pub records: Vec<StoredRecord>,
    /// Highest id sequence ever issued, deleted records included
    pub last_seq: u64,
}

/// Durable storage for collection snapshots
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// `None` when the kind has never been written, as opposed to
    /// written and emptied.
    async fn load(&self, kind: &str) -> DomainResult<Option<StoredSnapshot>>;

    /// Atomically replace every record of one kind
    async fn replace_all(&self, kind: &str, snapshot: StoredSnapshot) -> DomainResult<()>;
}
