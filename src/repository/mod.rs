//! Repository Layer
//!
//! Record store abstractions and implementations.

mod backup;
mod collection;
mod db;
mod query;
mod seed;
mod store;
mod traits;


pub use backup::{BackupData, RestoreReport, BACKUP_VERSION};
pub use collection::Collection;
pub use db::SqliteBackend;
pub use query::{Comparator, ListQuery, Predicate};
pub use seed::{builtin_fixture, load_seed, SeedSource};
pub use store::{MergeReport, RecordStore};
pub use traits::{Repository, SearchableRepository, SnapshotBackend, StoredRecord, StoredSnapshot};
