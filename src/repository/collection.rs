//! Shared collection handle
//!
//! Wraps one `RecordStore` per entity type behind a single async mutex so
//! mutations never interleave. Each mutation runs on a staged copy of the
//! store; the copy is written to the snapshot backend (when there is one)
//! and only then swapped in. A failed write or a dropped call leaves the
//! in-memory state untouched.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::query::ListQuery;
use super::store::{MergeReport, RecordStore};
use super::traits::{Repository, SearchableRepository, SnapshotBackend, StoredRecord, StoredSnapshot};
use crate::domain::{Clock, DomainError, DomainResult, Entity, Searchable};

pub struct Collection<T: Entity> {
    store: Mutex<RecordStore<T>>,
    backend: Option<Arc<dyn SnapshotBackend>>,
}

impl<T: Entity> Collection<T> {
    /// Memory-only collection
    pub fn in_memory(store: RecordStore<T>) -> Self {
        Self {
            store: Mutex::new(store),
            backend: None,
        }
    }

    /// Load the persisted snapshot for `T`. The first time a kind is
    /// opened, `seed` is validated and written through instead.
    pub async fn open(
        backend: Arc<dyn SnapshotBackend>,
        clock: Arc<dyn Clock>,
        seed: Vec<T>,
    ) -> DomainResult<Self> {
        let store = match backend.load(T::KIND).await? {
            Some(snapshot) => {
                let records = decode(&snapshot.records)?;
                log::info!("[{}] loaded {} records", T::KIND, records.len());
                RecordStore::seeded(clock, records)?.resume_from(snapshot.last_seq)
            }
            None => {
                let store = RecordStore::seeded(clock, seed)?;
                backend.replace_all(T::KIND, encode(&store)?).await?;
                log::info!("[{}] seeded {} records", T::KIND, store.len());
                store
            }
        };

        Ok(Self {
            store: Mutex::new(store),
            backend: Some(backend),
        })
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn list(&self, query: &ListQuery<'_, T>) -> Vec<T> {
        self.store.lock().await.list(query)
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.store.lock().await.get(id)
    }

    pub async fn find(&self, id: &str) -> DomainResult<T> {
        self.store.lock().await.find(id)
    }

    /// Every record in collection order, derived fields computed
    pub async fn export(&self) -> Vec<T> {
        self.store.lock().await.list(&ListQuery::all())
    }

    pub async fn create(&self, draft: T::Draft) -> DomainResult<T> {
        self.commit("create", move |store| store.create(draft)).await
    }

    pub async fn update(&self, id: &str, patch: T::Patch) -> DomainResult<T> {
        self.commit("update", move |store| store.update(id, patch)).await
    }

    /// Arbitrary staged change to one record; see `RecordStore::mutate`
    pub async fn mutate<F>(&self, id: &str, change: F) -> DomainResult<T>
    where
        F: FnOnce(&mut T) -> DomainResult<()> + Send,
    {
        self.commit("mutate", move |store| store.mutate(id, change)).await
    }

    pub async fn remove(&self, id: &str) -> DomainResult<()> {
        self.commit("remove", move |store| store.remove(id)).await
    }

    /// Remove every record matching `doomed` in one commit
    pub async fn remove_where<F>(&self, doomed: F) -> DomainResult<usize>
    where
        F: FnMut(&T) -> bool + Send,
    {
        self.commit("remove_where", move |store| Ok(store.remove_where(doomed)))
            .await
    }

    pub async fn merge(&self, records: Vec<T>) -> DomainResult<MergeReport> {
        self.commit("merge", move |store| store.merge(records)).await
    }

    async fn commit<R, F>(&self, op: &str, apply: F) -> DomainResult<R>
    where
        R: Send,
        F: FnOnce(&mut RecordStore<T>) -> DomainResult<R> + Send,
    {
        let mut guard = self.store.lock().await;
        let mut staged = (*guard).clone();

        let out = match apply(&mut staged) {
            Ok(out) => out,
            Err(e) => {
                log::warn!("[{}] {} rejected: {}", T::KIND, op, e);
                return Err(e);
            }
        };

        if let Some(backend) = &self.backend {
            let snapshot = encode(&staged)?;
            if let Err(e) = backend.replace_all(T::KIND, snapshot).await {
                log::error!("[{}] {} not persisted: {}", T::KIND, op, e);
                return Err(e);
            }
        }

        *guard = staged;
        log::debug!("[{}] {} committed", T::KIND, op);
        Ok(out)
    }
}

impl<T: Searchable> Collection<T> {
    pub async fn search(&self, text: &str) -> Vec<T> {
        self.store.lock().await.search(text)
    }
}

fn encode<T: Entity>(store: &RecordStore<T>) -> DomainResult<StoredSnapshot> {
    let records = store
        .records()
        .iter()
        .map(|r| -> DomainResult<StoredRecord> {
            Ok(StoredRecord {
                id: r.id().to_string(),
                updated_at: r.meta().updated_at.to_rfc3339(),
                body: serde_json::to_string(r)?,
            })
        })
        .collect::<DomainResult<Vec<_>>>()?;
    Ok(StoredSnapshot {
        records,
        last_seq: store.last_seq(),
    })
}

fn decode<T: Entity>(rows: &[StoredRecord]) -> DomainResult<Vec<T>> {
    rows.iter()
        .map(|row| {
            serde_json::from_str(&row.body).map_err(|e| {
                DomainError::Internal(format!("corrupt {} record {}: {}", T::KIND, row.id, e))
            })
        })
        .collect()
}
