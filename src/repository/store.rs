//! In-memory record store
//!
//! One ordered collection per entity type, newest first. Every mutation is
//! staged on a copy of the target record and committed only after the copy
//! validates, so a failed call never leaves a partial change behind.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use super::query::ListQuery;
use super::traits::{Repository, SearchableRepository};
use crate::domain::{Clock, DomainError, DomainResult, Entity, RecordMeta, Searchable};

/// Outcome of merging foreign records into a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub inserted: usize,
    pub replaced: usize,
    /// Incoming record was not newer than the stored one
    pub skipped: usize,
}

impl MergeReport {
    pub fn absorb(&mut self, other: MergeReport) {
        self.inserted += other.inserted;
        self.replaced += other.replaced;
        self.skipped += other.skipped;
    }
}

#[derive(Clone)]
pub struct RecordStore<T: Entity> {
    records: Vec<T>,
    next_seq: u64,
    clock: Arc<dyn Clock>,
}

impl<T: Entity> RecordStore<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Vec::new(),
            next_seq: 0,
            clock,
        }
    }

    /// Store holding `records` in the given order. Rejects duplicate ids
    /// and records that fail validation.
    pub fn seeded(clock: Arc<dyn Clock>, records: Vec<T>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id().to_string()) {
                return Err(DomainError::Conflict(format!(
                    "duplicate {} id {}",
                    T::KIND,
                    record.id()
                )));
            }
            record.validate()?;
        }
        Ok(Self {
            next_seq: highest_seq::<T>(&records),
            records,
            clock,
        })
    }

    /// Continue the id sequence from `last_seq` when it is ahead of the
    /// ids still present, so ids of deleted records are never reissued
    pub fn resume_from(mut self, last_seq: u64) -> Self {
        self.next_seq = self.next_seq.max(last_seq);
        self
    }

    /// Highest sequence number issued so far
    pub fn last_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Stored records as persisted, without derived fields
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    fn derived(&self, record: &T) -> T {
        let mut copy = record.clone();
        copy.derive(self.today());
        copy
    }

    /// Next unused `<prefix>-<n>`. Not reserved until `create` commits.
    fn peek_id(&self) -> (u64, String) {
        let mut seq = self.next_seq;
        loop {
            seq += 1;
            let id = format!("{}-{}", T::ID_PREFIX, seq);
            if !self.contains(&id) {
                return (seq, id);
            }
        }
    }

    /// Run `change` on a staged copy of one record, validate, refresh
    /// `updatedAt`, then commit. Used for nested appends (payments,
    /// service records, attendance) as well as plain updates.
    pub fn mutate<F>(&mut self, id: &str, change: F) -> DomainResult<T>
    where
        F: FnOnce(&mut T) -> DomainResult<()>,
    {
        let pos = self
            .position(id)
            .ok_or_else(|| DomainError::not_found(T::KIND, id))?;

        let mut staged = self.records[pos].clone();
        let meta = staged.meta().clone();
        change(&mut staged)?;
        // identity and creation time are fixed
        *staged.meta_mut() = meta;
        staged.validate()?;
        staged.meta_mut().touch(self.clock.now());

        self.records[pos] = staged;
        Ok(self.derived(&self.records[pos]))
    }

    /// Last-write-wins by `updatedAt`. Unknown ids go to the head in their
    /// incoming order. Nothing is applied if any incoming record is
    /// invalid or an id repeats.
    pub fn merge(&mut self, incoming: Vec<T>) -> DomainResult<MergeReport> {
        let mut seen = HashSet::with_capacity(incoming.len());
        for record in &incoming {
            if !seen.insert(record.id().to_string()) {
                return Err(DomainError::Conflict(format!(
                    "duplicate {} id {} in merge input",
                    T::KIND,
                    record.id()
                )));
            }
            record.validate()?;
        }

        let mut report = MergeReport::default();
        let mut fresh = Vec::new();
        for record in incoming {
            match self.position(record.id()) {
                Some(pos) if record.meta().updated_at > self.records[pos].meta().updated_at => {
                    self.records[pos] = record;
                    report.replaced += 1;
                }
                Some(_) => report.skipped += 1,
                None => {
                    fresh.push(record);
                    report.inserted += 1;
                }
            }
        }
        fresh.append(&mut self.records);
        self.records = fresh;
        self.next_seq = self.next_seq.max(highest_seq::<T>(&self.records));
        Ok(report)
    }

    /// Drop every record matching `doomed` (tested with derived fields
    /// computed) and return how many went
    pub fn remove_where<F>(&mut self, mut doomed: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let today = self.today();
        let before = self.records.len();
        self.records.retain(|r| {
            let mut copy = r.clone();
            copy.derive(today);
            !doomed(&copy)
        });
        before - self.records.len()
    }
}

/// Largest `n` among ids of the form `<prefix>-<n>`
fn highest_seq<T: Entity>(records: &[T]) -> u64 {
    records
        .iter()
        .filter_map(|r| {
            r.id()
                .strip_prefix(T::ID_PREFIX)
                .and_then(|rest| rest.strip_prefix('-'))
                .and_then(|n| n.parse::<u64>().ok())
        })
        .max()
        .unwrap_or(0)
}

impl<T: Entity> Repository<T> for RecordStore<T> {
    fn list(&self, query: &ListQuery<'_, T>) -> Vec<T> {
        let today = self.today();
        let derived = self
            .records
            .iter()
            .map(|r| {
                let mut copy = r.clone();
                copy.derive(today);
                copy
            })
            .collect();
        query.apply(derived)
    }

    fn get(&self, id: &str) -> Option<T> {
        self.position(id).map(|pos| self.derived(&self.records[pos]))
    }

    fn create(&mut self, draft: T::Draft) -> DomainResult<T> {
        let (seq, id) = self.peek_id();
        let record = T::from_draft(RecordMeta::new(id, self.clock.now()), draft)?;
        record.validate()?;

        self.next_seq = seq;
        self.records.insert(0, record);
        Ok(self.derived(&self.records[0]))
    }

    fn update(&mut self, id: &str, patch: T::Patch) -> DomainResult<T> {
        self.mutate(id, |record| {
            record.apply_patch(patch);
            Ok(())
        })
    }

    fn remove(&mut self, id: &str) -> DomainResult<()> {
        let pos = self
            .position(id)
            .ok_or_else(|| DomainError::not_found(T::KIND, id))?;
        // owned sub-collections live inside the record and go with it
        self.records.remove(pos);
        Ok(())
    }
}

impl<T: Searchable> SearchableRepository<T> for RecordStore<T> {
    fn search(&self, text: &str) -> Vec<T> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.list(&ListQuery::all());
        }
        self.list(&ListQuery::all().filter(move |r: &T| r.matches(&needle)))
    }
}
