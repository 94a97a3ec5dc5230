//! List query builder
//!
//! A query is an optional predicate plus an optional comparator. Both are
//! evaluated against derived copies, so a filter on a read-time field such
//! as a bill's effective status behaves like any other filter.

use std::cmp::Ordering;

pub type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'a>;
pub type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync + 'a>;

pub struct ListQuery<'a, T> {
    filter: Option<Predicate<'a, T>>,
    sort: Option<Comparator<'a, T>>,
}

impl<'a, T: 'a> ListQuery<'a, T> {
    /// No filter, collection order
    pub fn all() -> Self {
        Self {
            filter: None,
            sort: None,
        }
    }

    /// Add a predicate. Repeated calls are combined with AND.
    pub fn filter<F>(mut self, keep: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'a,
    {
        let combined: Predicate<'a, T> = match self.filter.take() {
            Some(prev) => Box::new(move |r: &T| prev(r) && keep(r)),
            None => Box::new(keep),
        };
        self.filter = Some(combined);
        self
    }

    /// Set the comparator; the sort is stable
    pub fn sort_by<C>(mut self, cmp: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'a,
    {
        let cmp: Comparator<'a, T> = Box::new(cmp);
        self.sort = Some(cmp);
        self
    }

    pub fn accepts(&self, record: &T) -> bool {
        self.filter.as_ref().map(|keep| keep(record)).unwrap_or(true)
    }

    /// Filter then sort an owned sequence
    pub fn apply(&self, records: Vec<T>) -> Vec<T> {
        let mut out: Vec<T> = records.into_iter().filter(|r| self.accepts(r)).collect();
        if let Some(cmp) = &self.sort {
            out.sort_by(|a, b| cmp(a, b));
        }
        out
    }
}

impl<'a, T: 'a> Default for ListQuery<'a, T> {
    fn default() -> Self {
        Self::all()
    }
}
