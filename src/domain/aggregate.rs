//! Aggregates for summary views
//!
//! Pure functions over a list snapshot; nothing here touches a store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Total of `field` over the records accepted by `predicate`
pub fn sum<T, F, P>(records: &[T], field: F, predicate: Option<P>) -> f64
where
    F: Fn(&T) -> f64,
    P: Fn(&T) -> bool,
{
    match predicate {
        Some(keep) => records.iter().filter(|r| keep(*r)).map(&field).sum(),
        None => records.iter().map(&field).sum(),
    }
}

/// Group records by key, preserving input order inside each group
pub fn group_by<T, K, F>(records: &[T], key: F) -> BTreeMap<K, Vec<T>>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record.clone());
    }
    groups
}

/// Per-key totals sorted by amount, largest first
pub fn totals_by<T, K, F, V>(records: &[T], key: F, value: V) -> Vec<(K, f64)>
where
    K: Ord,
    F: Fn(&T) -> K,
    V: Fn(&T) -> f64,
{
    let mut totals: BTreeMap<K, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(key(record)).or_insert(0.0) += value(record);
    }
    let mut out: Vec<(K, f64)> = totals.into_iter().collect();
    out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    out
}

/// Ascending order with `None` after every `Some`
pub fn cmp_nulls_last<K: Ord>(a: Option<&K>, b: Option<&K>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
