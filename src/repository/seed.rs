//! Fixture seeding
//!
//! Initial records per entity type. Built-in fixtures are compiled in;
//! a directory source reads `<kind>.json` files at startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::{DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SeedSource {
    /// Bundled sample household
    #[default]
    Builtin,
    /// Start empty
    None,
    /// `<dir>/<kind>.json`; a missing file means no records for that kind
    Directory(PathBuf),
}

pub fn builtin_fixture(kind: &str) -> Option<&'static str> {
    match kind {
        "staff" => Some(include_str!("../../fixtures/staff.json")),
        "bill" => Some(include_str!("../../fixtures/bill.json")),
        "grocery" => Some(include_str!("../../fixtures/grocery.json")),
        "event" => Some(include_str!("../../fixtures/event.json")),
        "vehicle" => Some(include_str!("../../fixtures/vehicle.json")),
        "family" => Some(include_str!("../../fixtures/family.json")),
        "document" => Some(include_str!("../../fixtures/document.json")),
        "transaction" => Some(include_str!("../../fixtures/transaction.json")),
        _ => None,
    }
}

/// Decode the seed records for `T`. Validation and duplicate checks
/// happen when the records are handed to a store.
pub fn load_seed<T: Entity>(source: &SeedSource) -> DomainResult<Vec<T>> {
    match source {
        SeedSource::None => Ok(Vec::new()),
        SeedSource::Builtin => match builtin_fixture(T::KIND) {
            Some(text) => parse(text, "builtin"),
            None => {
                log::warn!("no builtin fixture for {}", T::KIND);
                Ok(Vec::new())
            }
        },
        SeedSource::Directory(dir) => {
            let path = dir.join(format!("{}.json", T::KIND));
            if !path.exists() {
                log::warn!("seed file {} not found, starting empty", path.display());
                return Ok(Vec::new());
            }
            let text = std::fs::read_to_string(&path)?;
            parse(&text, &path.display().to_string())
        }
    }
}

fn parse<T: Entity>(text: &str, origin: &str) -> DomainResult<Vec<T>> {
    serde_json::from_str(text)
        .map_err(|e| DomainError::Internal(format!("{} fixture ({}): {}", T::KIND, origin, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bill, GroceryItem, PaymentStatus};

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(
            dir.path().join("grocery.json"),
            r#"[{"id":"g1","name":"Rice","category":"Grains","quantity":5,"unit":"kg",
                "createdAt":"2025-07-01T00:00:00Z","updatedAt":"2025-07-01T00:00:00Z"}]"#,
        )
        .expect("Failed to write fixture");

        let source = SeedSource::Directory(dir.path().to_path_buf());
        let items: Vec<GroceryItem> = load_seed(&source).expect("Seed failed");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Rice");

        let bills: Vec<Bill> = load_seed(&source).expect("Seed failed");
        assert!(bills.is_empty());
    }

    #[test]
    fn test_builtin_overdue_is_normalized() {
        let bills: Vec<Bill> = load_seed(&SeedSource::Builtin).expect("Seed failed");
        let dth = bills.iter().find(|b| b.meta.id == "4").expect("DTH bill");
        assert_eq!(dth.status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_malformed_fixture_is_internal() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("bill.json"), "{not json").expect("Failed to write");
        let err = load_seed::<Bill>(&SeedSource::Directory(dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn test_source_json_shape() {
        let source: SeedSource = serde_json::from_str(r#"{"directory":"/tmp/seed"}"#).expect("decode");
        assert_eq!(source, SeedSource::Directory(PathBuf::from("/tmp/seed")));
        let source: SeedSource = serde_json::from_str(r#""none""#).expect("decode");
        assert_eq!(source, SeedSource::None);
    }
}
