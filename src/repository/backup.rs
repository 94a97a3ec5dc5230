//! JSON backup document
//!
//! Every collection in one file. Restoring merges record by record,
//! keeping whichever copy has the later `updatedAt`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::store::MergeReport;
use crate::domain::{
    Bill, CalendarEvent, DomainError, DomainResult, Document, FamilyMember, GroceryItem, StaffMember,
    Transaction, Vehicle,
};

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub groceries: Vec<GroceryItem>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub family: Vec<FamilyMember>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl BackupData {
    pub fn empty(exported_at: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at,
            staff: Vec::new(),
            bills: Vec::new(),
            groceries: Vec::new(),
            events: Vec::new(),
            vehicles: Vec::new(),
            family: Vec::new(),
            documents: Vec::new(),
            transactions: Vec::new(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.staff.len()
            + self.bills.len()
            + self.groceries.len()
            + self.events.len()
            + self.vehicles.len()
            + self.family.len()
            + self.documents.len()
            + self.transactions.len()
    }

    pub fn write_to(&self, path: &Path) -> DomainResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> DomainResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let data: BackupData = serde_json::from_str(&text)?;
        if data.version > BACKUP_VERSION {
            return Err(DomainError::Conflict(format!(
                "backup version {} is newer than supported version {}",
                data.version, BACKUP_VERSION
            )));
        }
        Ok(data)
    }
}

/// Per-kind merge results of a restore
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub kinds: Vec<(String, MergeReport)>,
}

impl RestoreReport {
    pub fn push(&mut self, kind: &str, report: MergeReport) {
        self.kinds.push((kind.to_string(), report));
    }

    pub fn total(&self) -> MergeReport {
        let mut total = MergeReport::default();
        for (_, report) in &self.kinds {
            total.absorb(*report);
        }
        total
    }

    pub fn get(&self, kind: &str) -> Option<MergeReport> {
        self.kinds.iter().find(|(k, _)| k == kind).map(|(_, r)| *r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_roundtrip_and_missing_sections() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("backup.json");
        let at = Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap();

        BackupData::empty(at).write_to(&path).expect("Write failed");
        let back = BackupData::read_from(&path).expect("Read failed");
        assert_eq!(back.exported_at, at);
        assert_eq!(back.record_count(), 0);

        std::fs::write(&path, r#"{"version":1,"exportedAt":"2025-07-01T08:00:00Z"}"#).expect("write");
        assert_eq!(BackupData::read_from(&path).expect("Read failed").record_count(), 0);
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("backup.json");
        std::fs::write(&path, r#"{"version":99,"exportedAt":"2025-07-01T08:00:00Z"}"#).expect("write");
        assert!(matches!(BackupData::read_from(&path), Err(DomainError::Conflict(_))));
    }
}
