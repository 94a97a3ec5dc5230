//! Domain Layer - Core Entity Trait
//!
//! Every household record (bill, grocery item, vehicle, ...) implements
//! `Entity`. The trait ties a record to its create input (`Draft`), its
//! partial update input (`Patch`) and its validation rules, so one generic
//! store can serve every screen.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Identity and timestamps shared by every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    /// Fresh metadata with both timestamps set to `now`
    pub fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`. Always moves strictly forward, even when the
    /// clock has not ticked since the previous mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Core trait for all domain entities
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Input for `create`
    type Draft: Send;
    /// Input for `update`; `None` fields are left untouched
    type Patch: Send;

    /// Collection name, used for persistence and error messages
    const KIND: &'static str;
    /// Prefix of generated identifiers
    const ID_PREFIX: &'static str;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Build a record from create input. Fails only when a required value
    /// is absent; range checks happen in `validate`.
    fn from_draft(meta: RecordMeta, draft: Self::Draft) -> DomainResult<Self>;

    /// Merge a patch into the record
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Check required fields and numeric ranges
    fn validate(&self) -> DomainResult<()>;

    /// Recompute read-time derived fields. Called on every copy handed out
    /// by the store, never on the stored record.
    fn derive(&mut self, _today: NaiveDate) {}

    fn id(&self) -> &str {
        &self.meta().id
    }
}

/// Entities that support free-text search in list views
pub trait Searchable: Entity {
    /// `needle` is already lowercased and non-empty
    fn matches(&self, needle: &str) -> bool;
}

/// Case-insensitive substring match helper for `Searchable` impls
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// `deserialize_with` for clearable patch fields: absent stays `None`
/// (via `#[serde(default)]`), `null` becomes `Some(None)`
pub fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum DomainError {
    /// Referenced id does not exist; the caller's view is stale
    NotFound { entity: String, id: String },
    /// Input failed a required-field or range check; nothing was changed
    Validation { field: String, reason: String },
    /// Duplicate identifier in seed or imported data
    Conflict(String),
    /// Storage, IO or decoding failure
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        DomainError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound { entity, id } => write!(f, "Not found: {} {}", entity, id),
            DomainError::Validation { field, reason } => {
                write!(f, "Invalid input: {} {}", field, reason)
            }
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Internal(format!("json: {}", e))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Internal(format!("io: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_touch_moves_forward() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 10, 0, 0).unwrap();
        let mut meta = RecordMeta::new("bill-1".to_string(), now);

        meta.touch(now);
        assert!(meta.updated_at > meta.created_at);

        let later = now + Duration::hours(1);
        meta.touch(later);
        assert_eq!(meta.updated_at, later);
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::validation("quantity", "must be greater than 0");
        assert_eq!(err.to_string(), "Invalid input: quantity must be greater than 0");

        let err = DomainError::not_found("bill", "42");
        assert_eq!(err.to_string(), "Not found: bill 42");
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Car Insurance Policy", "insur"));
        assert!(!contains_ci("RC Book", "insur"));
    }
}
