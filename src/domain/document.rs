//! Document Entity
//!
//! Scanned household papers (property deeds, policies, IDs). Also hosts the
//! small `Attachment` value owned by vehicles and family members, and the
//! expiry classification shared by anything with a validity date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{contains_ci, DomainResult, Entity, RecordMeta, Searchable};
use super::validate::{require_non_negative, require_text};

/// Days before expiry at which a date is flagged
pub const EXPIRY_WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "days", rename_all = "camelCase")]
pub enum ExpiryStatus {
    NotAvailable,
    Expired,
    /// Days remaining, `0..=EXPIRY_WARNING_DAYS`
    ExpiringSoon(i64),
    Valid,
}

impl ExpiryStatus {
    pub fn classify(expiry: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(expiry) = expiry else {
            return ExpiryStatus::NotAvailable;
        };
        let days = (expiry - today).num_days();
        if days < 0 {
            ExpiryStatus::Expired
        } else if days <= EXPIRY_WARNING_DAYS {
            ExpiryStatus::ExpiringSoon(days)
        } else {
            ExpiryStatus::Valid
        }
    }

    /// Expired or expiring soon
    pub fn needs_attention(&self) -> bool {
        matches!(self, ExpiryStatus::Expired | ExpiryStatus::ExpiringSoon(_))
    }
}

/// A file owned by a parent record; no identity of its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(alias = "fileUrl")]
    pub path: String,
}

impl Attachment {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            path: path.trim().to_string(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        require_text("documents.name", &self.name)?;
        require_text("documents.path", &self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(alias = "name")]
    pub title: String,
    pub category: String,
    pub file_type: String,
    /// Megabytes
    #[serde(default)]
    pub file_size: f64,
    #[serde(alias = "fileUrl")]
    pub path: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub shared_with: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

impl Document {
    pub fn expiry_status(&self, today: NaiveDate) -> ExpiryStatus {
        ExpiryStatus::classify(self.expiry_date, today)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentDraft {
    #[serde(alias = "name")]
    pub title: String,
    pub category: String,
    pub file_type: String,
    pub file_size: f64,
    #[serde(alias = "fileUrl")]
    pub path: String,
    pub tags: Vec<String>,
    pub shared_with: Vec<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(alias = "name")]
    pub title: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub shared_with: Option<Vec<String>>,
    #[serde(default, deserialize_with = "super::entity::double_option", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<Option<NaiveDate>>,
}

/// Trim, lowercase and dedupe tags
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

impl Entity for Document {
    type Draft = DocumentDraft;
    type Patch = DocumentPatch;

    const KIND: &'static str = "document";
    const ID_PREFIX: &'static str = "doc";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn from_draft(meta: RecordMeta, draft: DocumentDraft) -> DomainResult<Self> {
        Ok(Self {
            meta,
            title: draft.title.trim().to_string(),
            category: draft.category.trim().to_string(),
            file_type: draft.file_type.trim().to_lowercase(),
            file_size: draft.file_size,
            path: draft.path.trim().to_string(),
            tags: normalize_tags(draft.tags),
            shared_with: draft.shared_with,
            expiry_date: draft.expiry_date,
        })
    }

    fn apply_patch(&mut self, patch: DocumentPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(shared) = patch.shared_with {
            self.shared_with = shared;
        }
        if let Some(expiry) = patch.expiry_date {
            self.expiry_date = expiry;
        }
    }

    fn validate(&self) -> DomainResult<()> {
        require_text("title", &self.title)?;
        require_text("category", &self.category)?;
        require_text("fileType", &self.file_type)?;
        require_text("path", &self.path)?;
        require_non_negative("fileSize", self.file_size)
    }
}

impl Searchable for Document {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.title, needle) || self.tags.iter().any(|t| contains_ci(t, needle))
    }
}
