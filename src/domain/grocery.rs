//! Grocery Item Entity
//!
//! Shopping list entries with a completion checkbox.

use serde::{Deserialize, Serialize};

use super::entity::{contains_ci, DomainResult, Entity, RecordMeta, Searchable};
use super::validate::{optional_text, require_positive, require_text, required_number};

pub const QUICK_ADD_UNIT: &str = "item";
pub const QUICK_ADD_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroceryDraft {
    pub name: String,
    pub category: String,
    pub quantity: Option<f64>,
    pub unit: String,
    pub notes: Option<String>,
}

impl GroceryDraft {
    /// The single-field "add item" box on the list screen
    pub fn quick(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            category: QUICK_ADD_CATEGORY.to_string(),
            quantity: Some(1.0),
            unit: QUICK_ADD_UNIT.to_string(),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroceryPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub is_completed: Option<bool>,
    pub notes: Option<String>,
}

impl Entity for GroceryItem {
    type Draft = GroceryDraft;
    type Patch = GroceryPatch;

    const KIND: &'static str = "grocery";
    const ID_PREFIX: &'static str = "grocery";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn from_draft(meta: RecordMeta, draft: GroceryDraft) -> DomainResult<Self> {
        Ok(Self {
            meta,
            name: draft.name.trim().to_string(),
            category: draft.category.trim().to_string(),
            quantity: required_number("quantity", draft.quantity)?,
            unit: draft.unit.trim().to_string(),
            is_completed: false,
            notes: optional_text(draft.notes),
        })
    }

    fn apply_patch(&mut self, patch: GroceryPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit.trim().to_string();
        }
        if let Some(done) = patch.is_completed {
            self.is_completed = done;
        }
        if patch.notes.is_some() {
            self.notes = optional_text(patch.notes);
        }
    }

    fn validate(&self) -> DomainResult<()> {
        require_text("name", &self.name)?;
        require_positive("quantity", self.quantity)?;
        require_text("unit", &self.unit)?;
        require_text("category", &self.category)
    }
}

impl Searchable for GroceryItem {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle) || contains_ci(&self.category, needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn meta() -> RecordMeta {
        RecordMeta::new("grocery-1".to_string(), Utc::now())
    }

    #[test]
    fn test_quick_add_defaults() {
        let item = GroceryItem::from_draft(meta(), GroceryDraft::quick("  Curd ")).unwrap();
        assert_eq!(item.name, "Curd");
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit, "item");
        assert_eq!(item.category, "Other");
        assert!(!item.is_completed);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_missing_quantity_is_required() {
        let draft = GroceryDraft {
            name: "Milk".into(),
            category: "Dairy".into(),
            unit: "litre".into(),
            ..Default::default()
        };
        let err = GroceryItem::from_draft(meta(), draft).unwrap_err();
        assert_eq!(err, crate::domain::DomainError::validation("quantity", "is required"));
    }

    #[test]
    fn test_patch_keeps_unrelated_fields() {
        let mut item = GroceryItem::from_draft(meta(), GroceryDraft::quick("Eggs")).unwrap();
        item.apply_patch(GroceryPatch {
            is_completed: Some(true),
            ..Default::default()
        });
        assert!(item.is_completed);
        assert_eq!(item.name, "Eggs");
        assert_eq!(item.quantity, 1.0);
    }

    #[test]
    fn test_legacy_json_without_notes() {
        let json = r#"{"id":"1","name":"Milk","category":"Dairy","quantity":2,"unit":"litre",
            "isCompleted":false,"createdAt":"2025-07-01T00:00:00Z","updatedAt":"2025-07-01T00:00:00Z"}"#;
        let item: GroceryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id(), "1");
        assert_eq!(item.quantity, 2.0);
        assert!(item.notes.is_none());
    }
}
