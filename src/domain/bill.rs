//! Bill Entity
//!
//! Household bills with a payment history. Only `paid`/`unpaid` is stored;
//! `overdue` is derived at read time from the due date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::clock::days_after;
use super::entity::{contains_ci, DomainResult, Entity, RecordMeta, Searchable};
use super::validate::{optional_text, require_positive, require_text, required_number};

/// Stored payment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Older data carried an explicit "overdue" value; it is an unpaid bill
    #[default]
    #[serde(alias = "overdue")]
    Unpaid,
    Paid,
}

/// Status shown to the user, computed on every read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Unpaid,
    Paid,
    Overdue,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Unpaid => "unpaid",
            BillStatus::Paid => "paid",
            BillStatus::Overdue => "overdue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// One entry of a bill's payment history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub date: NaiveDate,
    pub amount: f64,
    pub method: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default, alias = "recurringType")]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Derived on read; ignored on input
    #[serde(default, skip_deserializing)]
    pub effective_status: BillStatus,
}

impl Bill {
    /// Status as of `today`
    pub fn status_on(&self, today: NaiveDate) -> BillStatus {
        match self.status {
            PaymentStatus::Paid => BillStatus::Paid,
            PaymentStatus::Unpaid if self.due_date < today => BillStatus::Overdue,
            PaymentStatus::Unpaid => BillStatus::Unpaid,
        }
    }

    /// Unpaid and due within `[today, today + days]`. A window reaching
    /// past the last representable date has no upper bound.
    pub fn is_due_within(&self, today: NaiveDate, days: i64) -> bool {
        if self.status != PaymentStatus::Unpaid || self.due_date < today {
            return false;
        }
        match days_after(today, days) {
            Some(end) => self.due_date <= end,
            None => true,
        }
    }

    pub fn total_paid(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BillDraft {
    pub title: String,
    pub amount: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub category: String,
    pub recurrence: Recurrence,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BillPatch {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub status: Option<PaymentStatus>,
    pub recurrence: Option<Recurrence>,
    pub notes: Option<String>,
}

impl Entity for Bill {
    type Draft = BillDraft;
    type Patch = BillPatch;

    const KIND: &'static str = "bill";
    const ID_PREFIX: &'static str = "bill";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn from_draft(meta: RecordMeta, draft: BillDraft) -> DomainResult<Self> {
        let due_date = draft
            .due_date
            .ok_or_else(|| super::DomainError::validation("dueDate", "is required"))?;

        Ok(Self {
            meta,
            title: draft.title.trim().to_string(),
            amount: required_number("amount", draft.amount)?,
            due_date,
            category: draft.category.trim().to_string(),
            status: PaymentStatus::Unpaid,
            recurrence: draft.recurrence,
            notes: optional_text(draft.notes),
            payments: Vec::new(),
            effective_status: BillStatus::Unpaid,
        })
    }

    fn apply_patch(&mut self, patch: BillPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(recurrence) = patch.recurrence {
            self.recurrence = recurrence;
        }
        if patch.notes.is_some() {
            self.notes = optional_text(patch.notes);
        }
    }

    fn validate(&self) -> DomainResult<()> {
        require_text("title", &self.title)?;
        require_positive("amount", self.amount)?;
        require_text("category", &self.category)?;
        for payment in &self.payments {
            require_positive("payments.amount", payment.amount)?;
            require_text("payments.method", &payment.method)?;
        }
        Ok(())
    }

    fn derive(&mut self, today: NaiveDate) {
        self.effective_status = self.status_on(today);
    }
}

impl Searchable for Bill {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.title, needle)
            || contains_ci(&self.category, needle)
            || self.notes.as_deref().map(|n| contains_ci(n, needle)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn electricity() -> Bill {
        let draft = BillDraft {
            title: "Electricity Bill".into(),
            amount: Some(1250.0),
            due_date: Some(date("2025-07-15")),
            category: "Utilities".into(),
            recurrence: Recurrence::Monthly,
            notes: Some("BSES Rajdhani Power Limited".into()),
        };
        Bill::from_draft(RecordMeta::new("bill-1".into(), Utc::now()), draft).unwrap()
    }

    #[test]
    fn test_status_on() {
        let mut bill = electricity();
        assert_eq!(bill.status_on(date("2025-07-15")), BillStatus::Unpaid);
        assert_eq!(bill.status_on(date("2025-07-16")), BillStatus::Overdue);

        bill.status = PaymentStatus::Paid;
        assert_eq!(bill.status_on(date("2025-07-16")), BillStatus::Paid);
    }

    #[test]
    fn test_legacy_overdue_is_unpaid() {
        let status: PaymentStatus = serde_json::from_str("\"overdue\"").unwrap();
        assert_eq!(status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_effective_status_emitted_but_not_read_back() {
        let mut bill = electricity();
        bill.derive(date("2025-08-01"));
        assert_eq!(bill.effective_status, BillStatus::Overdue);

        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["effectiveStatus"], "overdue");
        assert_eq!(json["status"], "unpaid");
        assert_eq!(json["dueDate"], "2025-07-15");

        let back: Bill = serde_json::from_value(json).unwrap();
        assert_eq!(back.effective_status, BillStatus::Unpaid);
        assert_eq!(back.status_on(date("2025-08-01")), BillStatus::Overdue);
    }

    #[test]
    fn test_due_within() {
        let bill = electricity();
        assert!(bill.is_due_within(date("2025-07-10"), 7));
        assert!(!bill.is_due_within(date("2025-07-01"), 7));
        assert!(!bill.is_due_within(date("2025-07-16"), 7));
    }

    #[test]
    fn test_due_within_huge_window() {
        let bill = electricity();
        assert!(bill.is_due_within(date("2025-07-01"), 1_000_000_000));
        assert!(bill.is_due_within(date("2025-07-01"), i64::MAX));
        assert!(!bill.is_due_within(date("2025-07-16"), i64::MAX));
    }

    #[test]
    fn test_missing_due_date() {
        let draft = BillDraft {
            title: "Water Bill".into(),
            amount: Some(800.0),
            category: "Utilities".into(),
            ..Default::default()
        };
        let err = Bill::from_draft(RecordMeta::new("bill-2".into(), Utc::now()), draft).unwrap_err();
        assert_eq!(err, crate::domain::DomainError::validation("dueDate", "is required"));
    }
}
