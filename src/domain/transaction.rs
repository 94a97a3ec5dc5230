//! Transaction Entity and finance summaries

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::aggregate::{sum, totals_by};
use super::entity::{contains_ci, DomainResult, Entity, RecordMeta, Searchable};
use super::validate::{optional_text, require_positive, require_text, required_number};
use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub account: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

/// Reporting window, counted back from today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Week,
    #[default]
    Month,
    Year,
}

impl Timeframe {
    /// Inclusive `(start, end)` window ending at `today`
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = match self {
            Timeframe::Week => today - Duration::days(7),
            Timeframe::Month => today.checked_sub_months(Months::new(1)).unwrap_or(today),
            Timeframe::Year => today.checked_sub_months(Months::new(12)).unwrap_or(today),
        };
        (start, today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub timeframe: Timeframe,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    /// Largest category first
    pub expenses_by_category: Vec<(String, f64)>,
}

impl FinanceSummary {
    pub fn compute(transactions: &[Transaction], timeframe: Timeframe, today: NaiveDate) -> Self {
        let (start, end) = timeframe.window(today);
        let in_window: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .cloned()
            .collect();

        let income = sum(&in_window, |t| t.amount, Some(Transaction::is_income));
        let expense = sum(&in_window, |t| t.amount, Some(Transaction::is_expense));
        let expenses: Vec<Transaction> = in_window.into_iter().filter(Transaction::is_expense).collect();
        let expenses_by_category = totals_by(&expenses, |t| t.category.clone(), |t| t.amount);

        Self {
            timeframe,
            start,
            end,
            income,
            expense,
            balance: income - expense,
            expenses_by_category,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionDraft {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub account: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionPatch {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub account: Option<String>,
}

impl Entity for Transaction {
    type Draft = TransactionDraft;
    type Patch = TransactionPatch;

    const KIND: &'static str = "transaction";
    const ID_PREFIX: &'static str = "txn";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn from_draft(meta: RecordMeta, draft: TransactionDraft) -> DomainResult<Self> {
        let kind = draft
            .kind
            .ok_or_else(|| DomainError::validation("type", "is required"))?;
        let date = draft
            .date
            .ok_or_else(|| DomainError::validation("date", "is required"))?;

        Ok(Self {
            meta,
            amount: required_number("amount", draft.amount)?,
            kind,
            category: draft.category.trim().to_string(),
            date,
            description: optional_text(draft.description),
            account: draft.account.trim().to_string(),
        })
    }

    fn apply_patch(&mut self, patch: TransactionPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if patch.description.is_some() {
            self.description = optional_text(patch.description);
        }
        if let Some(account) = patch.account {
            self.account = account.trim().to_string();
        }
    }

    fn validate(&self) -> DomainResult<()> {
        require_positive("amount", self.amount)?;
        require_text("category", &self.category)?;
        require_text("account", &self.account)
    }
}

impl Searchable for Transaction {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.category, needle)
            || contains_ci(&self.account, needle)
            || self.description.as_deref().map(|d| contains_ci(d, needle)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn txn(id: &str, amount: f64, kind: TransactionType, category: &str, day: &str) -> Transaction {
        let draft = TransactionDraft {
            amount: Some(amount),
            kind: Some(kind),
            category: category.into(),
            date: Some(date(day)),
            description: None,
            account: "HDFC Savings".into(),
        };
        Transaction::from_draft(RecordMeta::new(id.into(), Utc::now()), draft).unwrap()
    }

    fn ledger() -> Vec<Transaction> {
        use TransactionType::*;
        vec![
            txn("1", 25000.0, Income, "Salary", "2025-07-01"),
            txn("2", 8000.0, Expense, "Rent", "2025-07-02"),
            txn("3", 1250.0, Expense, "Utilities", "2025-07-01"),
            txn("5", 5000.0, Expense, "Staff", "2025-06-30"),
            txn("6", 12000.0, Expense, "Staff", "2025-06-30"),
            txn("8", 15000.0, Income, "Interest", "2025-06-15"),
            txn("9", 900.0, Expense, "Dining", "2024-12-01"),
        ]
    }

    #[test]
    fn test_windows() {
        let today = date("2025-07-03");
        assert_eq!(Timeframe::Week.window(today).0, date("2025-06-26"));
        assert_eq!(Timeframe::Month.window(today).0, date("2025-06-03"));
        assert_eq!(Timeframe::Year.window(today).0, date("2024-07-03"));
        assert_eq!(Timeframe::Month.window(date("2025-03-31")).0, date("2025-02-28"));
    }

    #[test]
    fn test_month_summary() {
        let summary = FinanceSummary::compute(&ledger(), Timeframe::Month, date("2025-07-03"));
        assert_eq!(summary.income, 40000.0);
        assert_eq!(summary.expense, 26250.0);
        assert_eq!(summary.balance, 13750.0);
        assert_eq!(summary.expenses_by_category[0], ("Staff".to_string(), 17000.0));
        assert_eq!(summary.expenses_by_category.len(), 3);
    }

    #[test]
    fn test_week_summary_excludes_older() {
        let summary = FinanceSummary::compute(&ledger(), Timeframe::Week, date("2025-07-03"));
        assert_eq!(summary.income, 25000.0);
        assert_eq!(summary.expense, 26250.0);
        assert_eq!(summary.balance, -1250.0);
    }

    #[test]
    fn test_type_required() {
        let draft = TransactionDraft {
            amount: Some(100.0),
            category: "Misc".into(),
            date: Some(date("2025-07-01")),
            account: "Cash".into(),
            ..Default::default()
        };
        let err = Transaction::from_draft(RecordMeta::new("t".into(), Utc::now()), draft).unwrap_err();
        assert_eq!(err, DomainError::validation("type", "is required"));
    }
}
