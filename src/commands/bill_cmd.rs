//! Bill commands
//!
//! Bills list, upcoming dues and payments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    sum, Bill, BillDraft, BillPatch, BillStatus, DomainResult, Payment, PaymentStatus,
};
use crate::repository::ListQuery;
use crate::AppState;

/// List bills by due date, optionally narrowed by displayed status and
/// category
pub async fn list_bills(
    state: &AppState,
    status: Option<BillStatus>,
    category: Option<String>,
) -> Vec<Bill> {
    let mut query = ListQuery::all().sort_by(|a: &Bill, b: &Bill| a.due_date.cmp(&b.due_date));
    if let Some(status) = status {
        query = query.filter(move |b: &Bill| b.effective_status == status);
    }
    if let Some(category) = category {
        query = query.filter(move |b: &Bill| b.category.eq_ignore_ascii_case(&category));
    }
    state.bills.list(&query).await
}

pub async fn get_bill(state: &AppState, id: &str) -> DomainResult<Bill> {
    state.bills.find(id).await
}

pub async fn create_bill(state: &AppState, draft: BillDraft) -> DomainResult<Bill> {
    let bill = state.bills.create(draft).await?;
    log::info!("bill {} created, due {}", bill.meta.id, bill.due_date);
    Ok(bill)
}

pub async fn update_bill(state: &AppState, id: &str, patch: BillPatch) -> DomainResult<Bill> {
    state.bills.update(id, patch).await
}

pub async fn delete_bill(state: &AppState, id: &str) -> DomainResult<()> {
    state.bills.remove(id).await?;
    log::info!("bill {} deleted", id);
    Ok(())
}

pub async fn search_bills(state: &AppState, text: &str) -> Vec<Bill> {
    state.bills.search(text).await
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDues {
    pub within_days: i64,
    pub total: f64,
    /// Soonest first
    pub bills: Vec<Bill>,
}

/// Unpaid bills due between today and `within_days` from now. Falls back
/// to the configured window.
pub async fn upcoming_dues(state: &AppState, within_days: Option<i64>) -> UpcomingDues {
    let days = within_days.unwrap_or(state.config.due_soon_days).max(0);
    let today = state.today();
    let query = ListQuery::all()
        .filter(move |b: &Bill| b.is_due_within(today, days))
        .sort_by(|a: &Bill, b: &Bill| a.due_date.cmp(&b.due_date));
    let bills = state.bills.list(&query).await;
    let total = sum(&bills, |b| b.amount, None::<fn(&Bill) -> bool>);

    UpcomingDues {
        within_days: days,
        total,
        bills,
    }
}

/// Amount per displayed status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    pub paid: f64,
    pub unpaid: f64,
    pub overdue: f64,
}

pub async fn bill_totals(state: &AppState) -> BillTotals {
    let bills = state.bills.list(&ListQuery::all()).await;
    let total_for = |status: BillStatus| {
        sum(&bills, |b| b.amount, Some(move |b: &Bill| b.effective_status == status))
    };
    BillTotals {
        paid: total_for(BillStatus::Paid),
        unpaid: total_for(BillStatus::Unpaid),
        overdue: total_for(BillStatus::Overdue),
    }
}

/// Payment form input. Date defaults to today and amount to the bill amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentInput {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub method: String,
    pub reference: String,
}

/// Record a payment and mark the bill paid in one step
pub async fn pay_bill(state: &AppState, id: &str, input: PaymentInput) -> DomainResult<Bill> {
    let today = state.today();
    let bill = state
        .bills
        .mutate(id, move |bill| {
            bill.payments.push(Payment {
                date: input.date.unwrap_or(today),
                amount: input.amount.unwrap_or(bill.amount),
                method: input.method.trim().to_string(),
                reference: input.reference.trim().to_string(),
            });
            bill.status = PaymentStatus::Paid;
            Ok(())
        })
        .await?;
    log::info!("bill {} paid ({} payments)", id, bill.payments.len());
    Ok(bill)
}

/// Mark paid without recording a payment
pub async fn mark_bill_paid(state: &AppState, id: &str) -> DomainResult<Bill> {
    set_status(state, id, PaymentStatus::Paid).await
}

pub async fn mark_bill_unpaid(state: &AppState, id: &str) -> DomainResult<Bill> {
    set_status(state, id, PaymentStatus::Unpaid).await
}

async fn set_status(state: &AppState, id: &str, status: PaymentStatus) -> DomainResult<Bill> {
    let patch = BillPatch {
        status: Some(status),
        ..Default::default()
    };
    state.bills.update(id, patch).await
}
