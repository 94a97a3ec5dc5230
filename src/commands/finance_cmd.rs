//! Finance commands

use crate::domain::{
    DomainResult, FinanceSummary, Timeframe, Transaction, TransactionDraft, TransactionPatch,
    TransactionType,
};
use crate::repository::ListQuery;
use crate::AppState;

/// Newest first, optionally one type only
pub async fn list_transactions(state: &AppState, kind: Option<TransactionType>) -> Vec<Transaction> {
    let mut query = ListQuery::all().sort_by(|a: &Transaction, b: &Transaction| b.date.cmp(&a.date));
    if let Some(kind) = kind {
        query = query.filter(move |t: &Transaction| t.kind == kind);
    }
    state.transactions.list(&query).await
}

pub async fn create_transaction(state: &AppState, draft: TransactionDraft) -> DomainResult<Transaction> {
    state.transactions.create(draft).await
}

pub async fn update_transaction(
    state: &AppState,
    id: &str,
    patch: TransactionPatch,
) -> DomainResult<Transaction> {
    state.transactions.update(id, patch).await
}

pub async fn delete_transaction(state: &AppState, id: &str) -> DomainResult<()> {
    state.transactions.remove(id).await
}

pub async fn search_transactions(state: &AppState, text: &str) -> Vec<Transaction> {
    state.transactions.search(text).await
}

/// Income, expense and per-category spend over the window ending today
pub async fn finance_summary(state: &AppState, timeframe: Timeframe) -> FinanceSummary {
    let transactions = state.transactions.list(&ListQuery::all()).await;
    FinanceSummary::compute(&transactions, timeframe, state.today())
}
