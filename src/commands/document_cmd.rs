//! Document vault commands

use std::collections::BTreeSet;

use crate::domain::{days_after, Document, DocumentDraft, DocumentPatch, DomainResult, Searchable};
use crate::repository::ListQuery;
use crate::AppState;

pub async fn list_documents(state: &AppState) -> Vec<Document> {
    state.documents.list(&ListQuery::all()).await
}

pub async fn create_document(state: &AppState, draft: DocumentDraft) -> DomainResult<Document> {
    let doc = state.documents.create(draft).await?;
    log::info!("document {} stored at {}", doc.meta.id, doc.path);
    Ok(doc)
}

pub async fn update_document(state: &AppState, id: &str, patch: DocumentPatch) -> DomainResult<Document> {
    state.documents.update(id, patch).await
}

pub async fn delete_document(state: &AppState, id: &str) -> DomainResult<()> {
    state.documents.remove(id).await
}

/// Title/tag search, optionally within one category. Empty text matches
/// everything.
pub async fn search_documents(state: &AppState, text: &str, category: Option<String>) -> Vec<Document> {
    let needle = text.trim().to_lowercase();
    let mut query = ListQuery::all();
    if !needle.is_empty() {
        query = query.filter(move |d: &Document| d.matches(&needle));
    }
    if let Some(category) = category {
        query = query.filter(move |d: &Document| d.category.eq_ignore_ascii_case(&category));
    }
    state.documents.list(&query).await
}

/// Distinct categories, sorted
pub async fn document_categories(state: &AppState) -> Vec<String> {
    let docs = list_documents(state).await;
    let categories: BTreeSet<String> = docs.into_iter().map(|d| d.category).collect();
    categories.into_iter().collect()
}

/// Documents whose expiry falls on or before `within_days` from today,
/// already expired ones included, soonest first. A window past the end
/// of the calendar covers every dated document.
pub async fn expiring_documents(state: &AppState, within_days: i64) -> Vec<Document> {
    let cutoff = days_after(state.today(), within_days.max(0));
    let query = ListQuery::all()
        .filter(move |d: &Document| match (d.expiry_date, cutoff) {
            (Some(expiry), Some(cutoff)) => expiry <= cutoff,
            (Some(_), None) => true,
            (None, _) => false,
        })
        .sort_by(|a: &Document, b: &Document| a.expiry_date.cmp(&b.expiry_date));
    state.documents.list(&query).await
}
