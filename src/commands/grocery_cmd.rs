//! Grocery list commands

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{group_by, DomainResult, GroceryDraft, GroceryItem, GroceryPatch};
use crate::repository::ListQuery;
use crate::AppState;

/// Shopping list in collection order (newest first)
pub async fn list_groceries(state: &AppState, hide_completed: bool) -> Vec<GroceryItem> {
    let mut query = ListQuery::all();
    if hide_completed {
        query = query.filter(|g: &GroceryItem| !g.is_completed);
    }
    state.groceries.list(&query).await
}

pub async fn add_grocery(state: &AppState, draft: GroceryDraft) -> DomainResult<GroceryItem> {
    state.groceries.create(draft).await
}

/// Single-box add: one item in "Other"
pub async fn quick_add_grocery(state: &AppState, name: &str) -> DomainResult<GroceryItem> {
    state.groceries.create(GroceryDraft::quick(name)).await
}

pub async fn update_grocery(state: &AppState, id: &str, patch: GroceryPatch) -> DomainResult<GroceryItem> {
    state.groceries.update(id, patch).await
}

pub async fn toggle_grocery(state: &AppState, id: &str) -> DomainResult<GroceryItem> {
    state
        .groceries
        .mutate(id, |item| {
            item.is_completed = !item.is_completed;
            Ok(())
        })
        .await
}

pub async fn delete_grocery(state: &AppState, id: &str) -> DomainResult<()> {
    state.groceries.remove(id).await
}

/// Remove every checked item in one commit; returns how many went
pub async fn clear_completed_groceries(state: &AppState) -> DomainResult<usize> {
    let cleared = state
        .groceries
        .remove_where(|g: &GroceryItem| g.is_completed)
        .await?;
    log::info!("cleared {} completed grocery items", cleared);
    Ok(cleared)
}

pub async fn search_groceries(state: &AppState, text: &str) -> Vec<GroceryItem> {
    state.groceries.search(text).await
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryCounts {
    pub pending: usize,
    pub completed: usize,
}

pub async fn grocery_counts(state: &AppState) -> GroceryCounts {
    let items = state.groceries.list(&ListQuery::all()).await;
    let completed = items.iter().filter(|g| g.is_completed).count();
    GroceryCounts {
        pending: items.len() - completed,
        completed,
    }
}

pub async fn groceries_by_category(state: &AppState) -> BTreeMap<String, Vec<GroceryItem>> {
    let items = state.groceries.list(&ListQuery::all()).await;
    group_by(&items, |g| g.category.clone())
}
