//! Calendar commands

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::{group_by, CalendarEvent, DomainResult, EventDraft, EventPatch};
use crate::repository::ListQuery;
use crate::AppState;

pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

pub async fn list_events(state: &AppState) -> Vec<CalendarEvent> {
    state
        .events
        .list(&ListQuery::all().sort_by(CalendarEvent::chronological))
        .await
}

pub async fn create_event(state: &AppState, draft: EventDraft) -> DomainResult<CalendarEvent> {
    state.events.create(draft).await
}

pub async fn update_event(state: &AppState, id: &str, patch: EventPatch) -> DomainResult<CalendarEvent> {
    state.events.update(id, patch).await
}

pub async fn delete_event(state: &AppState, id: &str) -> DomainResult<()> {
    state.events.remove(id).await
}

/// Events on one day, timed ones first by start time
pub async fn events_on(state: &AppState, date: NaiveDate) -> Vec<CalendarEvent> {
    let query = ListQuery::all()
        .filter(move |e: &CalendarEvent| e.date == date)
        .sort_by(CalendarEvent::chronological);
    state.events.list(&query).await
}

pub async fn events_by_date(state: &AppState) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
    group_by(&list_events(state).await, |e| e.date)
}

/// Events from today on, soonest first
pub async fn upcoming_events(state: &AppState, limit: Option<usize>) -> Vec<CalendarEvent> {
    let today = state.today();
    let query = ListQuery::all()
        .filter(move |e: &CalendarEvent| e.date >= today)
        .sort_by(CalendarEvent::chronological);
    let mut events = state.events.list(&query).await;
    events.truncate(limit.unwrap_or(DEFAULT_UPCOMING_LIMIT));
    events
}

pub async fn search_events(state: &AppState, text: &str) -> Vec<CalendarEvent> {
    state.events.search(text).await
}
