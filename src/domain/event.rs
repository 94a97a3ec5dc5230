//! Calendar Event Entity

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::aggregate::cmp_nulls_last;
use super::entity::{contains_ci, DomainResult, Entity, RecordMeta, Searchable};
use super::validate::{optional_text, require_text};
use super::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub date: NaiveDate,
    /// `None` for all-day events
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl CalendarEvent {
    pub fn is_all_day(&self) -> bool {
        self.start_time.is_none()
    }

    /// Date ascending, then start time with all-day events last
    pub fn chronological(a: &CalendarEvent, b: &CalendarEvent) -> Ordering {
        a.date
            .cmp(&b.date)
            .then_with(|| cmp_nulls_last(a.start_time.as_ref(), b.start_time.as_ref()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the time (turns the event all-day)
    #[serde(default, deserialize_with = "super::entity::double_option", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "super::entity::double_option", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Option<NaiveTime>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub attendees: Option<Vec<String>>,
}

fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

impl Entity for CalendarEvent {
    type Draft = EventDraft;
    type Patch = EventPatch;

    const KIND: &'static str = "event";
    const ID_PREFIX: &'static str = "event";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn from_draft(meta: RecordMeta, draft: EventDraft) -> DomainResult<Self> {
        let date = draft
            .date
            .ok_or_else(|| DomainError::validation("date", "is required"))?;

        Ok(Self {
            meta,
            title: draft.title.trim().to_string(),
            date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            location: optional_text(draft.location),
            description: optional_text(draft.description),
            category: draft.category.trim().to_string(),
            attendees: clean_names(draft.attendees),
        })
    }

    fn apply_patch(&mut self, patch: EventPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(start) = patch.start_time {
            self.start_time = start;
        }
        if let Some(end) = patch.end_time {
            self.end_time = end;
        }
        if patch.location.is_some() {
            self.location = optional_text(patch.location);
        }
        if patch.description.is_some() {
            self.description = optional_text(patch.description);
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(attendees) = patch.attendees {
            self.attendees = clean_names(attendees);
        }
    }

    fn validate(&self) -> DomainResult<()> {
        require_text("title", &self.title)?;
        require_text("category", &self.category)?;
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end < start => {
                Err(DomainError::validation("endTime", "must not be before startTime"))
            }
            (None, Some(_)) => Err(DomainError::validation("startTime", "is required when endTime is set")),
            _ => Ok(()),
        }
    }
}

impl Searchable for CalendarEvent {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.title, needle)
            || contains_ci(&self.category, needle)
            || self.location.as_deref().map(|l| contains_ci(l, needle)).unwrap_or(false)
    }
}
