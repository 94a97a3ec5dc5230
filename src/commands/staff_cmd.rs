//! Staff and attendance commands

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    AttendanceStatus, AttendanceSummary, DomainResult, StaffDraft, StaffMember, StaffPatch,
};
use crate::repository::ListQuery;
use crate::AppState;

pub async fn list_staff(state: &AppState) -> Vec<StaffMember> {
    state
        .staff
        .list(&ListQuery::all().sort_by(|a: &StaffMember, b: &StaffMember| a.name.cmp(&b.name)))
        .await
}

pub async fn get_staff(state: &AppState, id: &str) -> DomainResult<StaffMember> {
    state.staff.find(id).await
}

pub async fn create_staff(state: &AppState, draft: StaffDraft) -> DomainResult<StaffMember> {
    state.staff.create(draft).await
}

pub async fn update_staff(state: &AppState, id: &str, patch: StaffPatch) -> DomainResult<StaffMember> {
    state.staff.update(id, patch).await
}

pub async fn delete_staff(state: &AppState, id: &str) -> DomainResult<()> {
    state.staff.remove(id).await
}

/// Mark a day; a second mark for the same day replaces the first.
/// `date` defaults to today.
pub async fn mark_attendance(
    state: &AppState,
    id: &str,
    date: Option<NaiveDate>,
    status: AttendanceStatus,
    notes: Option<String>,
) -> DomainResult<StaffMember> {
    let date = date.unwrap_or_else(|| state.today());
    let member = state
        .staff
        .mutate(id, move |member| {
            member.mark_attendance(date, status, notes);
            Ok(())
        })
        .await?;
    log::debug!("attendance {} {:?} for {}", date, status, id);
    Ok(member)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub staff_id: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(flatten)]
    pub summary: AttendanceSummary,
    pub percentage: Option<f64>,
}

/// Counts over `[from, to]`
pub async fn attendance_summary(
    state: &AppState,
    id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> DomainResult<AttendanceReport> {
    let member = state.staff.find(id).await?;
    let summary = member.attendance_summary(from, to);
    Ok(AttendanceReport {
        staff_id: member.meta.id,
        from,
        to,
        percentage: summary.percentage(),
        summary,
    })
}
