//! Staff Entity
//!
//! Household staff with an owned attendance log (one entry per day).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{contains_ci, DomainResult, Entity, RecordMeta, Searchable};
use super::validate::{optional_text, require_positive, require_text, required_number};
use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

impl AttendanceStatus {
    /// Weight towards the attendance percentage
    pub fn weight(&self) -> f64 {
        match self {
            AttendanceStatus::Present => 1.0,
            AttendanceStatus::HalfDay => 0.5,
            AttendanceStatus::Absent | AttendanceStatus::Leave => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    #[serde(alias = "phoneNumber")]
    pub phone: String,
    pub role: String,
    pub salary: f64,
    pub joining_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Newest first
    #[serde(default)]
    pub attendance: Vec<Attendance>,
}

impl StaffMember {
    /// Record attendance for a day, replacing any earlier mark for that day
    pub fn mark_attendance(&mut self, date: NaiveDate, status: AttendanceStatus, notes: Option<String>) {
        self.attendance.retain(|a| a.date != date);
        let entry = Attendance {
            date,
            status,
            notes: optional_text(notes),
        };
        let pos = self
            .attendance
            .iter()
            .position(|a| a.date < date)
            .unwrap_or(self.attendance.len());
        self.attendance.insert(pos, entry);
    }

    pub fn attendance_on(&self, date: NaiveDate) -> Option<&Attendance> {
        self.attendance.iter().find(|a| a.date == date)
    }

    /// Counts per status over `[from, to]`
    pub fn attendance_summary(&self, from: NaiveDate, to: NaiveDate) -> AttendanceSummary {
        let mut summary = AttendanceSummary::default();
        for entry in self.attendance.iter().filter(|a| a.date >= from && a.date <= to) {
            match entry.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::HalfDay => summary.half_day += 1,
                AttendanceStatus::Leave => summary.leave += 1,
            }
            summary.weighted_days += entry.status.weight();
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present: u32,
    pub absent: u32,
    pub half_day: u32,
    pub leave: u32,
    pub weighted_days: f64,
}

impl AttendanceSummary {
    pub fn marked_days(&self) -> u32 {
        self.present + self.absent + self.half_day + self.leave
    }

    /// Percentage of marked days attended; half days count as half.
    /// `None` when nothing was marked.
    pub fn percentage(&self) -> Option<f64> {
        match self.marked_days() {
            0 => None,
            days => Some(self.weighted_days / days as f64 * 100.0),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaffDraft {
    pub name: String,
    #[serde(alias = "phoneNumber")]
    pub phone: String,
    pub role: String,
    pub salary: Option<f64>,
    pub joining_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaffPatch {
    pub name: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone: Option<String>,
    pub role: Option<String>,
    pub salary: Option<f64>,
    pub joining_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Entity for StaffMember {
    type Draft = StaffDraft;
    type Patch = StaffPatch;

    const KIND: &'static str = "staff";
    const ID_PREFIX: &'static str = "staff";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn from_draft(meta: RecordMeta, draft: StaffDraft) -> DomainResult<Self> {
        let joining_date = draft
            .joining_date
            .ok_or_else(|| DomainError::validation("joiningDate", "is required"))?;

        Ok(Self {
            meta,
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            role: draft.role.trim().to_string(),
            salary: required_number("salary", draft.salary)?,
            joining_date,
            notes: optional_text(draft.notes),
            attendance: Vec::new(),
        })
    }

    fn apply_patch(&mut self, patch: StaffPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(role) = patch.role {
            self.role = role.trim().to_string();
        }
        if let Some(salary) = patch.salary {
            self.salary = salary;
        }
        if let Some(date) = patch.joining_date {
            self.joining_date = date;
        }
        if patch.notes.is_some() {
            self.notes = optional_text(patch.notes);
        }
    }

    fn validate(&self) -> DomainResult<()> {
        require_text("name", &self.name)?;
        require_text("phone", &self.phone)?;
        require_text("role", &self.role)?;
        require_positive("salary", self.salary)
    }
}

impl Searchable for StaffMember {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle) || contains_ci(&self.role, needle)
    }
}
