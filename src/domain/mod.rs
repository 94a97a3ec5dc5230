//! Domain Layer
//!
//! Contains all household entities and core abstractions.
//! This layer has no storage or runtime dependencies (serde and chrono only).

mod aggregate;
mod bill;
mod clock;
mod document;
mod entity;
mod event;
mod family;
mod grocery;
mod staff;
mod transaction;
mod validate;
mod vehicle;

pub use aggregate::{cmp_nulls_last, group_by, sum, totals_by};
pub use bill::{Bill, BillDraft, BillPatch, BillStatus, Payment, PaymentStatus, Recurrence};
pub use clock::{days_after, Clock, ManualClock, SystemClock};
pub use document::{Attachment, Document, DocumentDraft, DocumentPatch, ExpiryStatus, EXPIRY_WARNING_DAYS};
pub use entity::{contains_ci, DomainError, DomainResult, Entity, RecordMeta, Searchable};
pub use event::{CalendarEvent, EventDraft, EventPatch};
pub use family::{FamilyDraft, FamilyMember, FamilyPatch, FamilyRole, HealthDetails, Medication};
pub use grocery::{GroceryDraft, GroceryItem, GroceryPatch};
pub use staff::{Attendance, AttendanceStatus, AttendanceSummary, StaffDraft, StaffMember, StaffPatch};
pub use transaction::{FinanceSummary, Timeframe, Transaction, TransactionDraft, TransactionPatch, TransactionType};
pub use vehicle::{ServiceDraft, ServiceRecord, Vehicle, VehicleDraft, VehiclePatch};
