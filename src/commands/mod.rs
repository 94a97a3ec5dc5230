//! Commands Layer
//!
//! Per-screen operations over the shared collections. A UI shell maps its
//! IPC calls onto these.

mod backup_cmd;
mod bill_cmd;
mod calendar_cmd;
mod document_cmd;
mod family_cmd;
mod finance_cmd;
mod grocery_cmd;
mod staff_cmd;
mod vehicle_cmd;

#[cfg(test)]
mod tests;

pub use backup_cmd::*;
pub use bill_cmd::*;
pub use calendar_cmd::*;
pub use document_cmd::*;
pub use family_cmd::*;
pub use finance_cmd::*;
pub use grocery_cmd::*;
pub use staff_cmd::*;
pub use vehicle_cmd::*;
