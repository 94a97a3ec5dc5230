//! Backup commands
//!
//! Export snapshots every collection into one document. Import merges
//! each section into its collection, newest `updatedAt` wins. Sections are
//! applied one after another; a failing section stops the import but
//! earlier sections stay applied.

use chrono::Utc;
use std::path::Path;

use crate::domain::{DomainResult, Entity};
use crate::repository::{BackupData, Collection, RestoreReport};
use crate::AppState;

pub async fn export_backup(state: &AppState) -> BackupData {
    let mut data = BackupData::empty(Utc::now());
    data.staff = state.staff.export().await;
    data.bills = state.bills.export().await;
    data.groceries = state.groceries.export().await;
    data.events = state.events.export().await;
    data.vehicles = state.vehicles.export().await;
    data.family = state.family.export().await;
    data.documents = state.documents.export().await;
    data.transactions = state.transactions.export().await;
    log::info!("exported {} records", data.record_count());
    data
}

pub async fn import_backup(state: &AppState, data: BackupData) -> DomainResult<RestoreReport> {
    let mut report = RestoreReport::default();
    restore_into(&state.staff, data.staff, &mut report).await?;
    restore_into(&state.bills, data.bills, &mut report).await?;
    restore_into(&state.groceries, data.groceries, &mut report).await?;
    restore_into(&state.events, data.events, &mut report).await?;
    restore_into(&state.vehicles, data.vehicles, &mut report).await?;
    restore_into(&state.family, data.family, &mut report).await?;
    restore_into(&state.documents, data.documents, &mut report).await?;
    restore_into(&state.transactions, data.transactions, &mut report).await?;

    let total = report.total();
    log::info!(
        "backup restored: {} inserted, {} replaced, {} skipped",
        total.inserted,
        total.replaced,
        total.skipped
    );
    Ok(report)
}

pub async fn export_backup_to(state: &AppState, path: &Path) -> DomainResult<usize> {
    let data = export_backup(state).await;
    data.write_to(path)?;
    log::info!("backup written to {}", path.display());
    Ok(data.record_count())
}

pub async fn import_backup_from(state: &AppState, path: &Path) -> DomainResult<RestoreReport> {
    let data = BackupData::read_from(path)?;
    import_backup(state, data).await
}

async fn restore_into<T: Entity>(
    collection: &Collection<T>,
    records: Vec<T>,
    report: &mut RestoreReport,
) -> DomainResult<()> {
    if records.is_empty() {
        return Ok(());
    }
    let merged = collection.merge(records).await?;
    report.push(T::KIND, merged);
    Ok(())
}
