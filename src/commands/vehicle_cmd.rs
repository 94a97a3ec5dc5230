//! Vehicle commands
//!
//! Fleet list, service log and document expiry alerts.

use serde::Serialize;

use crate::domain::{
    sum, Attachment, DomainResult, ExpiryStatus, ServiceDraft, Vehicle, VehicleDraft, VehiclePatch,
};
use crate::repository::ListQuery;
use crate::AppState;

pub async fn list_vehicles(state: &AppState) -> Vec<Vehicle> {
    state.vehicles.list(&ListQuery::all()).await
}

pub async fn get_vehicle(state: &AppState, id: &str) -> DomainResult<Vehicle> {
    state.vehicles.find(id).await
}

pub async fn create_vehicle(state: &AppState, draft: VehicleDraft) -> DomainResult<Vehicle> {
    let vehicle = state.vehicles.create(draft).await?;
    log::info!("vehicle {} registered as {}", vehicle.meta.id, vehicle.registration_number);
    Ok(vehicle)
}

pub async fn update_vehicle(state: &AppState, id: &str, patch: VehiclePatch) -> DomainResult<Vehicle> {
    state.vehicles.update(id, patch).await
}

/// Service history and attachments go with the vehicle
pub async fn delete_vehicle(state: &AppState, id: &str) -> DomainResult<()> {
    state.vehicles.remove(id).await
}

pub async fn add_service_record(state: &AppState, id: &str, draft: ServiceDraft) -> DomainResult<Vehicle> {
    let record = draft.into_record()?;
    state
        .vehicles
        .mutate(id, move |vehicle| {
            vehicle.add_service_record(record);
            Ok(())
        })
        .await
}

pub async fn attach_vehicle_document(
    state: &AppState,
    id: &str,
    name: &str,
    path: &str,
) -> DomainResult<Vehicle> {
    let attachment = Attachment::new(name, path);
    attachment.validate()?;
    state
        .vehicles
        .mutate(id, move |vehicle| {
            vehicle.documents.push(attachment);
            Ok(())
        })
        .await
}

/// Service spend for one vehicle
pub async fn vehicle_service_cost(state: &AppState, id: &str) -> DomainResult<f64> {
    Ok(state.vehicles.find(id).await?.total_service_cost())
}

/// Service spend across the fleet
pub async fn fleet_service_cost(state: &AppState) -> f64 {
    let vehicles = list_vehicles(state).await;
    sum(&vehicles, Vehicle::total_service_cost, None::<fn(&Vehicle) -> bool>)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpiryKind {
    Insurance,
    Pollution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryAlert {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub kind: ExpiryKind,
    pub status: ExpiryStatus,
}

/// Expired or soon-to-expire insurance and pollution certificates
pub async fn expiry_alerts(state: &AppState) -> Vec<ExpiryAlert> {
    let today = state.today();
    let mut alerts = Vec::new();
    for vehicle in list_vehicles(state).await {
        let checks = [
            (ExpiryKind::Insurance, vehicle.insurance_status(today)),
            (ExpiryKind::Pollution, vehicle.pollution_status(today)),
        ];
        for (kind, status) in checks {
            if status.needs_attention() {
                alerts.push(ExpiryAlert {
                    vehicle_id: vehicle.meta.id.clone(),
                    vehicle_name: vehicle.name.clone(),
                    kind,
                    status,
                });
            }
        }
    }
    alerts
}
