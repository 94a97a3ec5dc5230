//! Vehicle Entity
//!
//! Owns its service history and attached documents; both go away with the
//! vehicle.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::document::{Attachment, ExpiryStatus};
use super::entity::{contains_ci, DomainResult, Entity, RecordMeta, Searchable};
use super::validate::{optional_text, require_positive, require_text};
use super::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub date: NaiveDate,
    /// Kilometres
    pub odometer: u64,
    pub service: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub registration_number: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub fuel_type: String,
    pub model: String,
    pub year: u16,
    #[serde(default, alias = "insuranceExpiryDate", skip_serializing_if = "Option::is_none")]
    pub insurance_expiry: Option<NaiveDate>,
    #[serde(default, alias = "pollutionExpiryDate", skip_serializing_if = "Option::is_none")]
    pub pollution_expiry: Option<NaiveDate>,
    /// Newest first
    #[serde(default)]
    pub service_history: Vec<ServiceRecord>,
    #[serde(default)]
    pub documents: Vec<Attachment>,
}

impl Vehicle {
    /// Insert keeping the history ordered by date, newest first
    pub fn add_service_record(&mut self, record: ServiceRecord) {
        let pos = self
            .service_history
            .iter()
            .position(|r| r.date < record.date)
            .unwrap_or(self.service_history.len());
        self.service_history.insert(pos, record);
    }

    pub fn last_service(&self) -> Option<&ServiceRecord> {
        self.service_history.first()
    }

    pub fn total_service_cost(&self) -> f64 {
        self.service_history.iter().map(|r| r.cost).sum()
    }

    pub fn insurance_status(&self, today: NaiveDate) -> ExpiryStatus {
        ExpiryStatus::classify(self.insurance_expiry, today)
    }

    pub fn pollution_status(&self, today: NaiveDate) -> ExpiryStatus {
        ExpiryStatus::classify(self.pollution_expiry, today)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleDraft {
    pub name: String,
    pub registration_number: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub fuel_type: String,
    pub model: String,
    pub year: Option<u16>,
    pub insurance_expiry: Option<NaiveDate>,
    pub pollution_expiry: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehiclePatch {
    pub name: Option<String>,
    pub registration_number: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
    pub model: Option<String>,
    pub year: Option<u16>,
    #[serde(default, deserialize_with = "super::entity::double_option", skip_serializing_if = "Option::is_none")]
    pub insurance_expiry: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::entity::double_option", skip_serializing_if = "Option::is_none")]
    pub pollution_expiry: Option<Option<NaiveDate>>,
}

impl Entity for Vehicle {
    type Draft = VehicleDraft;
    type Patch = VehiclePatch;

    const KIND: &'static str = "vehicle";
    const ID_PREFIX: &'static str = "vehicle";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn from_draft(meta: RecordMeta, draft: VehicleDraft) -> DomainResult<Self> {
        let year = draft
            .year
            .ok_or_else(|| DomainError::validation("year", "is required"))?;

        Ok(Self {
            meta,
            name: draft.name.trim().to_string(),
            registration_number: draft.registration_number.trim().to_uppercase(),
            vehicle_type: draft.vehicle_type.trim().to_string(),
            fuel_type: draft.fuel_type.trim().to_string(),
            model: draft.model.trim().to_string(),
            year,
            insurance_expiry: draft.insurance_expiry,
            pollution_expiry: draft.pollution_expiry,
            service_history: Vec::new(),
            documents: Vec::new(),
        })
    }

    fn apply_patch(&mut self, patch: VehiclePatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(reg) = patch.registration_number {
            self.registration_number = reg.trim().to_uppercase();
        }
        if let Some(kind) = patch.vehicle_type {
            self.vehicle_type = kind.trim().to_string();
        }
        if let Some(fuel) = patch.fuel_type {
            self.fuel_type = fuel.trim().to_string();
        }
        if let Some(model) = patch.model {
            self.model = model.trim().to_string();
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(expiry) = patch.insurance_expiry {
            self.insurance_expiry = expiry;
        }
        if let Some(expiry) = patch.pollution_expiry {
            self.pollution_expiry = expiry;
        }
    }

    fn validate(&self) -> DomainResult<()> {
        require_text("name", &self.name)?;
        require_text("registrationNumber", &self.registration_number)?;
        require_text("type", &self.vehicle_type)?;
        require_text("fuelType", &self.fuel_type)?;
        require_text("model", &self.model)?;
        if self.year < 1900 {
            return Err(DomainError::validation("year", "must be 1900 or later"));
        }
        for record in &self.service_history {
            require_text("serviceHistory.service", &record.service)?;
            require_positive("serviceHistory.cost", record.cost)?;
        }
        for doc in &self.documents {
            doc.validate()?;
        }
        Ok(())
    }
}

impl Searchable for Vehicle {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || contains_ci(&self.registration_number, needle)
            || contains_ci(&self.model, needle)
    }
}

/// Service record input; cost is checked again by `Vehicle::validate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceDraft {
    pub date: Option<NaiveDate>,
    pub odometer: Option<u64>,
    pub service: String,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

impl ServiceDraft {
    pub fn into_record(self) -> DomainResult<ServiceRecord> {
        let date = self
            .date
            .ok_or_else(|| DomainError::validation("date", "is required"))?;
        let odometer = self
            .odometer
            .ok_or_else(|| DomainError::validation("odometer", "is required"))?;
        let cost = self
            .cost
            .ok_or_else(|| DomainError::validation("cost", "is required"))?;
        require_positive("cost", cost)?;
        require_text("service", &self.service)?;

        // Free-text notes are folded into the service description
        let service = match optional_text(self.notes) {
            Some(notes) => format!("{} ({})", self.service.trim(), notes),
            None => self.service.trim().to_string(),
        };

        Ok(ServiceRecord {
            date,
            odometer,
            service,
            cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn car() -> Vehicle {
        let draft = VehicleDraft {
            name: "Honda City".into(),
            registration_number: "dl 01 ab 1234".into(),
            vehicle_type: "Car".into(),
            fuel_type: "Petrol".into(),
            model: "City ZX".into(),
            year: Some(2022),
            insurance_expiry: Some(date("2025-07-20")),
            pollution_expiry: None,
        };
        Vehicle::from_draft(RecordMeta::new("vehicle-1".into(), Utc::now()), draft).unwrap()
    }

    fn service(day: &str, cost: f64) -> ServiceRecord {
        ServiceRecord {
            date: date(day),
            odometer: 10000,
            service: "Oil change".into(),
            cost,
        }
    }

    #[test]
    fn test_service_history_newest_first() {
        let mut v = car();
        v.add_service_record(service("2024-06-15", 4500.0));
        v.add_service_record(service("2024-12-10", 3500.0));
        v.add_service_record(service("2024-09-01", 1200.0));

        let dates: Vec<NaiveDate> = v.service_history.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2024-12-10"), date("2024-09-01"), date("2024-06-15")]);
        assert_eq!(v.last_service().unwrap().cost, 3500.0);
        assert_eq!(v.total_service_cost(), 9200.0);
    }

    #[test]
    fn test_expiry_statuses() {
        let v = car();
        let today = date("2025-07-01");
        assert_eq!(v.insurance_status(today), ExpiryStatus::ExpiringSoon(19));
        assert_eq!(v.pollution_status(today), ExpiryStatus::NotAvailable);
        assert_eq!(v.insurance_status(date("2025-08-01")), ExpiryStatus::Expired);
    }

    #[test]
    fn test_type_field_name() {
        let json = serde_json::to_value(car()).unwrap();
        assert_eq!(json["type"], "Car");
        assert_eq!(json["registrationNumber"], "DL 01 AB 1234");
    }

    #[test]
    fn test_patch_json_null_clears_insurance() {
        let mut v = car();
        let patch: VehiclePatch = serde_json::from_str(r#"{"insuranceExpiry":null}"#).unwrap();
        assert_eq!(patch.insurance_expiry, Some(None));
        assert_eq!(patch.pollution_expiry, None);
        v.apply_patch(patch);
        assert_eq!(v.insurance_expiry, None);
        assert_eq!(v.insurance_status(date("2025-07-01")), ExpiryStatus::NotAvailable);
    }

    #[test]
    fn test_service_draft_requires_cost() {
        let draft = ServiceDraft {
            date: Some(date("2025-01-01")),
            odometer: Some(15000),
            service: "General service".into(),
            cost: Some(0.0),
            notes: None,
        };
        assert_eq!(
            draft.into_record(),
            Err(DomainError::validation("cost", "must be greater than 0"))
        );
    }
}
