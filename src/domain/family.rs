//! Family Member Entity
//!
//! Health details and documents are owned by the member record.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::document::Attachment;
use super::entity::{contains_ci, DomainResult, Entity, RecordMeta, Searchable};
use super::validate::{optional_text, require_text};
use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    Admin,
    #[default]
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthDetails {
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub medications: Vec<Medication>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub relationship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(default, alias = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: FamilyRole,
    #[serde(default, alias = "healthDetails")]
    pub health: HealthDetails,
    #[serde(default)]
    pub documents: Vec<Attachment>,
}

impl FamilyMember {
    /// Whole years as of `today`
    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        let born = self.date_of_birth?;
        if born > today {
            return None;
        }
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Case-insensitive; returns false when already present
    pub fn add_allergy(&mut self, allergy: &str) -> bool {
        add_unique(&mut self.health.allergies, allergy)
    }

    /// Returns false when the allergy was not listed
    pub fn remove_allergy(&mut self, allergy: &str) -> bool {
        let before = self.health.allergies.len();
        self.health
            .allergies
            .retain(|a| !a.eq_ignore_ascii_case(allergy.trim()));
        self.health.allergies.len() != before
    }

    pub fn add_condition(&mut self, condition: &str) -> bool {
        add_unique(&mut self.health.conditions, condition)
    }

    pub fn add_medication(&mut self, medication: Medication) {
        self.health.medications.push(Medication {
            name: medication.name.trim().to_string(),
            dosage: medication.dosage.trim().to_string(),
            frequency: medication.frequency.trim().to_string(),
            time: optional_text(medication.time),
        });
    }
}

fn add_unique(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || list.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        return false;
    }
    list.push(value.to_string());
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FamilyDraft {
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_group: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: FamilyRole,
    #[serde(alias = "healthDetails")]
    pub health: HealthDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FamilyPatch {
    pub name: Option<String>,
    pub relationship: Option<String>,
    #[serde(default, deserialize_with = "super::entity::double_option", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub blood_group: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<FamilyRole>,
}

impl Entity for FamilyMember {
    type Draft = FamilyDraft;
    type Patch = FamilyPatch;

    const KIND: &'static str = "family";
    const ID_PREFIX: &'static str = "member";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn from_draft(meta: RecordMeta, draft: FamilyDraft) -> DomainResult<Self> {
        let mut member = Self {
            meta,
            name: draft.name.trim().to_string(),
            relationship: draft.relationship.trim().to_string(),
            date_of_birth: draft.date_of_birth,
            blood_group: optional_text(draft.blood_group),
            phone: optional_text(draft.phone),
            email: optional_text(draft.email),
            role: draft.role,
            health: HealthDetails::default(),
            documents: Vec::new(),
        };
        for allergy in &draft.health.allergies {
            member.add_allergy(allergy);
        }
        for condition in &draft.health.conditions {
            member.add_condition(condition);
        }
        for medication in draft.health.medications {
            member.add_medication(medication);
        }
        Ok(member)
    }

    fn apply_patch(&mut self, patch: FamilyPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(relationship) = patch.relationship {
            self.relationship = relationship.trim().to_string();
        }
        if let Some(dob) = patch.date_of_birth {
            self.date_of_birth = dob;
        }
        if patch.blood_group.is_some() {
            self.blood_group = optional_text(patch.blood_group);
        }
        if patch.phone.is_some() {
            self.phone = optional_text(patch.phone);
        }
        if patch.email.is_some() {
            self.email = optional_text(patch.email);
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }

    fn validate(&self) -> DomainResult<()> {
        require_text("name", &self.name)?;
        require_text("relationship", &self.relationship)?;
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(DomainError::validation("email", "must be a valid email address"));
            }
        }
        for medication in &self.health.medications {
            require_text("medications.name", &medication.name)?;
            require_text("medications.dosage", &medication.dosage)?;
            require_text("medications.frequency", &medication.frequency)?;
        }
        for doc in &self.documents {
            doc.validate()?;
        }
        Ok(())
    }
}

impl Searchable for FamilyMember {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle) || contains_ci(&self.relationship, needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rajesh() -> FamilyMember {
        let draft = FamilyDraft {
            name: "Rajesh Kumar".into(),
            relationship: "Self".into(),
            date_of_birth: Some(date("1980-05-15")),
            blood_group: Some("B+".into()),
            email: Some("rajesh@example.com".into()),
            role: FamilyRole::Admin,
            health: HealthDetails {
                allergies: vec!["Peanuts".into(), "peanuts".into(), "Dust".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        FamilyMember::from_draft(RecordMeta::new("member-1".into(), Utc::now()), draft).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let m = rajesh();
        assert_eq!(m.age(date("2025-05-14")), Some(44));
        assert_eq!(m.age(date("2025-05-15")), Some(45));
        assert_eq!(m.age(date("1970-01-01")), None);
    }

    #[test]
    fn test_allergies_are_deduplicated() {
        let mut m = rajesh();
        assert_eq!(m.health.allergies, vec!["Peanuts".to_string(), "Dust".to_string()]);
        assert!(!m.add_allergy("DUST"));
        assert!(m.add_allergy("Pollen"));
        assert!(m.remove_allergy("peanuts"));
        assert!(!m.remove_allergy("Shellfish"));
        assert_eq!(m.health.allergies, vec!["Dust".to_string(), "Pollen".to_string()]);
    }

    #[test]
    fn test_email_must_contain_at() {
        let mut m = rajesh();
        m.email = Some("rajesh.example.com".into());
        assert_eq!(
            m.validate(),
            Err(DomainError::validation("email", "must be a valid email address"))
        );
        m.apply_patch(FamilyPatch {
            email: Some("  ".into()),
            ..Default::default()
        });
        assert!(m.email.is_none());
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_health_details_alias() {
        let json = r#"{"id":"2","name":"Priya Kumar","relationship":"Spouse","role":"admin",
            "healthDetails":{"allergies":["Seafood"],"conditions":[],"medications":[]},
            "documents":[{"id":"d3","name":"Aadhar Card","path":"/documents/priya/aadhar.pdf"}],
            "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#;
        let m: FamilyMember = serde_json::from_str(json).unwrap();
        assert_eq!(m.health.allergies, vec!["Seafood".to_string()]);
        assert_eq!(m.documents[0].name, "Aadhar Card");
        let out = serde_json::to_value(&m).unwrap();
        assert!(out.get("healthDetails").is_none());
        assert_eq!(out["health"]["allergies"][0], "Seafood");
    }
}
