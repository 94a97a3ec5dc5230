//! Family and health commands

use crate::domain::{
    Attachment, DomainError, DomainResult, FamilyDraft, FamilyMember, FamilyPatch, Medication,
};
use crate::repository::ListQuery;
use crate::AppState;

pub async fn list_family(state: &AppState) -> Vec<FamilyMember> {
    state.family.list(&ListQuery::all()).await
}

pub async fn get_family_member(state: &AppState, id: &str) -> DomainResult<FamilyMember> {
    state.family.find(id).await
}

pub async fn create_family_member(state: &AppState, draft: FamilyDraft) -> DomainResult<FamilyMember> {
    state.family.create(draft).await
}

pub async fn update_family_member(
    state: &AppState,
    id: &str,
    patch: FamilyPatch,
) -> DomainResult<FamilyMember> {
    state.family.update(id, patch).await
}

pub async fn delete_family_member(state: &AppState, id: &str) -> DomainResult<()> {
    state.family.remove(id).await
}

pub async fn add_allergy(state: &AppState, id: &str, allergy: &str) -> DomainResult<FamilyMember> {
    state
        .family
        .mutate(id, |member| {
            if member.add_allergy(allergy) {
                Ok(())
            } else {
                Err(DomainError::validation("allergies", "is empty or already listed"))
            }
        })
        .await
}

pub async fn remove_allergy(state: &AppState, id: &str, allergy: &str) -> DomainResult<FamilyMember> {
    state
        .family
        .mutate(id, |member| {
            if member.remove_allergy(allergy) {
                Ok(())
            } else {
                Err(DomainError::not_found("allergy", allergy))
            }
        })
        .await
}

pub async fn add_condition(state: &AppState, id: &str, condition: &str) -> DomainResult<FamilyMember> {
    state
        .family
        .mutate(id, |member| {
            if member.add_condition(condition) {
                Ok(())
            } else {
                Err(DomainError::validation("conditions", "is empty or already listed"))
            }
        })
        .await
}

pub async fn add_medication(state: &AppState, id: &str, medication: Medication) -> DomainResult<FamilyMember> {
    state
        .family
        .mutate(id, move |member| {
            member.add_medication(medication);
            Ok(())
        })
        .await
}

pub async fn attach_family_document(
    state: &AppState,
    id: &str,
    name: &str,
    path: &str,
) -> DomainResult<FamilyMember> {
    let attachment = Attachment::new(name, path);
    attachment.validate()?;
    state
        .family
        .mutate(id, move |member| {
            member.documents.push(attachment);
            Ok(())
        })
        .await
}

/// Whole years today; `None` without a date of birth
pub async fn member_age(state: &AppState, id: &str) -> DomainResult<Option<u32>> {
    let member = state.family.find(id).await?;
    Ok(member.age(state.today()))
}
