// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relationship authorization engine.
//!
//! Every operation takes the acting account explicitly. Rules, in the order
//! they are checked:
//!
//! | Operation | Rule |
//! |-----------|------|
//! | create | actor is PATIENT, caregiver email resolves to a CAREGIVER, pair is new |
//! | list | relationships where the actor is either party |
//! | update | relationship exists (`NotFound`), actor is its patient (`Forbidden`) |
//! | delete | lookup scoped to the actor as patient, anything else is `NotFound` |
//! | dashboard | actor is CAREGIVER, only their own relationships |

use chrono::Utc;

use crate::audit_log;
use crate::auth::{AuthenticatedUser, Role};
use crate::models::{CreatePreferenceRequest, CreateRelationshipRequest, UpdateRelationshipRequest};
use crate::storage::{
    AccountRepository, AuditEvent, AuditEventType, CareDatabase, NewRelationship,
    OwnershipEnforcer, PreferenceRepository, RelationshipPatch, RelationshipRepository,
    StoreError, StoredPreference, StoredRelationship,
};

use super::dashboard::PatientSummary;
use super::error::{CareError, CareResult, FieldErrors};

pub const MAX_NOTES_LEN: usize = 1000;
pub const MAX_REMINDER_LEAD_MINUTES: u32 = 24 * 60;

/// Authorization-checked access to relationships and preferences.
pub struct CareEngine<'a> {
    db: &'a CareDatabase,
}

impl<'a> CareEngine<'a> {
    pub fn new(db: &'a CareDatabase) -> Self {
        Self { db }
    }

    /// Link the acting patient to an existing caregiver.
    ///
    /// Store failures other than a duplicate pair surface as `Unexpected`.
    pub fn create_relationship(
        &self,
        actor: &AuthenticatedUser,
        request: &CreateRelationshipRequest,
    ) -> CareResult<StoredRelationship> {
        if !actor.role.owns_relationships() {
            self.deny(actor, "create relationship");
            return Err(CareError::ForbiddenRole);
        }

        let mut fields = FieldErrors::new();
        if request.caregiver_email.trim().is_empty() {
            fields.add("caregiver_email", "This field is required");
        }
        validate_notes(&request.notes, &mut fields);
        fields.into_result()?;

        let caregiver = AccountRepository::new(self.db)
            .find_by_email_and_role(&request.caregiver_email, Role::Caregiver)
            .map_err(unexpected)?
            .ok_or(CareError::CaregiverNotFound)?;

        let (default_view, default_modify) = request.permission_level.default_flags();
        let new = NewRelationship {
            patient_id: actor.user_id.clone(),
            caregiver_id: caregiver.id,
            category: request.category,
            permission_level: request.permission_level,
            can_view_adherence: request.can_view_adherence.unwrap_or(default_view),
            can_modify_schedule: request.can_modify_schedule.unwrap_or(default_modify),
            emergency_contact: request.emergency_contact,
            notes: request.notes.clone(),
        };

        let relationship = match RelationshipRepository::new(self.db).create(new) {
            Ok(relationship) => relationship,
            Err(StoreError::AlreadyExists(_)) => {
                tracing::debug!(user_id = %actor.user_id, "Duplicate relationship rejected");
                return Err(CareError::DuplicateRelationship);
            }
            Err(e) => return Err(unexpected(e)),
        };

        tracing::info!(
            user_id = %actor.user_id,
            relationship_id = %relationship.id,
            caregiver_id = %relationship.caregiver_id,
            "Relationship created"
        );
        audit_log!(
            self.db,
            AuditEvent::new(AuditEventType::RelationshipCreated)
                .with_user(&actor.user_id)
                .with_resource("relationship", &relationship.id)
                .with_details(serde_json::json!({
                    "caregiver_id": relationship.caregiver_id,
                    "permission_level": relationship.permission_level,
                }))
        );
        Ok(relationship)
    }

    /// Relationships in which the actor is the patient or the caregiver.
    pub fn list_relationships(&self, actor: &AuthenticatedUser) -> CareResult<Vec<StoredRelationship>> {
        Ok(RelationshipRepository::new(self.db).list_by_either_party(&actor.user_id)?)
    }

    /// Partially update a relationship owned by the actor.
    ///
    /// Nothing is written unless the whole patch is valid.
    pub fn update_relationship(
        &self,
        actor: &AuthenticatedUser,
        relationship_id: &str,
        request: UpdateRelationshipRequest,
    ) -> CareResult<StoredRelationship> {
        let repo = RelationshipRepository::new(self.db);
        let existing = repo.get(relationship_id).map_err(not_found)?;

        if existing.verify_ownership(actor).is_err() {
            self.deny(actor, relationship_id);
            return Err(CareError::Forbidden);
        }

        let patch = RelationshipPatch::from(request);
        let mut fields = FieldErrors::new();
        if let Some(notes) = patch.notes.as_deref() {
            validate_notes(notes, &mut fields);
        }
        fields.into_result()?;

        let updated = repo.update(relationship_id, patch).map_err(not_found)?;

        tracing::info!(user_id = %actor.user_id, relationship_id = %relationship_id, "Relationship updated");
        audit_log!(
            self.db,
            AuditEventType::RelationshipUpdated,
            &actor.user_id,
            "relationship",
            relationship_id
        );
        Ok(updated)
    }

    /// Delete a relationship owned by the actor.
    ///
    /// The lookup is scoped to the actor as patient, so a relationship the
    /// actor does not own is reported as `NotFound`.
    pub fn delete_relationship(&self, actor: &AuthenticatedUser, relationship_id: &str) -> CareResult<()> {
        let repo = RelationshipRepository::new(self.db);
        repo.get_scoped(relationship_id, &actor.user_id)
            .map_err(not_found)?;
        repo.delete(relationship_id).map_err(not_found)?;

        tracing::info!(user_id = %actor.user_id, relationship_id = %relationship_id, "Relationship deleted");
        audit_log!(
            self.db,
            AuditEventType::RelationshipDeleted,
            &actor.user_id,
            "relationship",
            relationship_id
        );
        Ok(())
    }

    /// Linked patients for the acting caregiver.
    pub fn caregiver_dashboard(&self, actor: &AuthenticatedUser) -> CareResult<Vec<PatientSummary>> {
        if !actor.role.reads_dashboard() {
            self.deny(actor, "caregiver dashboard");
            return Err(CareError::ForbiddenRole);
        }

        let accounts = AccountRepository::new(self.db);
        let relationships = RelationshipRepository::new(self.db).list_by_caregiver(&actor.user_id)?;

        let mut summaries = Vec::with_capacity(relationships.len());
        for relationship in &relationships {
            match accounts.get(&relationship.patient_id) {
                Ok(patient) => summaries.push(PatientSummary::project(relationship, &patient)),
                Err(StoreError::NotFound(_)) => {
                    tracing::warn!(
                        relationship_id = %relationship.id,
                        patient_id = %relationship.patient_id,
                        "Skipping relationship with missing patient account"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(summaries)
    }

    /// Store a notification preference for the actor.
    pub fn create_preference(
        &self,
        actor: &AuthenticatedUser,
        request: &CreatePreferenceRequest,
    ) -> CareResult<StoredPreference> {
        let mut fields = FieldErrors::new();
        if request.reminder_lead_minutes > MAX_REMINDER_LEAD_MINUTES {
            fields.add(
                "reminder_lead_minutes",
                format!("Must be at most {MAX_REMINDER_LEAD_MINUTES}"),
            );
        }
        if request.quiet_hours_start.is_some() != request.quiet_hours_end.is_some() {
            fields.add(
                "quiet_hours",
                "quiet_hours_start and quiet_hours_end must be set together",
            );
        }
        fields.into_result()?;

        let preference = StoredPreference {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: actor.user_id.clone(),
            channel: request.channel,
            medication_reminders: request.medication_reminders,
            missed_dose_alerts: request.missed_dose_alerts,
            reminder_lead_minutes: request.reminder_lead_minutes,
            quiet_hours_start: request.quiet_hours_start,
            quiet_hours_end: request.quiet_hours_end,
            created_at: Utc::now(),
        };
        PreferenceRepository::new(self.db).create(&preference)?;

        tracing::info!(user_id = %actor.user_id, preference_id = %preference.id, "Notification preference created");
        audit_log!(
            self.db,
            AuditEventType::PreferenceCreated,
            &actor.user_id,
            "notification_preference",
            &preference.id
        );
        Ok(preference)
    }

    /// The actor's notification preferences.
    pub fn list_preferences(&self, actor: &AuthenticatedUser) -> CareResult<Vec<StoredPreference>> {
        let preferences = PreferenceRepository::new(self.db).list_by_user(&actor.user_id)?;
        for preference in &preferences {
            preference.verify_ownership(actor)?;
        }
        Ok(preferences)
    }

    fn deny(&self, actor: &AuthenticatedUser, target: &str) {
        tracing::warn!(user_id = %actor.user_id, role = %actor.role, target = %target, "Permission denied");
        audit_log!(
            self.db,
            AuditEvent::new(AuditEventType::PermissionDenied)
                .with_user(&actor.user_id)
                .failed(target)
        );
    }
}

fn validate_notes(notes: &str, fields: &mut FieldErrors) {
    if notes.chars().count() > MAX_NOTES_LEN {
        fields.add("notes", format!("Must be at most {MAX_NOTES_LEN} characters"));
    }
}

fn not_found(e: StoreError) -> CareError {
    match e {
        StoreError::NotFound(_) => CareError::NotFound,
        other => other.into(),
    }
}

fn unexpected(e: StoreError) -> CareError {
    CareError::Unexpected(e.to_string())
}
