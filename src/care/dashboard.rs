// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caregiver dashboard projection.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{PermissionLevel, RelationshipCategory, StoredAccount, StoredRelationship};

/// One linked patient as seen by a caregiver.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PatientSummary {
    pub relationship_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub category: RelationshipCategory,
    pub permission_level: PermissionLevel,
    pub can_view_adherence: bool,
    pub can_modify_schedule: bool,
    pub emergency_contact: bool,
}

impl PatientSummary {
    /// Project a relationship and its patient account into a summary row.
    pub fn project(relationship: &StoredRelationship, patient: &StoredAccount) -> Self {
        Self {
            relationship_id: relationship.id.clone(),
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            patient_email: patient.email.clone(),
            category: relationship.category,
            permission_level: relationship.permission_level,
            can_view_adherence: relationship.can_view_adherence,
            can_modify_schedule: relationship.can_modify_schedule,
            emergency_contact: relationship.emergency_contact,
        }
    }
}
