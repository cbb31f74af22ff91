// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caregiver relationship repository.
//!
//! A relationship is a directed link from one patient account to one
//! caregiver account. At most one relationship exists per
//! (patient, caregiver) pair: the `relationship_pairs` table is checked and
//! written in the same write transaction as the record itself, so racing
//! creators for the same pair cannot both succeed.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::database::{
    decode, encode, ids_for_party, index_key, CareDatabase, StoreError, StoreResult,
    RELATIONSHIPS, RELATIONSHIPS_BY_CAREGIVER, RELATIONSHIPS_BY_PATIENT, RELATIONSHIP_PAIRS,
};

/// Kind of relationship between a patient and a caregiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipCategory {
    #[default]
    Family,
    Professional,
    Friend,
    Other,
}

/// Coarse capability tier granted to the caregiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    /// Caregiver may view adherence data
    #[default]
    View,
    /// Caregiver may also modify medication schedules
    Modify,
}

impl PermissionLevel {
    /// Capability flags `(can_view_adherence, can_modify_schedule)` a new
    /// relationship starts with when the patient doesn't set them.
    pub fn default_flags(&self) -> (bool, bool) {
        match self {
            PermissionLevel::View => (true, false),
            PermissionLevel::Modify => (true, true),
        }
    }
}

/// Caregiver relationship stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredRelationship {
    /// Unique relationship identifier (UUID)
    pub id: String,
    /// Patient account (the relationship owner)
    pub patient_id: String,
    /// Caregiver account
    pub caregiver_id: String,
    /// Relationship category
    pub category: RelationshipCategory,
    /// Permission level granted to the caregiver
    pub permission_level: PermissionLevel,
    /// Whether the caregiver may view adherence data
    pub can_view_adherence: bool,
    /// Whether the caregiver may modify schedules
    pub can_modify_schedule: bool,
    /// Whether the caregiver is an emergency contact
    pub emergency_contact: bool,
    /// Free-text notes from the patient
    pub notes: String,
    /// When the relationship was created
    pub created_at: DateTime<Utc>,
    /// When the relationship was last updated
    pub updated_at: DateTime<Utc>,
}

/// Fields of a relationship about to be created.
#[derive(Debug, Clone)]
pub struct NewRelationship {
    pub patient_id: String,
    pub caregiver_id: String,
    pub category: RelationshipCategory,
    pub permission_level: PermissionLevel,
    pub can_view_adherence: bool,
    pub can_modify_schedule: bool,
    pub emergency_contact: bool,
    pub notes: String,
}

/// Partial update of a relationship. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipPatch {
    pub category: Option<RelationshipCategory>,
    pub permission_level: Option<PermissionLevel>,
    pub can_view_adherence: Option<bool>,
    pub can_modify_schedule: Option<bool>,
    pub emergency_contact: Option<bool>,
    pub notes: Option<String>,
}

impl RelationshipPatch {
    fn apply(self, relationship: &mut StoredRelationship) {
        if let Some(category) = self.category {
            relationship.category = category;
        }
        if let Some(level) = self.permission_level {
            relationship.permission_level = level;
        }
        if let Some(flag) = self.can_view_adherence {
            relationship.can_view_adherence = flag;
        }
        if let Some(flag) = self.can_modify_schedule {
            relationship.can_modify_schedule = flag;
        }
        if let Some(flag) = self.emergency_contact {
            relationship.emergency_contact = flag;
        }
        if let Some(notes) = self.notes {
            relationship.notes = notes;
        }
    }
}

fn pair_key(patient_id: &str, caregiver_id: &str) -> String {
    format!("{patient_id}|{caregiver_id}")
}

/// Repository for caregiver relationships.
pub struct RelationshipRepository<'a> {
    db: &'a CareDatabase,
}

impl<'a> RelationshipRepository<'a> {
    pub fn new(db: &'a CareDatabase) -> Self {
        Self { db }
    }

    /// Create a relationship.
    ///
    /// Returns `AlreadyExists` if the (patient, caregiver) pair is already
    /// linked. The pair check and every insert happen in one write
    /// transaction.
    pub fn create(&self, new: NewRelationship) -> StoreResult<StoredRelationship> {
        let now = Utc::now();
        let relationship = StoredRelationship {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: new.patient_id,
            caregiver_id: new.caregiver_id,
            category: new.category,
            permission_level: new.permission_level,
            can_view_adherence: new.can_view_adherence,
            can_modify_schedule: new.can_modify_schedule,
            emergency_contact: new.emergency_contact,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        let json = encode(&relationship)?;
        let pair = pair_key(&relationship.patient_id, &relationship.caregiver_id);

        let write_txn = self.db.inner().begin_write()?;
        {
            let mut pairs = write_txn.open_table(RELATIONSHIP_PAIRS)?;
            if pairs.get(pair.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("Relationship {pair}")));
            }
            pairs.insert(pair.as_str(), relationship.id.as_str())?;

            let mut records = write_txn.open_table(RELATIONSHIPS)?;
            records.insert(relationship.id.as_str(), json.as_slice())?;

            let mut by_patient = write_txn.open_table(RELATIONSHIPS_BY_PATIENT)?;
            let key = index_key(&relationship.patient_id, &relationship.id);
            by_patient.insert(key.as_slice(), relationship.id.as_str())?;

            let mut by_caregiver = write_txn.open_table(RELATIONSHIPS_BY_CAREGIVER)?;
            let key = index_key(&relationship.caregiver_id, &relationship.id);
            by_caregiver.insert(key.as_slice(), relationship.id.as_str())?;
        }
        write_txn.commit()?;

        Ok(relationship)
    }

    /// Get a relationship by ID.
    pub fn get(&self, relationship_id: &str) -> StoreResult<StoredRelationship> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(RELATIONSHIPS)?;
        match table.get(relationship_id)? {
            Some(value) => decode(value.value()),
            None => Err(StoreError::NotFound(format!("Relationship {relationship_id}"))),
        }
    }

    /// Get a relationship by ID, scoped to its patient.
    ///
    /// A relationship owned by another patient is reported as `NotFound`.
    pub fn get_scoped(&self, relationship_id: &str, patient_id: &str) -> StoreResult<StoredRelationship> {
        let relationship = self.get(relationship_id)?;
        if relationship.patient_id != patient_id {
            return Err(StoreError::NotFound(format!("Relationship {relationship_id}")));
        }
        Ok(relationship)
    }

    /// List every relationship where the account is either the patient or
    /// the caregiver. Both indexes are read from one snapshot.
    pub fn list_by_either_party(&self, account_id: &str) -> StoreResult<Vec<StoredRelationship>> {
        let read_txn = self.db.inner().begin_read()?;
        let by_patient = read_txn.open_table(RELATIONSHIPS_BY_PATIENT)?;
        let by_caregiver = read_txn.open_table(RELATIONSHIPS_BY_CAREGIVER)?;
        let records = read_txn.open_table(RELATIONSHIPS)?;

        let mut seen = BTreeSet::new();
        let mut relationships = Vec::new();
        let ids = ids_for_party(&by_patient, account_id)?
            .into_iter()
            .chain(ids_for_party(&by_caregiver, account_id)?);

        for id in ids {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(value) = records.get(id.as_str())? {
                relationships.push(decode(value.value())?);
            }
        }

        Ok(relationships)
    }

    /// List every relationship where the account is the caregiver.
    pub fn list_by_caregiver(&self, caregiver_id: &str) -> StoreResult<Vec<StoredRelationship>> {
        let read_txn = self.db.inner().begin_read()?;
        let by_caregiver = read_txn.open_table(RELATIONSHIPS_BY_CAREGIVER)?;
        let records = read_txn.open_table(RELATIONSHIPS)?;

        let mut relationships = Vec::new();
        for id in ids_for_party(&by_caregiver, caregiver_id)? {
            if let Some(value) = records.get(id.as_str())? {
                relationships.push(decode(value.value())?);
            }
        }

        Ok(relationships)
    }

    /// Apply a partial update and return the updated relationship.
    pub fn update(&self, relationship_id: &str, patch: RelationshipPatch) -> StoreResult<StoredRelationship> {
        let write_txn = self.db.inner().begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(RELATIONSHIPS)?;

            let existing_bytes = {
                let existing = table.get(relationship_id)?.ok_or_else(|| {
                    StoreError::NotFound(format!("Relationship {relationship_id}"))
                })?;
                existing.value().to_vec()
            };

            let mut relationship: StoredRelationship = decode(&existing_bytes)?;
            patch.apply(&mut relationship);
            relationship.updated_at = Utc::now();

            let json = encode(&relationship)?;
            table.insert(relationship_id, json.as_slice())?;
            relationship
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a relationship and its index entries.
    pub fn delete(&self, relationship_id: &str) -> StoreResult<()> {
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut records = write_txn.open_table(RELATIONSHIPS)?;
            let relationship: StoredRelationship = {
                let removed = records.remove(relationship_id)?.ok_or_else(|| {
                    StoreError::NotFound(format!("Relationship {relationship_id}"))
                })?;
                decode(removed.value())?
            };

            let mut pairs = write_txn.open_table(RELATIONSHIP_PAIRS)?;
            let pair = pair_key(&relationship.patient_id, &relationship.caregiver_id);
            pairs.remove(pair.as_str())?;

            let mut by_patient = write_txn.open_table(RELATIONSHIPS_BY_PATIENT)?;
            let key = index_key(&relationship.patient_id, &relationship.id);
            by_patient.remove(key.as_slice())?;

            let mut by_caregiver = write_txn.open_table(RELATIONSHIPS_BY_CAREGIVER)?;
            let key = index_key(&relationship.caregiver_id, &relationship.id);
            by_caregiver.remove(key.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
