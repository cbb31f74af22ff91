// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the database.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using the CareDatabase for all transactions.

pub mod accounts;
pub mod preferences;
pub mod relationships;
pub mod sessions;

pub use accounts::{normalize_email, AccountRepository, StoredAccount};
pub use preferences::{NotificationChannel, PreferenceRepository, StoredPreference};
pub use relationships::{
    NewRelationship, PermissionLevel, RelationshipCategory, RelationshipPatch,
    RelationshipRepository, StoredRelationship,
};
pub use sessions::{SessionRepository, StoredSession};
