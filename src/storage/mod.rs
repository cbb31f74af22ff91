// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for accounts, caregiver relationships, notification
//! preferences, login sessions and the audit trail, backed by a single
//! embedded redb database.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   carelink.redb     # all tables, see `database` for the layout
//! ```
//!
//! ## Consistency
//!
//! - Uniqueness constraints (account email, relationship pair) are checked
//!   and written inside one write transaction
//! - redb serializes write transactions, so these checks cannot race
//! - Reads use snapshot read transactions

pub mod audit;
pub mod database;
pub mod ownership;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use database::{CareDatabase, StoreError, StoreResult};
pub use ownership::{OwnedResource, OwnershipEnforcer};
pub use repository::{
    normalize_email, AccountRepository, NewRelationship, NotificationChannel, PermissionLevel,
    PreferenceRepository, RelationshipCategory, RelationshipPatch, RelationshipRepository,
    SessionRepository, StoredAccount, StoredPreference, StoredRelationship, StoredSession,
};
