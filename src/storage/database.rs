// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded account database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: account_id → serialized StoredAccount
//! - `account_emails`: normalized email → account_id (uniqueness)
//! - `relationships`: relationship_id → serialized StoredRelationship
//! - `relationship_pairs`: `patient_id|caregiver_id` → relationship_id (uniqueness)
//! - `relationships_by_patient`: composite key (patient_id|relationship_id) → relationship_id
//! - `relationships_by_caregiver`: composite key (caregiver_id|relationship_id) → relationship_id
//! - `preferences`: preference_id → serialized StoredPreference
//! - `preferences_by_user`: composite key (user_id|preference_id) → preference_id
//! - `sessions`: session_id → serialized StoredSession
//! - `audit_events`: composite key (timestamp_be|event_id) → serialized AuditEvent
//!
//! redb allows a single write transaction at a time, so every
//! check-then-insert performed inside one write transaction is atomic with
//! respect to concurrent writers.

use std::path::Path;

use redb::{backends::InMemoryBackend, Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

pub(crate) const ACCOUNT_EMAILS: TableDefinition<&str, &str> =
    TableDefinition::new("account_emails");

pub(crate) const RELATIONSHIPS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("relationships");

/// Key format: `patient_id|caregiver_id`.
pub(crate) const RELATIONSHIP_PAIRS: TableDefinition<&str, &str> =
    TableDefinition::new("relationship_pairs");

pub(crate) const RELATIONSHIPS_BY_PATIENT: TableDefinition<&[u8], &str> =
    TableDefinition::new("relationships_by_patient");

pub(crate) const RELATIONSHIPS_BY_CAREGIVER: TableDefinition<&[u8], &str> =
    TableDefinition::new("relationships_by_caregiver");

pub(crate) const PREFERENCES: TableDefinition<&str, &[u8]> = TableDefinition::new("preferences");

pub(crate) const PREFERENCES_BY_USER: TableDefinition<&[u8], &str> =
    TableDefinition::new("preferences_by_user");

pub(crate) const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Key format: `timestamp_millis_be|event_id` so a forward scan is chronological.
pub(crate) const AUDIT_EVENTS: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("audit_events");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("permission denied: user {user_id} cannot access {resource}")]
    PermissionDenied { user_id: String, resource: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for a `party|record_id` secondary index.
pub(crate) fn index_key(party_id: &str, record_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(party_id.len() + 1 + record_id.len());
    key.extend_from_slice(party_id.as_bytes());
    key.push(b'|');
    key.extend_from_slice(record_id.as_bytes());
    key
}

fn index_prefix(party_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(party_id.len() + 1);
    prefix.extend_from_slice(party_id.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Upper bound for a prefix scan. Record ids are ASCII, so one 0xFF byte
/// sorts past every key sharing the prefix.
fn index_prefix_end(party_id: &str) -> Vec<u8> {
    let mut end = index_prefix(party_id);
    end.push(0xFF);
    end
}

/// Collect the record ids stored under `party_id` in a secondary index.
pub(crate) fn ids_for_party<T>(table: &T, party_id: &str) -> StoreResult<Vec<String>>
where
    T: ReadableTable<&'static [u8], &'static str>,
{
    let start = index_prefix(party_id);
    let end = index_prefix_end(party_id);

    let mut ids = Vec::new();
    for entry in table.range(start.as_slice()..end.as_slice())? {
        let (_, value) = entry?;
        ids.push(value.value().to_string());
    }
    Ok(ids)
}

pub(crate) fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

// =============================================================================
// CareDatabase
// =============================================================================

/// Embedded ACID database holding accounts, relationships, preferences,
/// sessions and the audit trail.
pub struct CareDatabase {
    db: Database,
}

impl CareDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::from_database(db)
    }

    /// Create a database that lives entirely in memory. Used by tests.
    pub fn in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::from_database(db)
    }

    fn from_database(db: Database) -> StoreResult<Self> {
        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(ACCOUNT_EMAILS)?;
            let _ = write_txn.open_table(RELATIONSHIPS)?;
            let _ = write_txn.open_table(RELATIONSHIP_PAIRS)?;
            let _ = write_txn.open_table(RELATIONSHIPS_BY_PATIENT)?;
            let _ = write_txn.open_table(RELATIONSHIPS_BY_CAREGIVER)?;
            let _ = write_txn.open_table(PREFERENCES)?;
            let _ = write_txn.open_table(PREFERENCES_BY_USER)?;
            let _ = write_txn.open_table(SESSIONS)?;
            let _ = write_txn.open_table(AUDIT_EVENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn inner(&self) -> &Database {
        &self.db
    }

    /// Verify the database can serve a read transaction.
    pub fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(ACCOUNTS)?;
        Ok(())
    }
}
