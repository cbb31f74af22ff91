// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login session repository.
//!
//! A session is created at login and removed at logout. Access and refresh
//! tokens carry the session id; once the session is gone both are rejected.

use chrono::{DateTime, Utc};
use redb::ReadableDatabase;
use serde::{Deserialize, Serialize};

use crate::storage::database::{decode, encode, CareDatabase, StoreResult, SESSIONS};

/// Session stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    /// Session identifier (the `sid` claim of its tokens)
    pub id: String,
    /// Account the session belongs to
    pub user_id: String,
    /// When the session was opened
    pub created_at: DateTime<Utc>,
    /// When the refresh token of this session expires
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(user_id: &str, lifetime: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Repository for login sessions.
pub struct SessionRepository<'a> {
    db: &'a CareDatabase,
}

impl<'a> SessionRepository<'a> {
    pub fn new(db: &'a CareDatabase) -> Self {
        Self { db }
    }

    pub fn create(&self, session: &StoredSession) -> StoreResult<()> {
        let json = encode(session)?;
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            table.insert(session.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get(&self, session_id: &str) -> StoreResult<Option<StoredSession>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;
        match table.get(session_id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Remove a session. Returns whether it existed.
    pub fn delete(&self, session_id: &str) -> StoreResult<bool> {
        let write_txn = self.db.inner().begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let removed = table.remove(session_id)?;
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }
}
