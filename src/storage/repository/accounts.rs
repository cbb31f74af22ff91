// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account repository.
//!
//! Accounts are keyed by UUID. A secondary `account_emails` table maps the
//! normalized email to the account id and is the source of truth for email
//! uniqueness. Emails are compared case-insensitively.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::auth::Role;
use crate::storage::database::{
    decode, encode, CareDatabase, StoreError, StoreResult, ACCOUNTS, ACCOUNT_EMAILS,
};

/// Normalize an email for storage and lookup (trim, NFKC, lowercase).
pub fn normalize_email(raw: &str) -> String {
    raw.trim().nfkc().collect::<String>().to_lowercase()
}

/// Account record as persisted.
///
/// `role` is written once at creation; the repository exposes no operation
/// that changes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredAccount {
    /// Unique account identifier (UUID)
    pub id: String,
    /// Normalized email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: Role,
    /// bcrypt password hash
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl StoredAccount {
    pub fn new(email: &str, name: &str, role: Role, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            name: name.trim().to_string(),
            role,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Repository for account records.
pub struct AccountRepository<'a> {
    db: &'a CareDatabase,
}

impl<'a> AccountRepository<'a> {
    pub fn new(db: &'a CareDatabase) -> Self {
        Self { db }
    }

    /// Insert a new account.
    ///
    /// Fails with `AlreadyExists` when the email is taken. The email check and
    /// both inserts share one write transaction.
    pub fn create(&self, account: &StoredAccount) -> StoreResult<()> {
        let email = normalize_email(&account.email);
        let json = encode(account)?;

        let write_txn = self.db.inner().begin_write()?;
        {
            let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;
            if emails.get(email.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("Account {email}")));
            }
            emails.insert(email.as_str(), account.id.as_str())?;

            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            accounts.insert(account.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get an account by ID.
    pub fn get(&self, account_id: &str) -> StoreResult<StoredAccount> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(account_id)? {
            Some(value) => decode(value.value()),
            None => Err(StoreError::NotFound(format!("Account {account_id}"))),
        }
    }

    /// Look up an account by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredAccount>> {
        let email = normalize_email(email);
        let read_txn = self.db.inner().begin_read()?;
        let emails = read_txn.open_table(ACCOUNT_EMAILS)?;
        let account_id = match emails.get(email.as_str())? {
            Some(id) => id.value().to_string(),
            None => return Ok(None),
        };

        let accounts = read_txn.open_table(ACCOUNTS)?;
        match accounts.get(account_id.as_str())? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up an account by email, returning it only if it has `role`.
    pub fn find_by_email_and_role(&self, email: &str, role: Role) -> StoreResult<Option<StoredAccount>> {
        Ok(self
            .find_by_email(email)?
            .filter(|account| account.role == role))
    }

    /// Change the display name of an account.
    pub fn update_name(&self, account_id: &str, name: &str) -> StoreResult<StoredAccount> {
        let write_txn = self.db.inner().begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(ACCOUNTS)?;

            let existing_bytes = {
                let existing = table
                    .get(account_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Account {account_id}")))?;
                existing.value().to_vec()
            };

            let mut account: StoredAccount = decode(&existing_bytes)?;
            account.name = name.trim().to_string();

            let json = encode(&account)?;
            table.insert(account_id, json.as_slice())?;
            account
        };
        write_txn.commit()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str, role: Role) -> StoredAccount {
        StoredAccount::new(email, "Test User", role, "hash".to_string())
    }

    #[test]
    fn create_and_get_account() {
        let db = CareDatabase::in_memory().unwrap();
        let repo = AccountRepository::new(&db);

        let acc = account("p1@x.com", Role::Patient);
        repo.create(&acc).unwrap();

        let loaded = repo.get(&acc.id).unwrap();
        assert_eq!(loaded, acc);
        assert_eq!(loaded.role, Role::Patient);
    }

    #[test]
    fn duplicate_email_rejected_case_insensitively() {
        let db = CareDatabase::in_memory().unwrap();
        let repo = AccountRepository::new(&db);

        repo.create(&account("Same@X.com", Role::Patient)).unwrap();
        let result = repo.create(&account("same@x.com ", Role::Caregiver));
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[test]
    fn find_by_email_normalizes_input() {
        let db = CareDatabase::in_memory().unwrap();
        let repo = AccountRepository::new(&db);
        let acc = account("c1@x.com", Role::Caregiver);
        repo.create(&acc).unwrap();

        let found = repo.find_by_email("  C1@X.COM").unwrap().unwrap();
        assert_eq!(found.id, acc.id);
        assert!(repo.find_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn find_by_email_and_role_filters_role() {
        let db = CareDatabase::in_memory().unwrap();
        let repo = AccountRepository::new(&db);
        repo.create(&account("p1@x.com", Role::Patient)).unwrap();

        assert!(repo
            .find_by_email_and_role("p1@x.com", Role::Caregiver)
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_email_and_role("p1@x.com", Role::Patient)
            .unwrap()
            .is_some());
    }

    #[test]
    fn update_name_keeps_role() {
        let db = CareDatabase::in_memory().unwrap();
        let repo = AccountRepository::new(&db);
        let acc = account("c1@x.com", Role::Caregiver);
        repo.create(&acc).unwrap();

        let updated = repo.update_name(&acc.id, "  Renamed ").unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.role, Role::Caregiver);
        assert_eq!(repo.get(&acc.id).unwrap().name, "Renamed");
    }

    #[test]
    fn missing_account_is_not_found() {
        let db = CareDatabase::in_memory().unwrap();
        let repo = AccountRepository::new(&db);
        assert!(matches!(repo.get("missing"), Err(StoreError::NotFound(_))));
        assert!(matches!(
            repo.update_name("missing", "x"),
            Err(StoreError::NotFound(_))
        ));
    }
}
