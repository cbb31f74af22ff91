// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration and profile management.
//!
//! Self-registration and caregiver registration both go through
//! [`AccountService::register`]; they differ only in how the role is chosen.

use crate::audit_log;
use crate::auth::password::hash_password;
use crate::auth::{AuthenticatedUser, Role};
use crate::models::{RegisterRequest, UpdateProfileRequest};
use crate::storage::{
    normalize_email, AccountRepository, AuditEventType, CareDatabase, StoreError, StoredAccount,
};

use super::error::{CareError, CareResult, FieldErrors};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_NAME_LEN: usize = 150;

const EMAIL_TAKEN: &str = "An account with this email already exists";

/// Registration and profile operations.
pub struct AccountService<'a> {
    db: &'a CareDatabase,
    password_cost: u32,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a CareDatabase, password_cost: u32) -> Self {
        Self { db, password_cost }
    }

    /// Self-registration. Role defaults to PATIENT when the request names none.
    pub fn register_patient(&self, request: &RegisterRequest) -> CareResult<StoredAccount> {
        self.register(request, request.role.unwrap_or(Role::Patient))
    }

    /// Caregiver registration. Role is always CAREGIVER.
    pub fn register_caregiver(&self, request: &RegisterRequest) -> CareResult<StoredAccount> {
        self.register(request, Role::Caregiver)
    }

    fn register(&self, request: &RegisterRequest, role: Role) -> CareResult<StoredAccount> {
        let accounts = AccountRepository::new(self.db);

        let mut fields = validate_registration(request);
        if fields.get("email").is_none() && accounts.find_by_email(&request.email)?.is_some() {
            fields.add("email", EMAIL_TAKEN);
        }
        fields.into_result()?;

        let hash = hash_password(&request.password, self.password_cost)?;
        let account = StoredAccount::new(&request.email, &request.name, role, hash);

        match accounts.create(&account) {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => return Err(CareError::invalid("email", EMAIL_TAKEN)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %account.id, role = %role, "Account registered");
        audit_log!(
            self.db,
            AuditEventType::AccountRegistered,
            &account.id,
            "account",
            &account.id
        );
        Ok(account)
    }

    /// Load the actor's own account.
    pub fn profile(&self, actor: &AuthenticatedUser) -> CareResult<StoredAccount> {
        AccountRepository::new(self.db)
            .get(&actor.user_id)
            .map_err(|e| match e {
                StoreError::NotFound(_) => CareError::NotFound,
                other => other.into(),
            })
    }

    /// Update the actor's display name. Email and role cannot change here.
    pub fn update_profile(
        &self,
        actor: &AuthenticatedUser,
        request: &UpdateProfileRequest,
    ) -> CareResult<StoredAccount> {
        let Some(name) = request.name.as_deref() else {
            return self.profile(actor);
        };

        let mut fields = FieldErrors::new();
        validate_name(name, &mut fields);
        fields.into_result()?;

        let account = AccountRepository::new(self.db)
            .update_name(&actor.user_id, name.trim())
            .map_err(|e| match e {
                StoreError::NotFound(_) => CareError::NotFound,
                other => other.into(),
            })?;

        tracing::info!(user_id = %actor.user_id, "Profile updated");
        audit_log!(self.db, AuditEventType::ProfileUpdated, &actor.user_id);
        Ok(account)
    }
}

/// Collect every field problem in a registration request.
pub fn validate_registration(request: &RegisterRequest) -> FieldErrors {
    let mut fields = FieldErrors::new();

    let email = normalize_email(&request.email);
    if email.is_empty() {
        fields.add("email", "This field is required");
    } else if !is_plausible_email(&email) {
        fields.add("email", "Enter a valid email address");
    }

    if request.password.is_empty() {
        fields.add("password", "This field is required");
    } else if request.password.chars().count() < MIN_PASSWORD_LEN {
        fields.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    validate_name(&request.name, &mut fields);
    fields
}

fn validate_name(name: &str, fields: &mut FieldErrors) {
    let name = name.trim();
    if name.is_empty() {
        fields.add("name", "This field is required");
    } else if name.chars().count() > MAX_NAME_LEN {
        fields.add(
            "name",
            format!("Name must be at most {MAX_NAME_LEN} characters"),
        );
    }
}

/// One `@`, non-empty local part, and a dotted domain without empty labels.
fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
