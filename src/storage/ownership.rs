// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for owner-only operations.
//!
//! A caregiver relationship is owned by its patient; a notification
//! preference by the account that created it.

use crate::auth::AuthenticatedUser;

use super::repository::{StoredPreference, StoredRelationship};
use super::{StoreError, StoreResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &str;

    /// Resource name used in denial messages.
    fn resource_kind(&self) -> &'static str;
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the user owns this resource.
    ///
    /// # Errors
    /// Returns `StoreError::PermissionDenied` if the user doesn't own the resource.
    fn verify_ownership(&self, user: &AuthenticatedUser) -> StoreResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &AuthenticatedUser) -> StoreResult<()> {
        if self.owner_user_id() == user.user_id {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                user_id: user.user_id.clone(),
                resource: self.resource_kind().to_string(),
            })
        }
    }
}

impl OwnedResource for StoredRelationship {
    fn owner_user_id(&self) -> &str {
        &self.patient_id
    }

    fn resource_kind(&self) -> &'static str {
        "relationship"
    }
}

impl OwnedResource for StoredPreference {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }

    fn resource_kind(&self) -> &'static str {
        "notification preference"
    }
}
