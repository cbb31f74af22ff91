// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account roles for authorization.
///
/// Every account carries exactly one role, fixed at registration.
///
/// - `Patient` - Owns caregiver relationships and may create, update and delete them
/// - `Caregiver` - Linked to patients; reads relationships and the caregiver dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Patient account (relationship owner)
    Patient,
    /// Caregiver account
    Caregiver,
}

impl Role {
    /// Whether accounts with this role may own caregiver relationships.
    pub fn owns_relationships(&self) -> bool {
        matches!(self, Role::Patient)
    }

    /// Whether accounts with this role may read the caregiver dashboard.
    pub fn reads_dashboard(&self) -> bool {
        matches!(self, Role::Caregiver)
    }
}

impl Default for Role {
    /// Self-registration creates patients unless told otherwise.
    fn default() -> Self {
        Role::Patient
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Patient => write!(f, "PATIENT"),
            Role::Caregiver => write!(f, "CAREGIVER"),
        }
    }
}
