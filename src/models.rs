// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `ToSchema` for OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Accounts**: registration, login, token and profile payloads
//! - **Relationships**: create and partial-update payloads for caregiver links
//! - **Notification Preferences**: per-user settings payloads
//!
//! Stored records (`StoredRelationship`, `StoredPreference`) are returned
//! as-is; they live in [`crate::storage`].

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::storage::{
    NotificationChannel, PermissionLevel, RelationshipCategory, RelationshipPatch, StoredAccount,
};

// =============================================================================
// Account Models
// =============================================================================

/// Request body for `POST /v1/auth/register` and `POST /v1/auth/register/caregiver`.
///
/// Missing fields deserialize as empty strings so that registration can
/// report every problem at once as field-level validation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    /// Requested role for self-registration; ignored by caregiver registration.
    #[serde(default, alias = "user_type")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    /// Refresh token returned by login
    pub refresh: String,
}

/// Request body for `PATCH /v1/users/me`. Only the display name can change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<StoredAccount> for AccountResponse {
    fn from(account: StoredAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// Relationship Models
// =============================================================================

/// Request body for `POST /v1/relationships`.
///
/// The patient is always the caller. Capability flags left out are derived
/// from `permission_level`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateRelationshipRequest {
    /// Email of an existing caregiver account
    #[serde(default)]
    pub caregiver_email: String,
    #[serde(default, alias = "relationship")]
    pub category: RelationshipCategory,
    #[serde(default)]
    pub permission_level: PermissionLevel,
    #[serde(default)]
    pub can_view_adherence: Option<bool>,
    #[serde(default)]
    pub can_modify_schedule: Option<bool>,
    #[serde(default)]
    pub emergency_contact: bool,
    #[serde(default)]
    pub notes: String,
}

/// Request body for `PUT /v1/relationships/{id}`. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRelationshipRequest {
    #[serde(default, alias = "relationship")]
    pub category: Option<RelationshipCategory>,
    #[serde(default)]
    pub permission_level: Option<PermissionLevel>,
    #[serde(default)]
    pub can_view_adherence: Option<bool>,
    #[serde(default)]
    pub can_modify_schedule: Option<bool>,
    #[serde(default)]
    pub emergency_contact: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<UpdateRelationshipRequest> for RelationshipPatch {
    fn from(request: UpdateRelationshipRequest) -> Self {
        Self {
            category: request.category,
            permission_level: request.permission_level,
            can_view_adherence: request.can_view_adherence,
            can_modify_schedule: request.can_modify_schedule,
            emergency_contact: request.emergency_contact,
            notes: request.notes,
        }
    }
}

// =============================================================================
// Notification Preference Models
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_lead_minutes() -> u32 {
    15
}

/// Request body for `POST /v1/notification-preferences`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePreferenceRequest {
    #[serde(default)]
    pub channel: NotificationChannel,
    #[serde(default = "default_true")]
    pub medication_reminders: bool,
    #[serde(default = "default_true")]
    pub missed_dose_alerts: bool,
    #[serde(default = "default_lead_minutes")]
    pub reminder_lead_minutes: u32,
    #[schema(value_type = Option<String>, example = "22:00:00")]
    #[serde(default)]
    pub quiet_hours_start: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "07:00:00")]
    #[serde(default)]
    pub quiet_hours_end: Option<NaiveTime>,
}

impl Default for CreatePreferenceRequest {
    fn default() -> Self {
        Self {
            channel: NotificationChannel::default(),
            medication_reminders: true,
            missed_dose_alerts: true,
            reminder_lead_minutes: default_lead_minutes(),
            quiet_hours_start: None,
            quiet_hours_end: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_relationship_accepts_legacy_field_name() {
        let request: CreateRelationshipRequest = serde_json::from_str(
            r#"{"caregiver_email":"c1@x.com","relationship":"PROFESSIONAL"}"#,
        )
        .unwrap();
        assert_eq!(request.category, RelationshipCategory::Professional);
        assert_eq!(request.permission_level, PermissionLevel::View);
        assert_eq!(request.can_view_adherence, None);
        assert!(!request.emergency_contact);
    }

    #[test]
    fn update_request_becomes_sparse_patch() {
        let request: UpdateRelationshipRequest =
            serde_json::from_str(r#"{"permission_level":"MODIFY"}"#).unwrap();
        let patch: RelationshipPatch = request.into();
        assert_eq!(
            patch,
            RelationshipPatch {
                permission_level: Some(PermissionLevel::Modify),
                ..Default::default()
            }
        );
    }

    #[test]
    fn preference_defaults() {
        let request: CreatePreferenceRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.channel, NotificationChannel::Push);
        assert!(request.medication_reminders);
        assert!(request.missed_dose_alerts);
        assert_eq!(request.reminder_lead_minutes, 15);
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.com","user_type":"CAREGIVER"}"#).unwrap();
        assert_eq!(request.password, "");
        assert_eq!(request.role, Some(Role::Caregiver));
    }

    #[test]
    fn account_response_hides_password_hash() {
        let account = StoredAccount::new("p1@x.com", "Pat", Role::Patient, "secret-hash".into());
        let json = serde_json::to_string(&AccountResponse::from(account)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"PATIENT\""));
    }
}
