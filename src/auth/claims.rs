// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;
use crate::storage::StoredAccount;

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by tokens issued at login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Session ID; a token is only valid while its session exists
    pub sid: String,
    /// Access or refresh
    pub typ: TokenType,
    /// Role at issue time (informational, the stored role is authoritative)
    pub role: Role,
    /// Issuer
    pub iss: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated account making a request.
///
/// This is the actor threaded explicitly into every engine and repository
/// call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Account ID
    pub user_id: String,

    /// Account email
    pub email: String,

    /// Account role (loaded from the account store)
    pub role: Role,

    /// Session the bearer token belongs to
    #[serde(skip)]
    pub session_id: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build the actor from verified claims and the stored account.
    pub fn from_account(account: &StoredAccount, claims: &TokenClaims) -> Self {
        Self {
            user_id: account.id.clone(),
            email: account.email.clone(),
            role: account.role,
            session_id: claims.sid.clone(),
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims(account_id: &str) -> TokenClaims {
        TokenClaims {
            sub: account_id.to_string(),
            sid: "sess_abc".to_string(),
            typ: TokenType::Access,
            role: Role::Patient,
            iss: "carelink".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_000_900,
        }
    }

    #[test]
    fn from_account_uses_stored_role() {
        let account = StoredAccount::new("c1@x.com", "Carer", Role::Caregiver, "hash".into());
        // Claims claim PATIENT; the stored role wins
        let user = AuthenticatedUser::from_account(&account, &sample_claims(&account.id));

        assert_eq!(user.user_id, account.id);
        assert_eq!(user.email, "c1@x.com");
        assert_eq!(user.role, Role::Caregiver);
        assert_eq!(user.session_id, "sess_abc");
    }

    #[test]
    fn token_type_serializes_lowercase() {
        let json = serde_json::to_value(sample_claims("a")).unwrap();
        assert_eq!(json["typ"], "access");
        assert_eq!(json["role"], "PATIENT");
    }
}
