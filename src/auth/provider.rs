// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication provider: credential checks, session lifecycle and token
//! issuance.
//!
//! ## Session Model
//!
//! 1. `login` verifies the password and opens a session
//! 2. the access and refresh tokens returned both carry the session id
//! 3. `refresh` trades a live refresh token for a new access token
//! 4. `logout` deletes the session, which invalidates every token bound to it

use chrono::Utc;

use super::claims::{AuthenticatedUser, TokenClaims, TokenType};
use super::password::verify_password;
use super::tokens::{issue_token, verify_token};
use super::AuthError;
use crate::audit_log;
use crate::care::{CareError, CareResult};
use crate::state::AuthConfig;
use crate::storage::{
    AccountRepository, AuditEvent, AuditEventType, CareDatabase, SessionRepository, StoreError,
    StoredAccount, StoredSession,
};

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Authentication provider over the account and session stores.
pub struct AuthProvider<'a> {
    db: &'a CareDatabase,
    config: &'a AuthConfig,
}

impl<'a> AuthProvider<'a> {
    pub fn new(db: &'a CareDatabase, config: &'a AuthConfig) -> Self {
        Self { db, config }
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown accounts and wrong passwords are both `AuthenticationFailed`
    /// with different detail strings.
    pub fn login(&self, email: &str, password: &str) -> CareResult<TokenPair> {
        let accounts = AccountRepository::new(self.db);
        let account = match accounts.find_by_email(email)? {
            Some(account) => account,
            None => {
                tracing::warn!(email = %email, "Login for unknown account");
                audit_log!(
                    self.db,
                    AuditEvent::new(AuditEventType::LoginFailed).failed("User does not exist")
                );
                return Err(CareError::AuthenticationFailed(
                    "User does not exist".to_string(),
                ));
            }
        };

        if !verify_password(password, &account.password_hash)? {
            tracing::warn!(user_id = %account.id, "Invalid password");
            audit_log!(
                self.db,
                AuditEvent::new(AuditEventType::LoginFailed)
                    .with_user(&account.id)
                    .failed("Invalid credentials")
            );
            return Err(CareError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ));
        }

        let session = StoredSession::new(&account.id, self.config.refresh_token_ttl);
        SessionRepository::new(self.db).create(&session)?;

        let access = issue_token(self.config, &account, &session.id, TokenType::Access)
            .map_err(|e| CareError::Unexpected(e.to_string()))?;
        let refresh = issue_token(self.config, &account, &session.id, TokenType::Refresh)
            .map_err(|e| CareError::Unexpected(e.to_string()))?;

        tracing::info!(user_id = %account.id, session_id = %session.id, "Login successful");
        audit_log!(
            self.db,
            AuditEventType::LoginSucceeded,
            &account.id,
            "session",
            &session.id
        );

        Ok(TokenPair { access, refresh })
    }

    /// Issue a new access token for a live refresh token.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = verify_token(self.config, refresh_token, TokenType::Refresh)?;
        let account = self.resolve(&claims)?;
        issue_token(self.config, &account, &claims.sid, TokenType::Access)
    }

    /// Close the actor's current session.
    pub fn logout(&self, actor: &AuthenticatedUser) -> CareResult<()> {
        let existed = SessionRepository::new(self.db).delete(&actor.session_id)?;
        if !existed {
            tracing::debug!(session_id = %actor.session_id, "Session already closed");
        }

        tracing::info!(user_id = %actor.user_id, "Logged out");
        audit_log!(
            self.db,
            AuditEventType::LoggedOut,
            &actor.user_id,
            "session",
            &actor.session_id
        );
        Ok(())
    }

    /// Turn a bearer access token into the acting account.
    pub fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = verify_token(self.config, access_token, TokenType::Access)?;
        let account = self.resolve(&claims)?;
        Ok(AuthenticatedUser::from_account(&account, &claims))
    }

    /// Load the account behind verified claims, requiring a live session.
    fn resolve(&self, claims: &TokenClaims) -> Result<StoredAccount, AuthError> {
        SessionRepository::new(self.db)
            .get(&claims.sid)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .filter(|s| s.user_id == claims.sub && s.is_active(Utc::now()))
            .ok_or(AuthError::SessionRevoked)?;

        match AccountRepository::new(self.db).get(&claims.sub) {
            Ok(account) => Ok(account),
            Err(StoreError::NotFound(_)) => Err(AuthError::UnknownAccount),
            Err(e) => Err(AuthError::InternalError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::Role;
    use crate::storage::AuditRepository;

    fn setup(role: Role) -> (CareDatabase, AuthConfig, StoredAccount) {
        let db = CareDatabase::in_memory().unwrap();
        let config = AuthConfig::for_tests();
        let hash = hash_password("s3cret-pass", config.password_cost).unwrap();
        let account = StoredAccount::new("p1@x.com", "Pat", role, hash);
        AccountRepository::new(&db).create(&account).unwrap();
        (db, config, account)
    }

    #[test]
    fn login_then_authenticate() {
        let (db, config, account) = setup(Role::Patient);
        let provider = AuthProvider::new(&db, &config);

        let tokens = provider.login("P1@x.com", "s3cret-pass").unwrap();
        let user = provider.authenticate(&tokens.access).unwrap();
        assert_eq!(user.user_id, account.id);
        assert_eq!(user.role, Role::Patient);

        let events = AuditRepository::new(&db).search_by_user(&account.id).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, AuditEventType::LoginSucceeded);
    }

    #[test]
    fn login_failures_are_distinct_authentication_failures() {
        let (db, config, _) = setup(Role::Patient);
        let provider = AuthProvider::new(&db, &config);

        match provider.login("p1@x.com", "wrong-pass") {
            Err(CareError::AuthenticationFailed(detail)) => assert_eq!(detail, "Invalid credentials"),
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }
        match provider.login("ghost@x.com", "whatever") {
            Err(CareError::AuthenticationFailed(detail)) => assert_eq!(detail, "User does not exist"),
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }
    }

    #[test]
    fn logout_revokes_access_and_refresh_tokens() {
        let (db, config, _) = setup(Role::Caregiver);
        let provider = AuthProvider::new(&db, &config);

        let tokens = provider.login("p1@x.com", "s3cret-pass").unwrap();
        let user = provider.authenticate(&tokens.access).unwrap();
        assert!(provider.refresh(&tokens.refresh).is_ok());

        provider.logout(&user).unwrap();

        assert!(matches!(
            provider.authenticate(&tokens.access),
            Err(AuthError::SessionRevoked)
        ));
        assert!(matches!(
            provider.refresh(&tokens.refresh),
            Err(AuthError::SessionRevoked)
        ));
    }

    #[test]
    fn refreshed_access_token_authenticates() {
        let (db, config, account) = setup(Role::Patient);
        let provider = AuthProvider::new(&db, &config);

        let tokens = provider.login("p1@x.com", "s3cret-pass").unwrap();
        let access = provider.refresh(&tokens.refresh).unwrap();
        assert_eq!(provider.authenticate(&access).unwrap().user_id, account.id);

        // An access token cannot be used to refresh
        assert!(matches!(
            provider.refresh(&tokens.access),
            Err(AuthError::WrongTokenType)
        ));
    }
}
