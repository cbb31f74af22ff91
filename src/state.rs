// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::task;

use crate::error::ApiError;
use crate::storage::{CareDatabase, StoreResult};

/// Token and password settings shared by the auth layer.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Issuer claim
    pub issuer: String,
    pub access_token_ttl: chrono::Duration,
    /// Also the session lifetime
    pub refresh_token_ttl: chrono::Duration,
    /// bcrypt cost factor
    pub password_cost: u32,
}

impl AuthConfig {
    /// Fast settings for tests: bcrypt cost 4 and a fixed secret.
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "test-secret-test-secret-test-secret".to_string(),
            issuer: "carelink".to_string(),
            access_token_ttl: chrono::Duration::minutes(15),
            refresh_token_ttl: chrono::Duration::days(7),
            password_cost: 4,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("password_cost", &self.password_cost)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<CareDatabase>,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(db: CareDatabase, auth_config: AuthConfig) -> Self {
        Self {
            db: Arc::new(db),
            auth_config: Arc::new(auth_config),
        }
    }

    /// State backed by an in-memory database and [`AuthConfig::for_tests`].
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self::new(CareDatabase::in_memory()?, AuthConfig::for_tests()))
    }

    /// Run a database or password-hashing operation off the async runtime.
    ///
    /// redb transactions and bcrypt are synchronous; this wraps them in
    /// `spawn_blocking` and converts the closure's error into an `ApiError`.
    pub async fn blocking<F, T, E>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&CareDatabase, &AuthConfig) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<ApiError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let auth_config = Arc::clone(&self.auth_config);

        task::spawn_blocking(move || f(&db, &auth_config))
            .await
            .map_err(|e| ApiError::internal(format!("Blocking task failed: {e}")))?
            .map_err(Into::into)
    }
}
