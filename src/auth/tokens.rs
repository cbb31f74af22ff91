// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT issuance and verification (HS256).

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{TokenClaims, TokenType};
use super::AuthError;
use crate::state::AuthConfig;
use crate::storage::StoredAccount;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Issue a signed token of the given type for a session.
pub fn issue_token(
    config: &AuthConfig,
    account: &StoredAccount,
    session_id: &str,
    typ: TokenType,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let ttl = match typ {
        TokenType::Access => config.access_token_ttl,
        TokenType::Refresh => config.refresh_token_ttl,
    };

    let claims = TokenClaims {
        sub: account.id.clone(),
        sid: session_id.to_string(),
        typ,
        role: account.role,
        iss: config.issuer.clone(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AuthError::InternalError(format!("Failed to sign token: {e}")))
}

/// Verify signature, expiry, issuer and token type.
pub fn verify_token(
    config: &AuthConfig,
    token: &str,
    expected: TokenType,
) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.set_issuer(&[&config.issuer]);
    validation.validate_aud = false;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        _ => AuthError::MalformedToken,
    })?;

    if token_data.claims.typ != expected {
        return Err(AuthError::WrongTokenType);
    }

    Ok(token_data.claims)
}
