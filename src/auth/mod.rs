// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Password login with server-side sessions and HS256 bearer tokens.
//!
//! ## Auth Flow
//!
//! 1. Client registers, then calls `POST /v1/auth/login` with email and password
//! 2. Server verifies the bcrypt hash, opens a session and returns an
//!    access/refresh token pair, both carrying the session id (`sid`)
//! 3. Client sends `Authorization: Bearer <access token>`
//! 4. Server:
//!    - Verifies signature, expiry, issuer and token type
//!    - Requires the session to exist and be unexpired
//!    - Loads the account; `sub` → `user_id`, stored role → `role`
//!
//! ## Security
//!
//! - All endpoints except registration, login, refresh and health require a bearer token
//! - Logout deletes the session, revoking its access and refresh tokens
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod provider;
pub mod roles;
pub mod tokens;

pub use claims::{AuthenticatedUser, TokenClaims, TokenType};
pub use error::AuthError;
pub use extractor::Auth;
pub use provider::{AuthProvider, TokenPair};
pub use roles::Role;
