// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification using bcrypt.

use crate::care::{CareError, CareResult};

/// Hash a password using bcrypt with the given cost.
pub fn hash_password(password: &str, cost: u32) -> CareResult<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| CareError::Unexpected(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> CareResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| CareError::Unexpected(format!("Failed to verify password: {e}")))
}
