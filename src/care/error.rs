// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain errors for the care engine.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::storage::StoreError;

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a `ValidationError`.
    pub fn into_result(self) -> CareResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CareError::ValidationError(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors returned by registration, authentication and the relationship engine.
#[derive(Debug, Error)]
pub enum CareError {
    #[error("validation failed: {0}")]
    ValidationError(FieldErrors),

    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("account role does not permit this operation")]
    ForbiddenRole,

    #[error("no caregiver account with that email")]
    CaregiverNotFound,

    #[error("relationship already exists")]
    DuplicateRelationship,

    #[error("only the patient who owns this relationship may change it")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Unexpected(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl CareError {
    /// Stable machine-readable code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CareError::ValidationError(_) => "validation_error",
            CareError::AuthenticationFailed(_) => "authentication_failed",
            CareError::ForbiddenRole => "forbidden_role",
            CareError::CaregiverNotFound => "caregiver_not_found",
            CareError::DuplicateRelationship => "duplicate_relationship",
            CareError::Forbidden => "forbidden",
            CareError::NotFound => "not_found",
            CareError::Unexpected(_) => "unexpected",
            CareError::Storage(_) => "storage_error",
        }
    }

    /// Single-field validation error.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.add(field, message);
        CareError::ValidationError(fields)
    }
}

pub type CareResult<T> = Result<T, CareError>;
