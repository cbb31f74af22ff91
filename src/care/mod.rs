// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Care Domain
//!
//! Registration, profiles, the caregiver relationship authorization engine
//! and the caregiver dashboard. Every entry point takes the acting account
//! as an explicit argument.

pub mod accounts;
pub mod dashboard;
pub mod engine;
pub mod error;

pub use accounts::AccountService;
pub use dashboard::PatientSummary;
pub use engine::CareEngine;
pub use error::{CareError, CareResult, FieldErrors};
