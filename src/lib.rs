// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CareLink - Patient / Caregiver Account Service
//!
//! This crate provides account registration, password login with revocable
//! sessions, and the permissioned relationship graph linking patients to the
//! caregivers who may follow their adherence data.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password login, sessions and bearer tokens
//! - `care` - Registration and the relationship authorization engine
//! - `storage` - Embedded redb storage and audit trail

pub mod api;
pub mod auth;
pub mod care;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
