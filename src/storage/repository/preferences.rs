// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Notification preference repository.
//!
//! Preferences are simple per-user settings records. Each record is indexed
//! under its owner so listing never touches other users' data.

use chrono::{DateTime, NaiveTime, Utc};
use redb::ReadableDatabase;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::database::{
    decode, encode, ids_for_party, index_key, CareDatabase, StoreResult, PREFERENCES,
    PREFERENCES_BY_USER,
};

/// Delivery channel for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannel {
    Email,
    #[default]
    Push,
    Sms,
}

/// Notification preference stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredPreference {
    /// Unique preference identifier (UUID)
    pub id: String,
    /// Owning account
    pub user_id: String,
    /// Delivery channel
    pub channel: NotificationChannel,
    /// Remind before scheduled doses
    pub medication_reminders: bool,
    /// Alert when a dose is missed
    pub missed_dose_alerts: bool,
    /// Minutes before a dose to send the reminder
    pub reminder_lead_minutes: u32,
    /// Start of the quiet period (no notifications)
    #[schema(value_type = Option<String>, example = "22:00:00")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet_hours_start: Option<NaiveTime>,
    /// End of the quiet period
    #[schema(value_type = Option<String>, example = "07:00:00")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet_hours_end: Option<NaiveTime>,
    /// When the preference was created
    pub created_at: DateTime<Utc>,
}

/// Repository for notification preferences.
pub struct PreferenceRepository<'a> {
    db: &'a CareDatabase,
}

impl<'a> PreferenceRepository<'a> {
    pub fn new(db: &'a CareDatabase) -> Self {
        Self { db }
    }

    /// Store a new preference record.
    pub fn create(&self, preference: &StoredPreference) -> StoreResult<()> {
        let json = encode(preference)?;
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut records = write_txn.open_table(PREFERENCES)?;
            records.insert(preference.id.as_str(), json.as_slice())?;

            let mut by_user = write_txn.open_table(PREFERENCES_BY_USER)?;
            let key = index_key(&preference.user_id, &preference.id);
            by_user.insert(key.as_slice(), preference.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List all preferences owned by a user.
    pub fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<StoredPreference>> {
        let read_txn = self.db.inner().begin_read()?;
        let by_user = read_txn.open_table(PREFERENCES_BY_USER)?;
        let records = read_txn.open_table(PREFERENCES)?;

        let mut preferences = Vec::new();
        for id in ids_for_party(&by_user, user_id)? {
            if let Some(value) = records.get(id.as_str())? {
                preferences.push(decode(value.value())?);
            }
        }
        Ok(preferences)
    }
}
