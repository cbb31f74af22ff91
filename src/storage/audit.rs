// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for security-sensitive operations.
//!
//! Registrations, logins, logouts, relationship mutations and authorization
//! denials are appended to the `audit_events` table.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::database::{decode, encode, CareDatabase, StoreResult, AUDIT_EVENTS};

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Account events
    AccountRegistered,
    ProfileUpdated,

    // Auth events
    LoginSucceeded,
    LoginFailed,
    LoggedOut,
    PermissionDenied,

    // Relationship events
    RelationshipCreated,
    RelationshipUpdated,
    RelationshipDeleted,

    // Preference events
    PreferenceCreated,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: AuditEventType,
    /// User who triggered the event (if known).
    pub user_id: Option<String>,
    /// Resource affected (relationship_id, account_id, etc.).
    pub resource_id: Option<String>,
    /// Resource type (relationship, account, etc.).
    pub resource_type: Option<String>,
    /// Additional details as JSON.
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error message if operation failed.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            resource_id: None,
            resource_type: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Set the user ID.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the resource.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    fn storage_key(&self) -> Vec<u8> {
        let millis = self.timestamp.timestamp_millis().max(0) as u64;
        let mut key = Vec::with_capacity(8 + 1 + self.event_id.len());
        key.extend_from_slice(&millis.to_be_bytes());
        key.push(b'|');
        key.extend_from_slice(self.event_id.as_bytes());
        key
    }
}

/// Repository for audit events.
pub struct AuditRepository<'a> {
    db: &'a CareDatabase,
}

impl<'a> AuditRepository<'a> {
    /// Create a new audit repository.
    pub fn new(db: &'a CareDatabase) -> Self {
        Self { db }
    }

    /// Append an audit event.
    pub fn log(&self, event: &AuditEvent) -> StoreResult<()> {
        let key = event.storage_key();
        let json = encode(event)?;
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(AUDIT_EVENTS)?;
            table.insert(key.as_slice(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Read all events in chronological order.
    pub fn read_all(&self) -> StoreResult<Vec<AuditEvent>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(AUDIT_EVENTS)?;

        let mut events = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            events.push(decode(value.value())?);
        }
        Ok(events)
    }

    /// Search events by user ID.
    pub fn search_by_user(&self, user_id: &str) -> StoreResult<Vec<AuditEvent>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .collect())
    }

    /// Search events by resource.
    pub fn search_by_resource(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> StoreResult<Vec<AuditEvent>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| {
                e.resource_type.as_deref() == Some(resource_type)
                    && e.resource_id.as_deref() == Some(resource_id)
            })
            .collect())
    }
}

/// Helper macro for logging audit events.
///
/// Audit failures never fail the request; they are reported through tracing.
#[macro_export]
macro_rules! audit_log {
    ($db:expr, $event:expr) => {{
        let repo = $crate::storage::AuditRepository::new($db);
        if let Err(e) = repo.log(&$event) {
            tracing::warn!(error = %e, "Failed to write audit event");
        }
    }};
    ($db:expr, $event_type:expr, $user_id:expr) => {{
        $crate::audit_log!(
            $db,
            $crate::storage::AuditEvent::new($event_type).with_user($user_id)
        )
    }};
    ($db:expr, $event_type:expr, $user_id:expr, $resource_type:expr, $resource_id:expr) => {{
        $crate::audit_log!(
            $db,
            $crate::storage::AuditEvent::new($event_type)
                .with_user($user_id)
                .with_resource($resource_type, $resource_id)
        )
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_audit_event() {
        let event = AuditEvent::new(AuditEventType::RelationshipCreated)
            .with_user("user_123")
            .with_resource("relationship", "rel_abc");

        assert_eq!(event.event_type, AuditEventType::RelationshipCreated);
        assert_eq!(event.user_id, Some("user_123".to_string()));
        assert_eq!(event.resource_type, Some("relationship".to_string()));
        assert_eq!(event.resource_id, Some("rel_abc".to_string()));
        assert!(event.success);
    }

    #[test]
    fn failed_event() {
        let event = AuditEvent::new(AuditEventType::PermissionDenied)
            .with_user("user_123")
            .failed("Not authorized");

        assert!(!event.success);
        assert_eq!(event.error, Some("Not authorized".to_string()));
    }

    #[test]
    fn log_and_read_events_in_order() {
        let db = CareDatabase::in_memory().unwrap();
        let repo = AuditRepository::new(&db);

        let mut first = AuditEvent::new(AuditEventType::LoginSucceeded).with_user("user_1");
        let mut second = AuditEvent::new(AuditEventType::LoggedOut).with_user("user_1");
        first.timestamp = Utc::now() - chrono::Duration::seconds(5);
        second.timestamp = Utc::now();

        repo.log(&second).unwrap();
        repo.log(&first).unwrap();

        let events = repo.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, AuditEventType::LoginSucceeded);
        assert_eq!(events[1].event_type, AuditEventType::LoggedOut);
    }

    #[test]
    fn search_by_user_and_resource() {
        let db = CareDatabase::in_memory().unwrap();
        let repo = AuditRepository::new(&db);

        audit_log!(&db, AuditEventType::RelationshipCreated, "user_target", "relationship", "r1");
        audit_log!(&db, AuditEventType::RelationshipDeleted, "user_other", "relationship", "r1");
        audit_log!(&db, AuditEventType::LoginSucceeded, "user_target");

        assert_eq!(repo.search_by_user("user_target").unwrap().len(), 2);
        assert_eq!(repo.search_by_resource("relationship", "r1").unwrap().len(), 2);
        assert!(repo.search_by_resource("relationship", "r2").unwrap().is_empty());
    }
}
