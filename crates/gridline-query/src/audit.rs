//! Audit trail of user actions on tables.
//!
//! Events are appended to an [`AuditSink`]. The sink is passed in by the
//! caller rather than kept in a global, so independent tables (or tests) never
//! see each other's events. [`MemoryAuditSink`] keeps them in memory; other
//! sinks can forward events elsewhere.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::generate_id;
use crate::error::Result;

/// What the user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
    Export,
    Import,
    BulkDelete,
    BulkUpdate,
    Login,
    Logout,
    Filter,
    Search,
}

impl AuditAction {
    /// Wire name, e.g. `bulk_delete`.
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Read => "read",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Export => "export",
            AuditAction::Import => "import",
            AuditAction::BulkDelete => "bulk_delete",
            AuditAction::BulkUpdate => "bulk_update",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::Filter => "filter",
            AuditAction::Search => "search",
        }
    }
}

/// Outcome of the audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[default]
    Success,
    Failure,
    Pending,
}

impl AuditStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditStatus::Success => "success",
            AuditStatus::Failure => "failure",
            AuditStatus::Pending => "pending",
        }
    }
}

/// Record state before and after a change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
}

/// Who performed an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditUser {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl AuditUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        AuditUser {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }

    /// An unattributed action.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// An event as appended to a sink, before it gets an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub action: AuditAction,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub status: AuditStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<AuditChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl NewAuditEvent {
    /// A successful, unattributed `action` on `resource`.
    pub fn new(action: AuditAction, resource: impl Into<String>) -> Self {
        NewAuditEvent {
            user_id: None,
            user_name: None,
            action,
            resource: resource.into(),
            resource_id: None,
            status: AuditStatus::Success,
            changes: None,
            details: None,
            metadata: None,
        }
    }

    pub fn user(mut self, user: &AuditUser) -> Self {
        self.user_id = user.id.clone();
        self.user_name = user.name.clone();
        self
    }

    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn status(mut self, status: AuditStatus) -> Self {
        self.status = status;
        self
    }

    pub fn changes(mut self, changes: AuditChanges) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A recorded audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: NewAuditEvent,
}

impl AuditEvent {
    /// Stamps a new event with a fresh id and the current time.
    pub fn record(event: NewAuditEvent) -> Self {
        AuditEvent {
            id: generate_id(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Display name of the actor: name, else id, else `Unknown`.
    pub fn actor(&self) -> &str {
        self.event
            .user_name
            .as_deref()
            .or(self.event.user_id.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Criteria for [`AuditSink::query`]. Unset fields match everything; time
/// bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    pub user_id: Option<String>,
    pub action: Option<AuditAction>,
    pub resource: Option<String>,
    pub status: Option<AuditStatus>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn matches(&self, event: &AuditEvent) -> bool {
        let e = &event.event;
        if let Some(user_id) = &self.user_id {
            if e.user_id.as_ref() != Some(user_id) {
                return false;
            }
        }
        if self.action.is_some_and(|action| action != e.action) {
            return false;
        }
        if self.resource.as_ref().is_some_and(|r| *r != e.resource) {
            return false;
        }
        if self.status.is_some_and(|status| status != e.status) {
            return false;
        }
        if self.start.is_some_and(|start| event.timestamp < start) {
            return false;
        }
        if self.end.is_some_and(|end| event.timestamp > end) {
            return false;
        }
        true
    }
}

/// Destination for audit events.
pub trait AuditSink {
    /// Records an event and returns it with its id and timestamp.
    fn append(&mut self, event: NewAuditEvent) -> AuditEvent;

    /// Returns the recorded events matching `filter`, oldest first.
    fn query(&self, filter: &AuditFilter) -> Vec<AuditEvent>;

    /// Drops every recorded event.
    fn clear(&mut self);
}

/// In-memory audit sink.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    events: Vec<AuditEvent>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&mut self, event: NewAuditEvent) -> AuditEvent {
        let recorded = AuditEvent::record(event);
        tracing::debug!(
            id = %recorded.id,
            action = recorded.event.action.as_str(),
            resource = %recorded.event.resource,
            "audit event"
        );
        self.events.push(recorded.clone());
        recorded
    }

    fn query(&self, filter: &AuditFilter) -> Vec<AuditEvent> {
        self.events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    fn clear(&mut self) {
        self.events.clear();
    }
}

pub fn log_create<S: AuditSink + ?Sized>(
    sink: &mut S,
    resource: &str,
    resource_id: &str,
    data: serde_json::Value,
    user: &AuditUser,
) -> AuditEvent {
    sink.append(
        NewAuditEvent::new(AuditAction::Create, resource)
            .resource_id(resource_id)
            .user(user)
            .changes(AuditChanges {
                before: None,
                after: Some(data),
            })
            .details(format!("Created {} {}", resource, resource_id)),
    )
}

pub fn log_update<S: AuditSink + ?Sized>(
    sink: &mut S,
    resource: &str,
    resource_id: &str,
    before: serde_json::Value,
    after: serde_json::Value,
    user: &AuditUser,
) -> AuditEvent {
    sink.append(
        NewAuditEvent::new(AuditAction::Update, resource)
            .resource_id(resource_id)
            .user(user)
            .changes(AuditChanges {
                before: Some(before),
                after: Some(after),
            })
            .details(format!("Updated {} {}", resource, resource_id)),
    )
}

pub fn log_delete<S: AuditSink + ?Sized>(
    sink: &mut S,
    resource: &str,
    resource_id: &str,
    data: serde_json::Value,
    user: &AuditUser,
) -> AuditEvent {
    sink.append(
        NewAuditEvent::new(AuditAction::Delete, resource)
            .resource_id(resource_id)
            .user(user)
            .changes(AuditChanges {
                before: Some(data),
                after: None,
            })
            .details(format!("Deleted {} {}", resource, resource_id)),
    )
}

pub fn log_bulk_delete<S: AuditSink + ?Sized>(
    sink: &mut S,
    resource: &str,
    count: usize,
    user: &AuditUser,
) -> AuditEvent {
    sink.append(
        NewAuditEvent::new(AuditAction::BulkDelete, resource)
            .user(user)
            .details(format!("Bulk deleted {} {}", count, resource)),
    )
}

pub fn log_export<S: AuditSink + ?Sized>(
    sink: &mut S,
    resource: &str,
    format: &str,
    count: usize,
    user: &AuditUser,
) -> AuditEvent {
    sink.append(
        NewAuditEvent::new(AuditAction::Export, resource)
            .user(user)
            .metadata(serde_json::json!({ "format": format, "count": count }))
            .details(format!("Exported {} {} as {}", count, resource, format)),
    )
}

/// Records that a filter was applied, keeping its query-string form.
pub fn log_filter<S: AuditSink + ?Sized>(
    sink: &mut S,
    resource: &str,
    query_string: &str,
    matched: usize,
    user: &AuditUser,
) -> AuditEvent {
    sink.append(
        NewAuditEvent::new(AuditAction::Filter, resource)
            .user(user)
            .metadata(serde_json::json!({ "query": query_string, "count": matched }))
            .details(format!("Filtered {} to {} rows", resource, matched)),
    )
}

/// Renders events as CSV with every field quoted.
///
/// Columns: `Timestamp,User,Action,Resource,Status,Details`. Rows are
/// separated by `\n` with no trailing newline.
pub fn export_csv(events: &[AuditEvent]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(["Timestamp", "User", "Action", "Resource", "Status", "Details"])?;
    for event in events {
        let timestamp = event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        writer.write_record([
            timestamp.as_str(),
            event.actor(),
            event.event.action.as_str(),
            event.event.resource.as_str(),
            event.event.status.as_str(),
            event.event.details.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let mut out = String::from_utf8_lossy(&bytes).into_owned();
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}
