//! Records and lifecycle events delivered to handlers

use super::attribute::{Attribute, Value};
use super::caller::Caller;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Snapshot of a logger's position in its tree
///
/// Built at the moment an event is dispatched and consistent with the tree
/// at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggerIdentity {
    pub id: Uuid,
    pub parent: Option<Uuid>,
    pub root: Uuid,
    pub children: Vec<Uuid>,
}

impl LoggerIdentity {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// One structured log entry
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub caller: Option<Caller>,
    pub attributes: Vec<Attribute>,
}

impl Record {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            caller: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_caller(mut self, caller: Option<Caller>) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Look up a top-level attribute by key
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| &attr.value)
    }

    /// Message of the first error-valued attribute
    pub fn first_error(&self) -> Option<&str> {
        self.attributes.iter().find_map(|attr| match &attr.value {
            Value::Error(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

/// Which lifecycle transition an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleKind {
    Created,
    Closed,
}

/// Creation or closing notification for one logger
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleEvent {
    pub kind: LifecycleKind,
    pub timestamp: DateTime<Utc>,
    pub caller: Option<Caller>,
    pub logger: LoggerIdentity,
}

impl LifecycleEvent {
    pub fn new(kind: LifecycleKind, logger: LoggerIdentity, caller: Option<Caller>) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            caller,
            logger,
        }
    }
}
