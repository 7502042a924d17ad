//! Ticket records
//!
//! A ticket is one work item pulled from the issue tracker. Epics share the
//! same shape and are looked up by key when tickets are grouped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Seconds in one working day (8 hours)
pub const WORKING_DAY_SECS: u64 = 8 * 3600;

/// A single issue-tracker ticket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticket {
    pub key: String,
    pub summary: String,
    pub link: String,

    /// Display name of the assignee; empty when unassigned
    pub assignee: String,

    pub status: String,

    /// Estimated effort in working days, 0 when unspecified
    pub effort_days: f64,

    /// Key of the epic this ticket belongs to; empty when none
    pub epic_key: String,

    /// Keys of tickets that must finish before this one
    pub dependency_keys: Vec<String>,
}

/// Epics are tickets acting as grouping parents
pub type Epic = Ticket;

/// Epic lookup keyed by epic key
pub type EpicMap = HashMap<String, Epic>;

impl Ticket {
    /// Creates a ticket with just a key and summary
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }

    pub fn with_effort_days(mut self, days: f64) -> Self {
        self.effort_days = days;
        self
    }

    pub fn with_epic(mut self, epic_key: impl Into<String>) -> Self {
        self.epic_key = epic_key.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn depends_on(mut self, key: impl Into<String>) -> Self {
        self.dependency_keys.push(key.into());
        self
    }

    pub fn has_assignee(&self) -> bool {
        !self.assignee.is_empty()
    }

    pub fn has_epic(&self) -> bool {
        !self.epic_key.is_empty()
    }

    /// Effort in seconds, defaulting to one working day when unspecified
    pub fn effort_secs(&self) -> u64 {
        effort_secs(self.effort_days)
    }
}

/// Converts working days to seconds
///
/// Zero, negative and NaN inputs count as unspecified and yield one working
/// day. Positive inputs never round down to zero.
pub fn effort_secs(days: f64) -> u64 {
    if days > 0.0 {
        ((days * WORKING_DAY_SECS as f64).round() as u64).max(1)
    } else {
        WORKING_DAY_SECS
    }
}
