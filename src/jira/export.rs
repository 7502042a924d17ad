//! Parsing and mapping of Jira search responses

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{EpicMap, Ticket};

const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// Link type whose outward issues are treated as dependencies
pub const DEFAULT_DEPENDENCY_LINK_TYPE: &str = "Dependent";

#[derive(Debug, Error)]
pub enum JiraExportError {
    #[error("Failed to read Jira export {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse Jira export: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Normalises a custom field id to `customfield_<id>`
///
/// Returns `None` for blank input.
pub fn custom_field_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else if raw.starts_with(CUSTOM_FIELD_PREFIX) {
        Some(raw.to_string())
    } else {
        Some(format!("{}{}", CUSTOM_FIELD_PREFIX, raw))
    }
}

/// Which raw fields feed which ticket fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub effort_field: Option<String>,
    pub epic_link_field: Option<String>,
    pub dependency_link_type: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            effort_field: None,
            epic_link_field: None,
            dependency_link_type: DEFAULT_DEPENDENCY_LINK_TYPE.to_string(),
        }
    }
}

impl FieldMapping {
    /// Builds a mapping from raw custom field ids, normalising them
    pub fn new(effort: &str, epic_link: Option<&str>) -> Self {
        Self {
            effort_field: custom_field_id(effort),
            epic_link_field: epic_link.and_then(custom_field_id),
            ..Default::default()
        }
    }

    pub fn with_dependency_link_type(mut self, link_type: impl Into<String>) -> Self {
        self.dependency_link_type = link_type.into();
        self
    }
}

/// A saved Jira search response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JiraExport {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawIssue {
    key: String,
    #[serde(rename = "self", default)]
    self_link: String,
    #[serde(default)]
    fields: RawFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    assignee: Option<RawUser>,
    #[serde(default)]
    status: Option<RawStatus>,
    #[serde(default)]
    issuelinks: Vec<RawLink>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawUser {
    #[serde(rename = "displayName", default)]
    display_name: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawStatus {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLink {
    #[serde(rename = "type")]
    link_type: RawLinkType,
    #[serde(rename = "outwardIssue", default)]
    outward_issue: Option<RawLinkedIssue>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLinkType {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLinkedIssue {
    key: String,
}

impl JiraExport {
    /// Reads an export from disk
    pub fn from_path(path: &Path) -> Result<Self, JiraExportError> {
        let content = fs::read_to_string(path).map_err(|source| JiraExportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(json: &str) -> Result<Self, JiraExportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Maps every issue to a ticket, in export order
    pub fn tickets(&self, mapping: &FieldMapping) -> Vec<Ticket> {
        self.issues
            .iter()
            .map(|issue| {
                let ticket = issue.to_ticket(mapping);
                if ticket.effort_days <= 0.0 || ticket.effort_days.is_nan() {
                    tracing::warn!(
                        ticket = %ticket.key,
                        summary = %ticket.summary,
                        "missing or zero effort"
                    );
                }
                ticket
            })
            .collect()
    }

    /// Epic lookup from this export's issues, restricted to `wanted` keys
    pub fn epics_for<'a>(&self, wanted: impl IntoIterator<Item = &'a str>) -> EpicMap {
        let wanted: std::collections::HashSet<&str> = wanted.into_iter().collect();
        self.issues
            .iter()
            .filter(|issue| wanted.contains(issue.key.as_str()))
            .map(|issue| (issue.key.clone(), issue.to_epic()))
            .collect()
    }

    /// Every issue of this export as an epic
    pub fn into_epic_map(self) -> EpicMap {
        self.issues
            .iter()
            .map(|issue| (issue.key.clone(), issue.to_epic()))
            .collect()
    }
}

impl RawIssue {
    fn to_ticket(&self, mapping: &FieldMapping) -> Ticket {
        let assignee = self
            .fields
            .assignee
            .as_ref()
            .map(|user| {
                if user.display_name.is_empty() {
                    user.name.clone()
                } else {
                    user.display_name.clone()
                }
            })
            .unwrap_or_default();

        let effort_days = mapping
            .effort_field
            .as_deref()
            .and_then(|field| self.fields.other.get(field))
            .and_then(effort_days)
            .unwrap_or(0.0);

        let epic_key = mapping
            .epic_link_field
            .as_deref()
            .and_then(|field| self.fields.other.get(field))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let dependency_keys = self
            .fields
            .issuelinks
            .iter()
            .filter(|link| link.link_type.name == mapping.dependency_link_type)
            .filter_map(|link| link.outward_issue.as_ref())
            .map(|issue| issue.key.clone())
            .collect();

        Ticket {
            key: self.key.clone(),
            summary: self.fields.summary.clone(),
            link: self.self_link.clone(),
            assignee,
            status: self.status_name(),
            effort_days,
            epic_key,
            dependency_keys,
        }
    }

    fn to_epic(&self) -> Ticket {
        Ticket {
            key: self.key.clone(),
            summary: self.fields.summary.clone(),
            link: self.self_link.clone(),
            status: self.status_name(),
            ..Default::default()
        }
    }

    fn status_name(&self) -> String {
        self.fields
            .status
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }
}

/// Reads an effort value that may be a number or a numeric string
fn effort_days(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

/// Longest numeric prefix of `s`, so "2.5d" reads as 2.5
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')))
        .unwrap_or(s.len());

    (1..=end).rev().find_map(|len| s[..len].parse().ok())
}
