//! # Jira Search Exports
//!
//! Maps a saved Jira search response (the JSON body returned by
//! `/rest/api/2/search`) into [`Ticket`](crate::domain::Ticket) records and
//! an epic lookup. No network access happens here; fetching the export is
//! left to whoever produces the file.
//!
//! ## Field Mapping
//!
//! | Ticket field | Source |
//! |--------------|--------|
//! | `key` | `key` |
//! | `summary` | `fields.summary` |
//! | `link` | `self` |
//! | `assignee` | `fields.assignee.displayName`, else `.name` |
//! | `status` | `fields.status.name` |
//! | `effort_days` | configured effort custom field |
//! | `epic_key` | configured epic-link custom field |
//! | `dependency_keys` | outward issues of links with the dependency link type |

mod export;

pub use export::{custom_field_id, FieldMapping, JiraExport, JiraExportError};
