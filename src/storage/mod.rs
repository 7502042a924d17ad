//! # Storage Layer
//!
//! Everything that touches the filesystem.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Ticket records | JSONL (one JSON per line) | any `*.jsonl` path |
//! | Config | TOML | `./.jql-to-plan.toml` or the global config dir |
//! | Output | OmniPlan package | `<out-dir>/<project>.oplx/` |
//!
//! ## Package Structure
//!
//! ```text
//! Project.oplx/
//! ├── Actual.xml        # Generated scenario
//! ├── __TOC.xml         # Static template
//! └── __changelog.xml   # Static template
//! ```
//!
//! ## Key Types
//!
//! - [`TicketFile`] - Read/write ticket records
//! - [`Config`] - Tool configuration
//! - [`PlanPackage`] - Write a scenario as an OmniPlan package

mod tickets;
mod config;
mod package;

pub use tickets::{TicketFile, TicketFileError};
pub use config::{Config, ConfigError, Defaults, CONFIG_TEMPLATE, LOCAL_CONFIG_FILE};
pub use package::{PlanPackage, ACTUAL_FILE};
