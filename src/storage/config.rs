//! Configuration handling for jql-to-plan
//!
//! Configuration is read from `./.jql-to-plan.toml` when present, otherwise
//! from `~/.config/jql-to-plan/config.toml` (platform equivalent).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::BuildOptions;
use crate::jira::FieldMapping;

/// File name of the per-directory override
pub const LOCAL_CONFIG_FILE: &str = ".jql-to-plan.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("effort_custom_field_id is not set. Run 'jql-to-plan config' and set it.")]
    MissingEffortField,

    #[error("--epic-group requires epic_link_custom_field_id. Run 'jql-to-plan config' and set it.")]
    MissingEpicLinkField,
}

/// Template written by `jql-to-plan config`
pub const CONFIG_TEMPLATE: &str = r#"# jql-to-plan configuration

# Custom field holding the effort estimate in days (e.g. customfield_10105).
# Required when reading Jira search exports.
# effort_custom_field_id = "10105"

# Custom field holding the epic link (e.g. customfield_11000).
# Required for --epic-group with Jira search exports.
# epic_link_custom_field_id = "11000"

# Issue link type whose outward issues are treated as dependencies.
dependency_link_type = "Dependent"

[defaults]
# Group tasks under their epic
group_by_epic = false
# Add a final "Done" milestone
milestone_done = false
"#;

/// Default build switches, OR-ed with command-line flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub group_by_epic: bool,
    pub milestone_done: bool,
}

/// Tool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub effort_custom_field_id: Option<String>,
    pub epic_link_custom_field_id: Option<String>,
    pub dependency_link_type: String,
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            effort_custom_field_id: None,
            epic_link_custom_field_id: None,
            dependency_link_type: FieldMapping::default().dependency_link_type,
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the first location that exists
    ///
    /// Falls back to defaults when no file is found.
    pub fn load() -> Result<Self> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// First existing config file: local override, then global
    pub fn locate() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok();
        locate_in(cwd.as_deref(), Self::global_config_path())
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "jql-to-plan", "jql-to-plan")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Writes the template to `path` unless a file already exists there
    ///
    /// Returns true when a new file was created.
    pub fn write_template(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(true)
    }

    /// Combines configured defaults with command-line flags
    pub fn build_options(&self, epic_group: bool, milestone_done: bool) -> BuildOptions {
        BuildOptions {
            group_by_epic: epic_group || self.defaults.group_by_epic,
            milestone_done: milestone_done || self.defaults.milestone_done,
        }
    }

    /// Field mapping for Jira exports
    ///
    /// The effort field is always required; the epic-link field only when
    /// grouping by epic.
    pub fn field_mapping(&self, group_by_epic: bool) -> Result<FieldMapping, ConfigError> {
        let effort = self
            .effort_custom_field_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingEffortField)?;

        let epic_link = self
            .epic_link_custom_field_id
            .as_deref()
            .filter(|s| !s.trim().is_empty());
        if group_by_epic && epic_link.is_none() {
            return Err(ConfigError::MissingEpicLinkField);
        }

        Ok(FieldMapping::new(effort, epic_link)
            .with_dependency_link_type(self.dependency_link_type.clone()))
    }
}

/// Local file in `cwd` wins; an unreadable working directory only skips it
fn locate_in(cwd: Option<&Path>, global: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(local) = cwd.map(|dir| dir.join(LOCAL_CONFIG_FILE)) {
        if local.is_file() {
            return Some(local);
        }
    }

    global.filter(|p| p.is_file())
}
