//! OmniPlan package output
//!
//! A package is a `<name>.oplx` directory holding the generated
//! `Actual.xml` plus two static files OmniPlan expects next to it.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::Scenario;
use crate::omniplan;

/// Name of the generated scenario document
pub const ACTUAL_FILE: &str = "Actual.xml";

/// Static files copied into every package, byte for byte
const TEMPLATES: [(&str, &[u8]); 2] = [
    ("__TOC.xml", include_bytes!("../../templates/__TOC.xml")),
    ("__changelog.xml", include_bytes!("../../templates/__changelog.xml")),
];

/// An on-disk OmniPlan package
pub struct PlanPackage {
    dir: PathBuf,
}

impl PlanPackage {
    pub const EXTENSION: &'static str = "oplx";

    /// Package for `project_name` inside `parent`
    pub fn in_dir(parent: &Path, project_name: &str) -> Self {
        Self {
            dir: parent.join(format!("{}.{}", project_name, Self::EXTENSION)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn actual_path(&self) -> PathBuf {
        self.dir.join(ACTUAL_FILE)
    }

    /// Writes the scenario and templates, creating the directory if needed
    ///
    /// The scenario is written to a temp file and renamed into place, so a
    /// failed write never leaves a truncated `Actual.xml` behind.
    pub fn write(&self, scenario: &Scenario) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let actual = self.actual_path();
        let temp = actual.with_extension("xml.tmp");
        {
            let file = File::create(&temp)
                .with_context(|| format!("Failed to create file: {}", temp.display()))?;
            if let Err(e) = omniplan::serialize(BufWriter::new(file), scenario) {
                let _ = fs::remove_file(&temp);
                return Err(e)
                    .with_context(|| format!("Failed to write {}", actual.display()));
            }
        }
        fs::rename(&temp, &actual)
            .with_context(|| format!("Failed to move plan into place: {}", actual.display()))?;

        for (name, bytes) in TEMPLATES {
            let path = self.dir.join(name);
            fs::write(&path, bytes)
                .with_context(|| format!("Failed to copy {}", path.display()))?;
        }

        tracing::debug!(package = %self.dir.display(), "package written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EpicMap, PlanBuilder, SequentialIds, Ticket};
    use tempfile::TempDir;

    fn scenario() -> Scenario {
        let ids = SequentialIds::new();
        PlanBuilder::new(&ids, "Demo")
            .build(&[Ticket::new("D-1", "Demo task")], &EpicMap::new())
            .scenario
    }

    #[test]
    fn writes_all_files() {
        let dir = TempDir::new().unwrap();
        let package = PlanPackage::in_dir(dir.path(), "Demo");

        package.write(&scenario()).unwrap();

        assert_eq!(package.dir(), dir.path().join("Demo.oplx"));
        let actual = fs::read_to_string(package.actual_path()).unwrap();
        assert!(actual.contains("<title>Demo task</title>"));
        assert!(package.dir().join("__TOC.xml").is_file());
        assert!(package.dir().join("__changelog.xml").is_file());
        assert!(!package.dir().join("Actual.xml.tmp").exists());
    }

    #[test]
    fn templates_are_copied_verbatim() {
        let dir = TempDir::new().unwrap();
        let package = PlanPackage::in_dir(dir.path(), "Demo");
        package.write(&scenario()).unwrap();

        for (name, bytes) in TEMPLATES {
            assert_eq!(fs::read(package.dir().join(name)).unwrap(), bytes);
        }
    }

    #[test]
    fn rewriting_replaces_existing_plan() {
        let dir = TempDir::new().unwrap();
        let package = PlanPackage::in_dir(dir.path(), "Demo");
        fs::create_dir_all(package.dir()).unwrap();
        fs::write(package.actual_path(), "stale").unwrap();

        package.write(&scenario()).unwrap();

        let actual = fs::read_to_string(package.actual_path()).unwrap();
        assert!(actual.starts_with("<?xml"));
    }
}
