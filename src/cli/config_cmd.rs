//! Config command: bootstrap and edit the configuration file

use std::path::Path;
use std::process::Command;

use anyhow::Result;

use super::output::Output;
use crate::storage::Config;

pub fn run(output: &Output, show_path: bool) -> Result<()> {
    let path = Config::global_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if show_path {
        if output.is_json() {
            output.data(&serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.is_file(),
            }));
        } else {
            println!("{}", path.display());
        }
        return Ok(());
    }

    if Config::write_template(&path)? {
        output.success(&format!("Created new configuration file at: {}", path.display()));
    } else {
        output.success(&format!("Configuration file already exists at: {}", path.display()));
    }

    open_in_editor(&path);
    Ok(())
}

/// Editor from `$EDITOR`, else a platform default
fn editor() -> String {
    std::env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "vi".to_string()
            }
        })
}

/// Opens the file for editing; failures only print a hint
fn open_in_editor(path: &Path) {
    let editor = editor();
    tracing::debug!(%editor, path = %path.display(), "opening editor");

    match Command::new(&editor).arg(path).status() {
        Ok(status) if status.success() => {}
        Ok(status) => {
            eprintln!("Editor exited with {}", status);
            eprintln!("Please edit the file manually at: {}", path.display());
        }
        Err(e) => {
            eprintln!("Error opening editor {}: {}", editor, e);
            eprintln!("Please edit the file manually at: {}", path.display());
        }
    }
}
