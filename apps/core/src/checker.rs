use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::command;
use crate::model::App;

/// One stale or broken inventory entry found by the `check` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidApp {
    pub name: String,
    pub kind: String,
    pub details: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub success: bool,
    pub issues: Vec<InvalidApp>,
}

impl CheckReport {
    pub fn new(issues: Vec<InvalidApp>) -> Self {
        Self {
            success: true,
            issues,
        }
    }
}

pub fn check_invalid_apps(apps: &[App]) -> Vec<InvalidApp> {
    check_invalid_apps_with(apps, |candidate| Path::new(candidate).exists())
}

/// Audits inventory records against the filesystem: registry entries whose
/// install directory is gone, uninstall commands that no longer resolve to
/// an executable, and leftover ProgramData residue.
pub fn check_invalid_apps_with<F>(apps: &[App], exists: F) -> Vec<InvalidApp>
where
    F: Fn(&str) -> bool,
{
    let mut issues = Vec::new();

    for app in apps {
        if !app.install_location.trim().is_empty() && !exists(&app.install_location) {
            issues.push(InvalidApp {
                name: app.display_name.clone(),
                kind: "registry".to_string(),
                details: format!(
                    "registry entry for {} remains but its install directory is gone",
                    app.display_name
                ),
                path: app.registry_key.clone(),
            });
        }

        if command::parse_with(&app.uninstall_string, &exists).is_err() {
            issues.push(InvalidApp {
                name: app.display_name.clone(),
                kind: "uninstaller".to_string(),
                details: "uninstaller executable is missing or the command is malformed"
                    .to_string(),
                path: if app.uninstall_string.trim().is_empty() {
                    "unknown".to_string()
                } else {
                    app.uninstall_string.clone()
                },
            });
        }

        if !app.publisher.trim().is_empty() {
            let residue = format!(
                "C:\\ProgramData\\{}\\{}",
                app.publisher, app.display_name
            );
            if exists(&residue) {
                issues.push(InvalidApp {
                    name: app.display_name.clone(),
                    kind: "file".to_string(),
                    details: "leftover program data found for this application".to_string(),
                    path: residue,
                });
            }
        }
    }

    issues
}
