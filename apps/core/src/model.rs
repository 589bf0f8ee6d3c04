use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One installed application as recorded by the uninstall registry.
/// Field names on the wire keep the registry's own value names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "DisplayVersion")]
    pub display_version: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "InstallDate")]
    pub install_date: String,
    #[serde(rename = "UninstallString")]
    pub uninstall_string: String,
    #[serde(rename = "InstallLocation")]
    pub install_location: String,
    #[serde(rename = "DisplayIcon")]
    pub display_icon: String,
    #[serde(rename = "RegistryKey")]
    pub registry_key: String,
    #[serde(rename = "EstimatedSize")]
    pub estimated_size: u32,
}

/// Document printed by the `export` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDocument {
    pub success: bool,
    pub apps: Vec<App>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InventoryDocument {
    pub fn new(apps: Vec<App>) -> Self {
        Self {
            success: true,
            apps,
            error: None,
        }
    }
}

/// Terminal result of one uninstall attempt. Built exactly once per
/// invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UninstallOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<App>>,
}

impl UninstallOutcome {
    pub fn completed(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            error: None,
            matches: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error),
            matches: None,
        }
    }

    pub fn ambiguous(matches: Vec<App>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(format!("{} applications match the query", matches.len())),
            matches: Some(matches),
        }
    }
}

/// Segment-wise numeric comparison of dotted version strings.
/// Missing and non-numeric segments count as 0, so "1.0" == "1.0.0"
/// and "2.0" > "1.9.9".
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    if left == right {
        return Ordering::Equal;
    }

    let left_parts: Vec<&str> = left.split('.').collect();
    let right_parts: Vec<&str> = right.split('.').collect();
    let segments = left_parts.len().max(right_parts.len());

    for index in 0..segments {
        let a = numeric_segment(left_parts.get(index));
        let b = numeric_segment(right_parts.get(index));
        match a.cmp(&b) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }

    Ordering::Equal
}

fn numeric_segment(part: Option<&&str>) -> u64 {
    part.and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0)
}
