//! Key/value preference stores.
//!
//! Each group is one `<group>.json` file holding a flat JSON object.

use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value as JsonValue};

use crate::error::{DebugError, Result};
use crate::storage::validate_target_name;
use crate::types::TableDataResponse;

/// Name clients use to select the preference stores instead of a database.
pub const PREFERENCES_TARGET: &str = "APP_SHARED_PREFERENCES";

pub trait Preferences: Send + Sync {
    /// Group names, sorted.
    fn list_groups(&self) -> Result<Vec<String>>;

    /// Every entry of one group as a two-column `Key`/`Value` table.
    fn list_entries(&self, group: &str) -> Result<TableDataResponse>;
}

#[derive(Debug, Clone)]
pub struct JsonPreferences {
    dir: PathBuf,
}

impl JsonPreferences {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn group_path(&self, group: &str) -> Result<PathBuf> {
        validate_target_name(group).map_err(|_| DebugError::GroupNotFound(group.to_string()))?;
        let path = self.dir.join(format!("{group}.json"));
        if !path.is_file() {
            return Err(DebugError::GroupNotFound(group.to_string()));
        }
        Ok(path)
    }
}

fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

impl Preferences for JsonPreferences {
    fn list_groups(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut groups = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                groups.push(stem.to_string());
            }
        }
        groups.sort();
        Ok(groups)
    }

    fn list_entries(&self, group: &str) -> Result<TableDataResponse> {
        let raw = fs::read(self.group_path(group)?)?;
        let entries: Map<String, JsonValue> = serde_json::from_slice(&raw)?;
        let rows = entries
            .iter()
            .map(|(key, value)| vec![key.clone(), render(value)])
            .collect();
        Ok(TableDataResponse::success(
            vec!["Key".to_string(), "Value".to_string()],
            rows,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, JsonPreferences) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{"theme":"dark","launches":3,"beta":true,"token":null}"#,
        )
        .unwrap();
        fs::write(dir.path().join("session.json"), "{}").unwrap();
        fs::write(dir.path().join("readme.txt"), "ignored").unwrap();
        let prefs = JsonPreferences::new(dir.path());
        (dir, prefs)
    }

    #[test]
    fn lists_json_groups() {
        let (_dir, prefs) = fixture();
        assert_eq!(prefs.list_groups().unwrap(), vec!["session", "settings"]);
    }

    #[test]
    fn missing_directory_has_no_groups() {
        let prefs = JsonPreferences::new("/definitely/not/here");
        assert!(prefs.list_groups().unwrap().is_empty());
    }

    #[test]
    fn entries_render_as_key_value_rows() {
        let (_dir, prefs) = fixture();
        let data = prefs.list_entries("settings").unwrap();
        assert_eq!(data.columns, vec!["Key", "Value"]);
        assert!(data.rows.contains(&vec!["theme".to_string(), "dark".to_string()]));
        assert!(data.rows.contains(&vec!["launches".to_string(), "3".to_string()]));
        assert!(data.rows.contains(&vec!["beta".to_string(), "true".to_string()]));
        assert!(data.rows.contains(&vec!["token".to_string(), "NULL".to_string()]));
    }

    #[test]
    fn unknown_group_is_an_error() {
        let (_dir, prefs) = fixture();
        assert!(matches!(
            prefs.list_entries("nope"),
            Err(DebugError::GroupNotFound(_))
        ));
        assert!(matches!(
            prefs.list_entries("../settings"),
            Err(DebugError::GroupNotFound(_))
        ));
    }
}
