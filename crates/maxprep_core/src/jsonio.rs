//! JSON load/save for the fixed-name artifacts in a run directory.

use crate::error::{MaxprepError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Loads a JSON file into an untyped value. Missing or malformed input is
/// fatal; the parse error keeps the offending path.
pub fn load(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| MaxprepError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes pretty-printed JSON, creating or overwriting the file.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| MaxprepError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trip_is_structurally_identical() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("task.json");
        let value = json!({
            "task_info": {"project_name": "Project1", "platform": "2"},
            "scene_info_render": {"common": {"all_camera": ["cam1", "cam2"]}}
        });
        save(&path, &value).unwrap();
        assert_eq!(load(&path).unwrap(), value);
    }

    #[test]
    fn missing_file_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            load(&tmp.path().join("absent.json")),
            Err(MaxprepError::Io(_))
        ));
    }

    #[test]
    fn malformed_file_reports_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        match load(&path) {
            Err(MaxprepError::Json { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Json error, got {other:?}"),
        }
    }
}
