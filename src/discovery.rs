//! Preset discovery and JSON loading for CLI callers.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{EngineError, EngineResult};
use crate::schema::SitePreset;

const PRESET_SUFFIX: &str = ".preset";

pub fn load_json<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let source = fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| EngineError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Preset id for a file: `studio.preset.json` and `studio.json` are both `studio`.
pub fn preset_id_for(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(stem.strip_suffix(PRESET_SUFFIX).unwrap_or(stem).to_string())
}

fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect()
}

/// Every parseable preset under `dir`, keyed by id in file-name order.
/// Files that fail to parse are skipped with a warning; a missing
/// directory yields an empty map.
pub fn discover_presets(dir: &Path) -> EngineResult<IndexMap<String, SitePreset>> {
    let mut presets = IndexMap::new();
    if !dir.exists() {
        debug!("preset directory {} does not exist", dir.display());
        return Ok(presets);
    }

    for path in find_json_files(dir) {
        let Some(id) = preset_id_for(&path) else {
            continue;
        };
        match load_json::<SitePreset>(&path) {
            Ok(preset) => {
                if presets.insert(id.clone(), preset).is_some() {
                    warn!("preset '{}' redefined by {}", id, path.display());
                }
            }
            Err(e) => warn!("skipping preset: {}", e),
        }
    }
    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_presets_sorted_and_tolerant() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("studio.preset.json"),
            r#"{"pages": {"home": {"slug": "/", "sections": []}}}"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("atelier.json"), r#"{"pages": {}}"#).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let presets = discover_presets(dir.path()).unwrap();
        let ids: Vec<&str> = presets.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["atelier", "studio"]);
        assert_eq!(presets["studio"].pages.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let presets = discover_presets(&dir.path().join("absent")).unwrap();
        assert!(presets.is_empty());
    }

    #[test]
    fn test_load_json_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, "[1, 2").unwrap();

        let err = load_json::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, EngineError::Json { .. }));
        assert!(err.to_string().contains("content.json"));
    }
}
