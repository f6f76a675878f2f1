// file: src/state/store.rs
// description: json file persistence with atomic replacement
// reference: https://docs.rs/tokio/latest/tokio/fs

use crate::error::{AssistantError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Reads `path`, returning `T::default()` when the file does not exist yet.
pub async fn load_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!("No existing state file at {:?}", path);
        return Ok(T::default());
    }

    let contents = fs::read_to_string(path)
        .await
        .map_err(|source| AssistantError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

    if contents.trim().is_empty() {
        warn!("State file {:?} is empty, starting fresh", path);
        return Ok(T::default());
    }

    serde_json::from_str(&contents).map_err(|e| {
        AssistantError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Writes to a sibling temp file and renames it over `path`.
pub async fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| AssistantError::FileOperation {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let contents = serde_json::to_string_pretty(value)?;
    let temp_path = temp_path_for(path);

    fs::write(&temp_path, contents)
        .await
        .map_err(|source| AssistantError::FileOperation {
            path: temp_path.clone(),
            source,
        })?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|source| AssistantError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Saved state to {:?}", path);
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_round_trip_and_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let missing: BTreeMap<String, u32> = load_json(&path).await.unwrap();
        assert!(missing.is_empty());

        let mut value = BTreeMap::new();
        value.insert("a".to_string(), 1u32);
        save_json(&path, &value).await.unwrap();

        let loaded: BTreeMap<String, u32> = load_json(&path).await.unwrap();
        assert_eq!(loaded, value);
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<BTreeMap<String, u32>> = load_json(&path).await;
        assert!(matches!(result, Err(AssistantError::Serialization(_))));
    }
}
