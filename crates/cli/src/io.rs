use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Suffix of generated description files; skipped when loading metadata.
pub const DESCRIPTION_SUFFIX: &str = ".llm.json";

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Pretty-print `value` to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote report");
    Ok(())
}

/// `report.json` → `report.stats.json`
pub fn stats_path(report: &Path) -> PathBuf {
    let stem = report
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    report.with_file_name(format!("{stem}.stats.json"))
}

/// Table metadata files in `folder`, sorted; generated descriptions excluded.
pub fn metadata_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(folder).with_context(|| format!("Failed to list {}", folder.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && name.ends_with(".json") && !name.ends_with(DESCRIPTION_SUFFIX) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_path_replaces_extension() {
        assert_eq!(
            stats_path(Path::new("reports/bench_01J.json")),
            PathBuf::from("reports/bench_01J.stats.json")
        );
    }

    #[test]
    fn lists_only_metadata_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Album.json", "Artist.json", "descriptions.llm.json", "notes.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let names: Vec<String> = metadata_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Album.json", "Artist.json"]);
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("value.json");
        write_json(&path, &serde_json::json!({"total": 3})).unwrap();
        let back: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(back["total"], 3);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_json::<serde_json::Value>(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/settings.json"));
    }
}
