//! 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::config::Config;

pub(crate) const CONFIG_ENV: &str = "TIDYPILOT_CONFIG";

#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: Config,
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
}

/// 우선순위 경로를 순회해 JSON 설정을 병합한다. 파일이 하나도 없어도 된다.
pub(crate) fn load_merged_config() -> Result<LoadedConfig> {
    load_from_paths(config_paths())
}

pub(crate) fn load_from_paths(paths: Vec<PathBuf>) -> Result<LoadedConfig> {
    // 낮은 우선순위에서 높은 우선순위 순서로 병합한다.
    let mut merged = Config::default();
    let mut loaded_paths = Vec::new();

    for path in &paths {
        if !path.exists() {
            continue;
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let parsed: Config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
        merged.merge_from(parsed);
        loaded_paths.push(path.to_path_buf());
    }

    Ok(LoadedConfig {
        config: merged,
        searched_paths: paths,
        loaded_paths,
    })
}

/// 시스템 + 사용자 + 프로젝트 + 명시 경로 순으로 병합 경로를 구성한다.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/tidypilot/config.json")];

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join("tidypilot").join("config.json"));
    }

    paths.push(PathBuf::from(".tidypilot/config.json"));

    if let Ok(path) = env::var(CONFIG_ENV) {
        paths.push(Path::new(&path).to_path_buf());
    }

    dedup_paths(paths)
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for p in paths {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_existing_files_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let low = dir.path().join("low.json");
        let high = dir.path().join("high.json");
        let missing = dir.path().join("missing.json");
        fs::write(
            &low,
            r#"{ "defaults": { "owner_logins": ["alice"], "max_listed_files": 2 } }"#,
        )
        .unwrap();
        fs::write(&high, r#"{ "defaults": { "owner_logins": ["bob"] } }"#).unwrap();

        let loaded =
            load_from_paths(vec![low.clone(), missing.clone(), high.clone()]).unwrap();

        assert_eq!(loaded.searched_paths, vec![low.clone(), missing, high.clone()]);
        assert_eq!(loaded.loaded_paths, vec![low, high]);
        assert_eq!(loaded.config.owner_logins(), vec!["bob".to_string()]);
        assert_eq!(loaded.config.defaults.max_listed_files, Some(2));
    }

    #[test]
    fn no_files_yields_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_from_paths(vec![dir.path().join("none.json")]).unwrap();
        assert!(loaded.loaded_paths.is_empty());
        assert!(loaded.config.owner_logins().is_empty());
    }

    #[test]
    fn malformed_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();

        let err = load_from_paths(vec![bad.clone()]).unwrap_err();
        assert!(format!("{err:#}").contains(&bad.display().to_string()));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let a = PathBuf::from("a.json");
        let b = PathBuf::from("b.json");
        assert_eq!(
            dedup_paths(vec![a.clone(), b.clone(), a.clone()]),
            vec![a, b]
        );
    }
}
