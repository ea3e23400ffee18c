//! 적용 설정 진단(inspection) 뷰 모델.

use std::collections::BTreeMap;

use serde::Serialize;

use super::loader::LoadedConfig;
use super::resolve::resolve_host_token;
use crate::application::config::{DefaultsConfig, HostConfig, HygieneConfig};

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    pub defaults: DefaultsConfig,
    pub hygiene: HygieneConfig,
    pub effective_defaults: EffectiveDefaults,
    pub hosts: BTreeMap<String, HostInspection>,
    pub policy_valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveDefaults {
    pub owner_logins: Vec<String>,
    pub max_listed_files: usize,
    pub fallback_lookback_hours: i64,
    pub summary_marker: String,
    pub summary_section_id: String,
    pub bot_logins: Vec<String>,
    pub agent_mentions: Vec<String>,
    pub slash_commands: Vec<String>,
    pub valuable_patterns: Vec<String>,
}

/// 토큰 값은 노출하지 않고 출처/해석 여부만 보여준다.
#[derive(Debug, Clone, Serialize)]
pub struct HostInspection {
    pub token_source: Option<String>,
    pub token_resolved: bool,
    pub api_base: Option<String>,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let mut hosts = BTreeMap::new();
        for (host, cfg) in &loaded.config.hosts {
            hosts.insert(host.clone(), host_inspection(cfg));
        }

        let config = &loaded.config;
        let spec = config.policy_spec();

        Self {
            searched_paths: loaded
                .searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            loaded_paths: loaded
                .loaded_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            defaults: config.defaults.clone(),
            hygiene: config.hygiene.clone(),
            effective_defaults: EffectiveDefaults {
                owner_logins: config.owner_logins(),
                max_listed_files: spec.max_listed_files,
                fallback_lookback_hours: spec.fallback_lookback_hours,
                summary_marker: config.summary_marker(),
                summary_section_id: config.summary_section_id(),
                bot_logins: spec.bot_logins,
                agent_mentions: spec.agent_mentions,
                slash_commands: spec.slash_commands,
                valuable_patterns: spec.valuable_patterns,
            },
            hosts,
            policy_valid: config.policy().is_ok(),
        }
    }
}

fn host_inspection(cfg: &HostConfig) -> HostInspection {
    let token_resolution = resolve_host_token(Some(cfg)).ok();
    HostInspection {
        token_source: token_resolution.as_ref().and_then(|r| r.source.clone()),
        token_resolved: token_resolution
            .as_ref()
            .and_then(|r| r.token.as_ref())
            .is_some(),
        api_base: cfg.api_base.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::application::config::Config;

    #[test]
    fn inspection_never_contains_inline_token() {
        let config: Config = serde_json::from_str(
            r#"{ "hosts": { "github.com": { "token": "super-secret" } } }"#,
        )
        .unwrap();
        let inspection = ConfigInspection::from_loaded(LoadedConfig {
            config,
            searched_paths: vec![PathBuf::from("a.json")],
            loaded_paths: vec![PathBuf::from("a.json")],
        });

        let host = &inspection.hosts["github.com"];
        assert!(host.token_resolved);
        assert_eq!(host.token_source.as_deref(), Some("inline"));
        assert!(inspection.policy_valid);

        let json = serde_json::to_string(&inspection).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
