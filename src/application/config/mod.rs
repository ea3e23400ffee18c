//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수/프로세스 접근은 `infrastructure`에서만 수행한다.

use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::policy::{
    DEFAULT_FALLBACK_LOOKBACK_HOURS, DEFAULT_MAX_LISTED_FILES, HygienePolicy, PolicySpec,
};

pub const DEFAULT_SUMMARY_MARKER: &str = "<!-- tidypilot:status -->";
pub const DEFAULT_SUMMARY_SECTION_ID: &str = "thread-hygiene";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// 전역 기본값
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// VCS 호스트별 인증/엔드포인트 설정
    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,
    /// 분류/정리 정책 override
    #[serde(default)]
    pub hygiene: HygieneConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DefaultsConfig {
    /// 트리거 코멘트 삭제 대상 maintainer 로그인(CLI `--owner`와 합쳐진다)
    pub owner_logins: Option<Vec<String>>,
    /// 근거 reply에 나열할 최대 파일 수
    pub max_listed_files: Option<usize>,
    /// 미해결 코멘트가 없을 때 커밋 탐색 구간(시간)
    pub fallback_lookback_hours: Option<i64>,
    /// 상태 코멘트 식별 마커
    pub summary_marker: Option<String>,
    /// 상태 코멘트 내 섹션 id
    pub summary_section_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HostConfig {
    /// 고정 토큰(민감정보: 권장하지 않음)
    pub token: Option<String>,
    /// 토큰을 읽을 환경변수 이름
    pub token_env: Option<String>,
    /// 토큰을 stdout으로 출력하는 커맨드(예: ["gh","auth","token"])
    pub token_command: Option<Vec<String>>,
    /// API base URL override(선택)
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HygieneConfig {
    /// 삭제 대상에서 제외할 자동화 계정(대소문자 무시)
    pub bot_logins: Option<Vec<String>>,
    /// `@name` 형태로 감지할 에이전트 이름
    pub agent_mentions: Option<Vec<String>>,
    /// 줄 시작에서 감지할 슬래시 명령
    pub slash_commands: Option<Vec<String>>,
    /// 자동 해결 금지 대상을 판별하는 정규식(대소문자 무시)
    pub valuable_patterns: Option<Vec<String>>,
}

impl Config {
    pub fn owner_logins(&self) -> Vec<String> {
        self.defaults.owner_logins.clone().unwrap_or_default()
    }

    pub fn summary_marker(&self) -> String {
        self.defaults
            .summary_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY_MARKER.to_string())
    }

    pub fn summary_section_id(&self) -> String {
        self.defaults
            .summary_section_id
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY_SECTION_ID.to_string())
    }

    pub fn policy_spec(&self) -> PolicySpec {
        let base = PolicySpec::default();
        let hygiene = &self.hygiene;
        PolicySpec {
            bot_logins: hygiene.bot_logins.clone().unwrap_or(base.bot_logins),
            agent_mentions: hygiene
                .agent_mentions
                .clone()
                .unwrap_or(base.agent_mentions),
            slash_commands: hygiene
                .slash_commands
                .clone()
                .unwrap_or(base.slash_commands),
            valuable_patterns: hygiene
                .valuable_patterns
                .clone()
                .unwrap_or(base.valuable_patterns),
            max_listed_files: self
                .defaults
                .max_listed_files
                .unwrap_or(DEFAULT_MAX_LISTED_FILES),
            fallback_lookback_hours: self
                .defaults
                .fallback_lookback_hours
                .unwrap_or(DEFAULT_FALLBACK_LOOKBACK_HOURS),
        }
    }

    /// 정책 값을 컴파일한다. 잘못된 정규식은 여기서 오류가 된다.
    pub fn policy(&self) -> Result<HygienePolicy> {
        HygienePolicy::new(self.policy_spec())
    }

    pub fn host_config(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.get(host)
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Config) {
        self.defaults.merge_from(other.defaults);

        for (host, incoming) in other.hosts {
            if let Some(existing) = self.hosts.get_mut(&host) {
                existing.merge_from(incoming);
            } else {
                self.hosts.insert(host, incoming);
            }
        }

        self.hygiene.merge_from(other.hygiene);
    }
}

impl DefaultsConfig {
    pub fn merge_from(&mut self, other: DefaultsConfig) {
        if other.owner_logins.is_some() {
            self.owner_logins = other.owner_logins;
        }
        if other.max_listed_files.is_some() {
            self.max_listed_files = other.max_listed_files;
        }
        if other.fallback_lookback_hours.is_some() {
            self.fallback_lookback_hours = other.fallback_lookback_hours;
        }
        if other.summary_marker.is_some() {
            self.summary_marker = other.summary_marker;
        }
        if other.summary_section_id.is_some() {
            self.summary_section_id = other.summary_section_id;
        }
    }
}

impl HostConfig {
    pub fn merge_from(&mut self, other: HostConfig) {
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.token_env.is_some() {
            self.token_env = other.token_env;
        }
        if other.token_command.is_some() {
            self.token_command = other.token_command;
        }
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
    }
}

impl HygieneConfig {
    pub fn merge_from(&mut self, other: HygieneConfig) {
        if other.bot_logins.is_some() {
            self.bot_logins = other.bot_logins;
        }
        if other.agent_mentions.is_some() {
            self.agent_mentions = other.agent_mentions;
        }
        if other.slash_commands.is_some() {
            self.slash_commands = other.slash_commands;
        }
        if other.valuable_patterns.is_some() {
            self.valuable_patterns = other.valuable_patterns;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Config {
        serde_json::from_str(raw).expect("valid config json")
    }

    #[test]
    fn later_config_overrides_and_lists_replace() {
        let mut merged = parse(
            r#"{
                "defaults": { "owner_logins": ["alice"], "max_listed_files": 3 },
                "hosts": { "github.com": { "token_env": "GITHUB_TOKEN" } },
                "hygiene": { "agent_mentions": ["claude", "codex"] }
            }"#,
        );
        merged.merge_from(parse(
            r#"{
                "defaults": { "owner_logins": ["bob"] },
                "hosts": { "github.com": { "api_base": "https://proxy.local" } },
                "hygiene": { "agent_mentions": ["bot"] }
            }"#,
        ));

        assert_eq!(merged.owner_logins(), vec!["bob".to_string()]);
        assert_eq!(merged.defaults.max_listed_files, Some(3));
        let host = merged.host_config("github.com").unwrap();
        assert_eq!(host.token_env.as_deref(), Some("GITHUB_TOKEN"));
        assert_eq!(host.api_base.as_deref(), Some("https://proxy.local"));
        assert_eq!(merged.policy_spec().agent_mentions, vec!["bot".to_string()]);
    }

    #[test]
    fn empty_config_uses_policy_defaults() {
        let config = Config::default();
        let spec = config.policy_spec();
        assert_eq!(spec.max_listed_files, DEFAULT_MAX_LISTED_FILES);
        assert_eq!(spec.fallback_lookback_hours, DEFAULT_FALLBACK_LOOKBACK_HOURS);
        assert!(spec.bot_logins.iter().any(|b| b == "github-actions[bot]"));
        assert_eq!(config.summary_marker(), DEFAULT_SUMMARY_MARKER);
        assert_eq!(config.summary_section_id(), DEFAULT_SUMMARY_SECTION_ID);
        assert!(config.policy().is_ok());
    }

    #[test]
    fn invalid_pattern_fails_policy_compilation() {
        let config = parse(r#"{ "hygiene": { "valuable_patterns": ["[oops"] } }"#);
        assert!(config.policy().is_err());
    }
}
