//! 설정 값(token/env/cmd)을 실제 런타임 토큰으로 해석하는 유틸리티.
//!
//! - 환경변수/프로세스 실행은 인프라 계층에서만 수행한다.

use std::env;
use std::process::Command;

use anyhow::{Context, Result};

use crate::application::config::HostConfig;
use crate::application::ports::HostTokenResolution;

/// 호스트 설정이 없거나 비어 있을 때 확인하는 환경변수(GitHub Actions 관례).
const FALLBACK_TOKEN_ENVS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Host(VCS) 토큰을 해석한다.
/// 우선순위: inline token → token_env → token_command → GITHUB_TOKEN/GH_TOKEN.
pub fn resolve_host_token(host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution> {
    let mut env_hint: Option<String> = None;
    let mut cmd_hint: Option<String> = None;

    if let Some(cfg) = host_cfg {
        if let Some(token) = cfg.token.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            return Ok(HostTokenResolution {
                token: Some(token.to_string()),
                source: Some("inline".to_string()),
            });
        }

        if let Some(env_name) = cfg.token_env.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            match read_env(env_name) {
                Some(v) => {
                    return Ok(HostTokenResolution {
                        token: Some(v),
                        source: Some(format!("env:{env_name}")),
                    });
                }
                None => env_hint = Some(format!("env:{env_name} (missing)")),
            }
        }

        if let Some(cmd) = cfg
            .token_command
            .as_ref()
            .filter(|v| v.iter().any(|s| !s.trim().is_empty()))
        {
            let label = format!("cmd:{}", cmd.join(" "));
            match run_token_command(cmd) {
                Ok(token) if !token.trim().is_empty() => {
                    return Ok(HostTokenResolution {
                        token: Some(token.trim().to_string()),
                        source: Some(label),
                    });
                }
                Ok(_) => cmd_hint = Some(format!("{label} (empty)")),
                Err(err) => {
                    tracing::debug!(error = %format!("{err:#}"), "token command failed");
                    cmd_hint = Some(format!("{label} (failed)"));
                }
            }
        }
    }

    for env_name in FALLBACK_TOKEN_ENVS {
        if let Some(v) = read_env(env_name) {
            return Ok(HostTokenResolution {
                token: Some(v),
                source: Some(format!("env:{env_name}")),
            });
        }
    }

    Ok(HostTokenResolution {
        token: None,
        source: cmd_hint.or(env_hint),
    })
}

fn read_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn run_token_command(cmd: &[String]) -> Result<String> {
    let program = cmd
        .first()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context("token_command is empty")?;

    let output = Command::new(&program)
        .args(cmd.iter().skip(1))
        .output()
        .with_context(|| format!("failed to run token command: {program}"))?;

    if !output.status.success() {
        anyhow::bail!("token command failed: {program} ({})", output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_token_wins() {
        let cfg = HostConfig {
            token: Some("  abc  ".to_string()),
            token_env: Some("TIDYPILOT_TEST_UNUSED_ENV".to_string()),
            ..HostConfig::default()
        };
        let resolved = resolve_host_token(Some(&cfg)).unwrap();
        assert_eq!(resolved.token.as_deref(), Some("abc"));
        assert_eq!(resolved.source.as_deref(), Some("inline"));
    }

    #[cfg(unix)]
    #[test]
    fn token_command_output_is_trimmed() {
        let cfg = HostConfig {
            token_command: Some(vec!["echo".to_string(), "from-cmd".to_string()]),
            ..HostConfig::default()
        };
        let resolved = resolve_host_token(Some(&cfg)).unwrap();
        assert_eq!(resolved.token.as_deref(), Some("from-cmd"));
        assert_eq!(resolved.source.as_deref(), Some("cmd:echo from-cmd"));
    }
}
