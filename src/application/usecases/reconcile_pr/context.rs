//! 실행 컨텍스트(설정/대상/게이트웨이/정책) 준비 단계.

use anyhow::{Context, Result, bail};

use crate::application::config::Config;
use crate::application::ports::HygieneGateway;
use crate::application::usecases::reconcile_pr::ReconcilePrUseCase;
use crate::domain::hygiene::RunOptions;
use crate::domain::policy::HygienePolicy;
use crate::domain::target::PullRequestTarget;

/// 유스케이스 전 구간에서 공유되는 실행 상태.
pub(super) struct ExecutionContext {
    pub config: Config,
    pub target: PullRequestTarget,
    pub gateway: Box<dyn HygieneGateway>,
    pub policy: HygienePolicy,
    pub owner_logins: Vec<String>,
}

/// 설정 로딩, 대상 파싱, 토큰 해석, 정책 컴파일까지 선행한다.
/// 여기서의 오류만 실행을 중단시킨다(플랫폼 호출 전).
pub(super) fn load_execution_context(
    use_case: &ReconcilePrUseCase<'_>,
    options: &RunOptions,
) -> Result<ExecutionContext> {
    use_case.reporter.section("Load Config");
    let config = use_case
        .config_repo
        .load()
        .context("failed to load tidypilot config")?;

    let policy = config
        .policy()
        .context("failed to compile hygiene policy from config")?;

    let target = use_case
        .target_resolver
        .parse(&options.url)
        .context("failed to parse target URL")?;

    let host_cfg = config.host_config(target.host());
    let token = use_case
        .host_token_resolver
        .resolve(target.host(), host_cfg)?;

    if !options.dry_run && token.token.is_none() {
        bail!(
            "missing VCS token for host '{}'. Configure hosts.{}.token, token_env or token_command, export GITHUB_TOKEN, or use --dry-run",
            target.host(),
            target.host(),
        );
    }

    use_case.reporter.kv("Host", target.host());
    use_case.reporter.kv("Target", &target.slug());
    if let Some(source) = &token.source {
        use_case.reporter.kv("Token", source);
    }

    let owner_logins = merge_owner_logins(&options.owner_logins, &config.owner_logins());
    let owners_label = if owner_logins.is_empty() {
        "(none)".to_string()
    } else {
        owner_logins.join(", ")
    };
    use_case.reporter.kv("Owners", &owners_label);

    let gateway = use_case
        .gateway_factory
        .build(&target, host_cfg, token.token, options.dry_run);

    Ok(ExecutionContext {
        config,
        target,
        gateway,
        policy,
        owner_logins,
    })
}

/// CLI 값과 설정 값을 합친다(대소문자 무시 중복 제거, 입력 순서 유지).
pub(super) fn merge_owner_logins(cli: &[String], configured: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for login in cli.iter().chain(configured) {
        let login = login.trim();
        if login.is_empty() || out.iter().any(|o| o.eq_ignore_ascii_case(login)) {
            continue;
        }
        out.push(login.to_string());
    }
    out
}
