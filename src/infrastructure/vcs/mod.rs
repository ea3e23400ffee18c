//! 리뷰 플랫폼(VCS) 연동 계층.

pub mod github;

use crate::application::config::HostConfig;
use crate::domain::target::PullRequestTarget;

/// 대상 PR의 owner/repo에 묶인 GitHub 클라이언트를 생성한다.
pub fn build_github_client(
    target: &PullRequestTarget,
    host_cfg: Option<&HostConfig>,
    token: Option<String>,
) -> github::GitHubClient {
    let api_base = host_cfg.and_then(|h| h.api_base.clone());

    github::GitHubClient::new(
        target.host.clone(),
        target.owner.clone(),
        target.repo.clone(),
        token,
        api_base,
    )
}
