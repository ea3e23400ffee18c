//! 플랫폼 게이트웨이 팩토리 포트 구현 어댑터.

use crate::application::config::HostConfig;
use crate::application::ports::{GatewayFactory, HygieneGateway};
use crate::domain::target::PullRequestTarget;
use crate::infrastructure::adapters::DryRunGateway;
use crate::infrastructure::vcs;

/// 대상 PR에 묶인 GitHub 게이트웨이를 만들고, dry-run이면 쓰기 차단 래퍼로 감싼다.
pub struct GatewayFactoryAdapter;

impl GatewayFactory for GatewayFactoryAdapter {
    fn build(
        &self,
        target: &PullRequestTarget,
        host_cfg: Option<&HostConfig>,
        token: Option<String>,
        dry_run: bool,
    ) -> Box<dyn HygieneGateway> {
        let client = vcs::build_github_client(target, host_cfg, token);
        if dry_run {
            Box::new(DryRunGateway::new(Box::new(client)))
        } else {
            Box::new(client)
        }
    }
}
