//! 애플리케이션 조립(composition root) 모듈.

use crate::application::ports::Reporter;
use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::application::usecases::reconcile_pr::ReconcilePrUseCase;
use crate::domain::hygiene::RunResult;
use crate::infrastructure::adapters::{
    ConsoleReporter, GatewayFactoryAdapter, HostTokenResolverAdapter, JsonConfigRepository,
    MarkdownRendererAdapter, UrlTargetResolver,
};

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config_repo: JsonConfigRepository,
    host_token_resolver: HostTokenResolverAdapter,
    target_resolver: UrlTargetResolver,
    gateway_factory: GatewayFactoryAdapter,
    renderer: MarkdownRendererAdapter,
    reporter: ConsoleReporter,
}

impl Default for AppComposition {
    fn default() -> Self {
        Self {
            config_repo: JsonConfigRepository,
            host_token_resolver: HostTokenResolverAdapter,
            target_resolver: UrlTargetResolver,
            gateway_factory: GatewayFactoryAdapter,
            renderer: MarkdownRendererAdapter,
            reporter: ConsoleReporter::new(),
        }
    }
}

impl AppComposition {
    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> InspectConfigUseCase<'_> {
        InspectConfigUseCase {
            config_repo: &self.config_repo,
        }
    }

    /// 스레드 정리 유스케이스를 생성한다.
    pub fn reconcile_usecase(&self) -> ReconcilePrUseCase<'_> {
        ReconcilePrUseCase {
            config_repo: &self.config_repo,
            host_token_resolver: &self.host_token_resolver,
            target_resolver: &self.target_resolver,
            gateway_factory: &self.gateway_factory,
            renderer: &self.renderer,
            reporter: &self.reporter,
        }
    }

    /// 실행 결과 요약을 콘솔에 출력한다.
    pub fn report_result(&self, result: &RunResult) {
        self.reporter.section("Result");
        self.reporter.kv("Resolved", &result.resolved.to_string());
        self.reporter.kv("Replied", &result.replied.to_string());
        self.reporter.kv("Minimized", &result.minimized.to_string());
        self.reporter.kv("Deleted", &result.deleted.to_string());
    }
}
