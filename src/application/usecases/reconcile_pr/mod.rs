//! PR 리뷰 스레드 조정(reconciliation) 유스케이스.

mod context;
mod engine;
mod prompts;
mod threads;


use anyhow::Result;

use crate::application::ports::{
    ConfigRepository, GatewayFactory, HostTokenResolver, MarkdownRenderer, Reporter,
    TargetResolver,
};
use crate::domain::hygiene::{RunOptions, RunResult};

use context::load_execution_context;

pub use engine::{HygieneEngine, ReconcileRequest, SummarySlot};

/// URL 입력부터 스레드 정리, 트리거 코멘트 삭제, 요약 게시까지 전체 흐름을 조율한다.
pub struct ReconcilePrUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub host_token_resolver: &'a dyn HostTokenResolver,
    pub target_resolver: &'a dyn TargetResolver,
    pub gateway_factory: &'a dyn GatewayFactory,
    pub renderer: &'a dyn MarkdownRenderer,
    pub reporter: &'a dyn Reporter,
}

impl<'a> ReconcilePrUseCase<'a> {
    /// 실행 진입점.
    /// 설정/대상 오류만 `Err`로 반환하고, 플랫폼 호출 실패는 집계 감소로만 드러난다.
    pub async fn execute(&self, options: RunOptions) -> Result<RunResult> {
        self.reporter.section("Session");
        self.reporter.kv("Target", &options.url);
        self.reporter.kv(
            "Mode",
            if options.dry_run {
                "dry-run"
            } else {
                "apply"
            },
        );

        let ctx = load_execution_context(self, &options)?;

        let engine = HygieneEngine {
            gateway: ctx.gateway.as_ref(),
            policy: &ctx.policy,
            renderer: self.renderer,
            reporter: self.reporter,
            summary: SummarySlot {
                marker: ctx.config.summary_marker(),
                section_id: ctx.config.summary_section_id(),
            },
        };

        let request = ReconcileRequest {
            pr_number: ctx.target.number,
            owner_logins: ctx.owner_logins.clone(),
        };

        Ok(engine.run(&request).await)
    }
}
