//! 스레드 정리 엔진: 조회 → 분류/실행 + 트리거 정리 → 요약 게시.

use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::join;

use crate::application::ports::{HygieneGateway, MarkdownRenderer, Reporter};
use crate::application::usecases::reconcile_pr::{prompts, threads};
use crate::domain::hygiene::{IssueComment, ReviewThread, RunResult};
use crate::domain::policy::HygienePolicy;

/// 엔진 1회 실행 입력.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub pr_number: u64,
    pub owner_logins: Vec<String>,
}

/// 요약 섹션 위치(마커 + 섹션 id).
#[derive(Debug, Clone)]
pub struct SummarySlot {
    pub marker: String,
    pub section_id: String,
}

/// 한 PR에 대한 조정(reconciliation) 엔진.
/// 장기 상태를 갖지 않으며, 모든 엔티티는 실행 동안만 빌려 쓰는 스냅샷이다.
pub struct HygieneEngine<'a> {
    pub gateway: &'a dyn HygieneGateway,
    pub policy: &'a HygienePolicy,
    pub renderer: &'a dyn MarkdownRenderer,
    pub reporter: &'a dyn Reporter,
    pub summary: SummarySlot,
}

impl<'a> HygieneEngine<'a> {
    pub async fn run(&self, request: &ReconcileRequest) -> RunResult {
        self.run_at(request, Utc::now()).await
    }

    /// 기준 시각을 주입받는 실행 진입점.
    pub async fn run_at(&self, request: &ReconcileRequest, now: DateTime<Utc>) -> RunResult {
        let pr = request.pr_number;

        self.reporter.section("Fetch");
        let (threads, comments) = join!(
            self.gateway.fetch_threads(pr),
            self.gateway.fetch_comments(pr)
        );
        let threads: Vec<ReviewThread> = settle("fetch_threads", pr, threads).unwrap_or_default();
        let comments: Vec<IssueComment> =
            settle("fetch_comments", pr, comments).unwrap_or_default();

        let unresolved: Vec<&ReviewThread> = threads.iter().filter(|t| !t.is_resolved).collect();
        let prompt_comments: Vec<&IssueComment> = comments
            .iter()
            .filter(|c| self.policy.is_prompt_comment(c, &request.owner_logins))
            .collect();

        self.reporter
            .kv("Threads", &format!("{} ({} unresolved)", threads.len(), unresolved.len()));
        self.reporter
            .kv("Prompts", &prompt_comments.len().to_string());

        if unresolved.is_empty() && prompt_comments.is_empty() {
            self.reporter.status("Hygiene", "nothing to reconcile");
            return RunResult::default();
        }

        let commits = if unresolved.is_empty() {
            Vec::new()
        } else {
            let cutoff = self.policy.commit_cutoff(&threads, now);
            self.reporter.kv("Cutoff", &cutoff.to_rfc3339());
            let commits = settle(
                "fetch_commit_files",
                pr,
                self.gateway.fetch_commit_files(pr, cutoff).await,
            )
            .unwrap_or_default();
            self.reporter.kv("Commits", &commits.len().to_string());
            commits
        };

        self.reporter.section("Reconcile");
        let (thread_result, prompt_result) = join!(
            threads::process_threads(self, pr, &unresolved, &commits),
            prompts::clean_prompt_comments(self, &prompt_comments)
        );
        let result = thread_result.merge(prompt_result);

        self.publish_summary(pr, &result).await;
        result
    }

    async fn publish_summary(&self, pr: u64, result: &RunResult) {
        self.reporter.section("Summary");
        if result.is_empty() {
            self.reporter.status("Summary", "no changes; status section left as is");
            return;
        }

        let body = self.renderer.render_summary(result);
        let posted = settle(
            "upsert_section",
            &self.summary.section_id,
            self.gateway
                .upsert_section(pr, &self.summary.marker, &self.summary.section_id, &body)
                .await,
        );
        if posted.is_some() {
            self.reporter.status("Summary", "status section updated");
        }
    }
}

/// 플랫폼 호출 결과를 낮춰(degrade) 처리한다. 실패는 경고 로그 한 줄만 남긴다.
pub(super) fn settle<T>(operation: &str, subject: impl Display, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(operation, subject = %subject, error = %format!("{err:#}"), "platform call failed");
            None
        }
    }
}
