//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::config::{Config, HostConfig};
use crate::domain::hygiene::{
    CommitFiles, IssueComment, ReviewThread, RunResult, Sentiment,
};
use crate::domain::target::PullRequestTarget;

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn inspect_pretty_json(&self) -> Result<String>;
}

/// Host 토큰 해석 결과(토큰 값 + 출처 라벨).
#[derive(Debug, Clone)]
pub struct HostTokenResolution {
    pub token: Option<String>,
    pub source: Option<String>,
}

/// 설정(token/env/cmd)에서 런타임 토큰을 해석하는 포트.
pub trait HostTokenResolver: Send + Sync {
    fn resolve(&self, host: &str, host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution>;
}

/// URL 입력값을 도메인 대상 식별자로 변환하는 포트.
pub trait TargetResolver: Send + Sync {
    fn parse(&self, input: &str) -> Result<PullRequestTarget>;
}

/// 리뷰 플랫폼 연동 포트.
///
/// 모든 호출은 `Result`를 반환하고, 엔진은 실패를 `false`/빈 값으로 낮춰 처리한다.
/// 어떤 실패도 엔진 밖으로 전파되지 않는다.
#[async_trait]
pub trait HygieneGateway: Send + Sync {
    async fn fetch_threads(&self, pr_number: u64) -> Result<Vec<ReviewThread>>;
    async fn fetch_comments(&self, pr_number: u64) -> Result<Vec<IssueComment>>;
    /// `since` 이후(초과) 작성된 커밋과 각 커밋의 변경 파일.
    async fn fetch_commit_files(
        &self,
        pr_number: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitFiles>>;
    async fn resolve_thread(&self, thread_id: &str) -> Result<()>;
    /// 스레드에 reply를 달고 생성된 reply id를 반환한다.
    async fn reply_to_thread(
        &self,
        pr_number: u64,
        anchor_comment_id: &str,
        body: &str,
    ) -> Result<String>;
    async fn minimize_comment(&self, comment_id: &str) -> Result<()>;
    async fn delete_comment(&self, comment_id: &str) -> Result<()>;
    async fn react(&self, comment_id: &str, sentiment: Sentiment) -> Result<()>;
    /// 마커로 식별되는 코멘트의 섹션을 생성/병합한다(멱등).
    async fn upsert_section(
        &self,
        pr_number: u64,
        marker: &str,
        section_id: &str,
        body: &str,
    ) -> Result<()>;
}

/// 대상/호스트 설정에 맞는 게이트웨이를 생성하는 팩토리 포트.
pub trait GatewayFactory: Send + Sync {
    fn build(
        &self,
        target: &PullRequestTarget,
        host_cfg: Option<&HostConfig>,
        token: Option<String>,
        dry_run: bool,
    ) -> Box<dyn HygieneGateway>;
}

/// reply/요약 마크다운 렌더링 포트.
pub trait MarkdownRenderer: Send + Sync {
    fn render_addressed_reply(&self, commit: &CommitFiles, max_files: usize) -> String;
    fn render_outdated_reply(&self, commit: Option<&CommitFiles>, max_files: usize) -> String;
    fn render_summary(&self, result: &RunResult) -> String;
}

/// 콘솔/로그 출력 추상화 포트.
pub trait Reporter: Send + Sync {
    fn section(&self, name: &str);
    fn kv(&self, key: &str, value: &str);
    fn status(&self, scope: &str, message: &str);
}
