//! 조회는 위임하고 변경 호출은 기록만 하는 dry-run 게이트웨이.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::ports::HygieneGateway;
use crate::domain::hygiene::{CommitFiles, IssueComment, ReviewThread, Sentiment};

/// 실제 게이트웨이를 감싸 쓰기 동작을 성공으로 가정한다.
/// 집계 결과는 "실행했다면" 나올 값이 된다.
pub struct DryRunGateway {
    inner: Box<dyn HygieneGateway>,
    planned: Mutex<Vec<String>>,
}

impl DryRunGateway {
    pub fn new(inner: Box<dyn HygieneGateway>) -> Self {
        Self {
            inner,
            planned: Mutex::new(Vec::new()),
        }
    }

    /// 지금까지 기록된 (실행되지 않은) 변경 목록.
    #[cfg(test)]
    fn planned(&self) -> Vec<String> {
        self.planned
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn plan(&self, line: String) {
        tracing::info!(planned = %line, "dry-run: mutation skipped");
        if let Ok(mut planned) = self.planned.lock() {
            planned.push(line);
        }
    }
}

#[async_trait]
impl HygieneGateway for DryRunGateway {
    async fn fetch_threads(&self, pr_number: u64) -> Result<Vec<ReviewThread>> {
        self.inner.fetch_threads(pr_number).await
    }

    async fn fetch_comments(&self, pr_number: u64) -> Result<Vec<IssueComment>> {
        self.inner.fetch_comments(pr_number).await
    }

    async fn fetch_commit_files(
        &self,
        pr_number: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitFiles>> {
        self.inner.fetch_commit_files(pr_number, since).await
    }

    async fn resolve_thread(&self, thread_id: &str) -> Result<()> {
        self.plan(format!("resolve thread {thread_id}"));
        Ok(())
    }

    async fn reply_to_thread(
        &self,
        _pr_number: u64,
        anchor_comment_id: &str,
        _body: &str,
    ) -> Result<String> {
        self.plan(format!("reply to comment {anchor_comment_id}"));
        Ok(format!("dry-run-{anchor_comment_id}"))
    }

    async fn minimize_comment(&self, comment_id: &str) -> Result<()> {
        self.plan(format!("minimize comment {comment_id}"));
        Ok(())
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        self.plan(format!("delete comment {comment_id}"));
        Ok(())
    }

    async fn react(&self, comment_id: &str, sentiment: Sentiment) -> Result<()> {
        self.plan(format!("react {sentiment:?} on {comment_id}"));
        Ok(())
    }

    async fn upsert_section(
        &self,
        _pr_number: u64,
        _marker: &str,
        section_id: &str,
        _body: &str,
    ) -> Result<()> {
        self.plan(format!("upsert section {section_id}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;

    struct ReadOnly;

    #[async_trait]
    impl HygieneGateway for ReadOnly {
        async fn fetch_threads(&self, _pr_number: u64) -> Result<Vec<ReviewThread>> {
            Ok(Vec::new())
        }
        async fn fetch_comments(&self, _pr_number: u64) -> Result<Vec<IssueComment>> {
            Ok(Vec::new())
        }
        async fn fetch_commit_files(
            &self,
            _pr_number: u64,
            _since: DateTime<Utc>,
        ) -> Result<Vec<CommitFiles>> {
            Ok(Vec::new())
        }
        async fn resolve_thread(&self, _thread_id: &str) -> Result<()> {
            bail!("write reached inner gateway")
        }
        async fn reply_to_thread(&self, _pr: u64, _anchor: &str, _body: &str) -> Result<String> {
            bail!("write reached inner gateway")
        }
        async fn minimize_comment(&self, _comment_id: &str) -> Result<()> {
            bail!("write reached inner gateway")
        }
        async fn delete_comment(&self, _comment_id: &str) -> Result<()> {
            bail!("write reached inner gateway")
        }
        async fn react(&self, _comment_id: &str, _sentiment: Sentiment) -> Result<()> {
            bail!("write reached inner gateway")
        }
        async fn upsert_section(
            &self,
            _pr: u64,
            _marker: &str,
            _section_id: &str,
            _body: &str,
        ) -> Result<()> {
            bail!("write reached inner gateway")
        }
    }

    #[tokio::test]
    async fn writes_are_recorded_not_forwarded() {
        let gateway = DryRunGateway::new(Box::new(ReadOnly));

        assert!(gateway.fetch_threads(1).await.unwrap().is_empty());
        gateway.resolve_thread("T1").await.unwrap();
        gateway.delete_comment("55").await.unwrap();
        gateway
            .react("C1", Sentiment::Negative)
            .await
            .unwrap();

        assert_eq!(
            gateway.planned(),
            vec![
                "resolve thread T1".to_string(),
                "delete comment 55".to_string(),
                "react Negative on C1".to_string(),
            ]
        );
    }
}
