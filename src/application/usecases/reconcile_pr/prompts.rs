//! maintainer가 남긴 자동화 트리거 코멘트 정리 단계.

use futures::stream::{FuturesUnordered, StreamExt};

use crate::application::usecases::reconcile_pr::engine::{HygieneEngine, settle};
use crate::domain::hygiene::{IssueComment, RunResult};

/// 이미 판별된 트리거 코멘트를 병렬 삭제한다. 개별 실패는 다른 삭제를 막지 않는다.
pub(super) async fn clean_prompt_comments(
    engine: &HygieneEngine<'_>,
    comments: &[&IssueComment],
) -> RunResult {
    let mut deletions = FuturesUnordered::new();

    for comment in comments {
        deletions.push(async move {
            let deleted = settle(
                "delete_comment",
                &comment.id,
                engine.gateway.delete_comment(&comment.id).await,
            )
            .is_some();
            (comment, deleted)
        });
    }

    let mut deleted = 0;
    while let Some((comment, ok)) = deletions.next().await {
        if ok {
            deleted += 1;
            engine.reporter.status(
                "prompt",
                &format!("deleted comment {} by {}", comment.id, comment.author),
            );
        } else {
            engine.reporter.status(
                "prompt",
                &format!("failed to delete comment {} by {}", comment.id, comment.author),
            );
        }
    }

    RunResult {
        deleted,
        ..RunResult::default()
    }
}
