//! 스레드별 분류 결과를 플랫폼 동작으로 실행하는 단계.

use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::application::usecases::reconcile_pr::engine::{HygieneEngine, settle};
use crate::domain::hygiene::{
    Action, Classification, CommitFiles, ReviewThread, RunResult, Sentiment, ThreadComment,
    mark_reply,
};

/// 스레드 1개 처리 결과. 실패한 하위 단계는 `false`로 남는다.
#[derive(Debug, Clone)]
pub(super) struct ThreadOutcome {
    pub thread_id: String,
    pub action: Action,
    pub replied: bool,
    pub resolved: bool,
    pub reacted: bool,
    pub minimized: usize,
}

impl ThreadOutcome {
    fn new(thread: &ReviewThread, action: Action) -> Self {
        Self {
            thread_id: thread.id.clone(),
            action,
            replied: false,
            resolved: false,
            reacted: false,
            minimized: 0,
        }
    }

    fn tally(&self) -> RunResult {
        RunResult {
            resolved: usize::from(self.resolved),
            replied: usize::from(self.replied),
            minimized: self.minimized,
            deleted: 0,
        }
    }
}

/// 미해결 스레드를 병렬로 분류/실행하고 결과를 합산한다.
/// 스레드 간 처리 순서는 정하지 않는다.
pub(super) async fn process_threads(
    engine: &HygieneEngine<'_>,
    pr: u64,
    threads: &[&ReviewThread],
    commits: &[CommitFiles],
) -> RunResult {
    let mut pipelines = FuturesUnordered::new();

    for thread in threads {
        pipelines.push(async move {
            let classification = engine.policy.classify(thread, commits);
            execute(engine, pr, thread, classification).await
        });
    }

    let mut total = RunResult::default();
    while let Some(outcome) = pipelines.next().await {
        tracing::info!(
            thread_id = %outcome.thread_id,
            action = %outcome.action,
            replied = outcome.replied,
            resolved = outcome.resolved,
            reacted = outcome.reacted,
            minimized = outcome.minimized,
            "thread processed"
        );
        if outcome.action != Action::Skip {
            engine
                .reporter
                .status(outcome.action.code(), &describe(&outcome));
        }
        total = total.merge(outcome.tally());
    }
    total
}

/// 분류 결과별 핸들러 디스패치.
pub(super) async fn execute(
    engine: &HygieneEngine<'_>,
    pr: u64,
    thread: &ReviewThread,
    classification: Classification<'_>,
) -> ThreadOutcome {
    match classification.action {
        Action::Reply => reply_with_evidence(engine, pr, thread, classification.evidence).await,
        Action::Resolve => resolve_outdated(engine, pr, thread, classification.evidence).await,
        Action::Valuable => acknowledge_valuable(engine, thread).await,
        Action::Skip => ThreadOutcome::new(thread, Action::Skip),
    }
}

/// 근거 커밋을 reply로 남기고, reply가 성공했거나 이미 있을 때만 resolve → 👍 → minimize 순으로 진행한다.
async fn reply_with_evidence(
    engine: &HygieneEngine<'_>,
    pr: u64,
    thread: &ReviewThread,
    evidence: Option<&CommitFiles>,
) -> ThreadOutcome {
    let mut outcome = ThreadOutcome::new(thread, Action::Reply);
    let (Some(commit), Some(anchor)) = (evidence, thread.anchor()) else {
        return outcome;
    };

    // 이전 실행의 reply가 남아 있으면 다시 달지 않고 resolve부터 재시도한다.
    if !thread.has_hygiene_reply() {
        let body = engine
            .renderer
            .render_addressed_reply(commit, engine.policy.max_listed_files());
        outcome.replied = post_reply(engine, pr, thread, anchor, &body).await;
        if !outcome.replied {
            return outcome;
        }
    }

    outcome.resolved = settle(
        "resolve_thread",
        &thread.id,
        engine.gateway.resolve_thread(&thread.id).await,
    )
    .is_some();
    if !outcome.resolved {
        return outcome;
    }

    outcome.reacted = settle(
        "react",
        &anchor.id,
        engine.gateway.react(&anchor.id, Sentiment::Positive).await,
    )
    .is_some();
    if !outcome.reacted {
        return outcome;
    }

    outcome.minimized = minimize_all(engine, thread).await;
    outcome
}

/// outdated 스레드: 설명 reply(실패해도 계속, 이미 있으면 생략) → resolve → 👎 + minimize.
async fn resolve_outdated(
    engine: &HygieneEngine<'_>,
    pr: u64,
    thread: &ReviewThread,
    evidence: Option<&CommitFiles>,
) -> ThreadOutcome {
    let mut outcome = ThreadOutcome::new(thread, Action::Resolve);
    let anchor = thread.anchor();

    if let Some(anchor) = anchor.filter(|_| !thread.has_hygiene_reply()) {
        let body = engine
            .renderer
            .render_outdated_reply(evidence, engine.policy.max_listed_files());
        outcome.replied = post_reply(engine, pr, thread, anchor, &body).await;
    }

    outcome.resolved = settle(
        "resolve_thread",
        &thread.id,
        engine.gateway.resolve_thread(&thread.id).await,
    )
    .is_some();
    // resolve가 확인되지 않은 스레드는 숨기지 않는다.
    if !outcome.resolved {
        return outcome;
    }

    if let Some(anchor) = anchor {
        outcome.reacted = settle(
            "react",
            &anchor.id,
            engine.gateway.react(&anchor.id, Sentiment::Negative).await,
        )
        .is_some();
    }
    outcome.minimized = minimize_all(engine, thread).await;
    outcome
}

/// 가치 있는 피드백: 👍만 남긴다. resolve/reply/minimize는 하지 않는다.
async fn acknowledge_valuable(engine: &HygieneEngine<'_>, thread: &ReviewThread) -> ThreadOutcome {
    let mut outcome = ThreadOutcome::new(thread, Action::Valuable);
    if let Some(anchor) = thread.anchor() {
        outcome.reacted = settle(
            "react",
            &anchor.id,
            engine.gateway.react(&anchor.id, Sentiment::Positive).await,
        )
        .is_some();
    }
    outcome
}

/// 마커를 붙여 첫 코멘트에 reply한다.
async fn post_reply(
    engine: &HygieneEngine<'_>,
    pr: u64,
    thread: &ReviewThread,
    anchor: &ThreadComment,
    body: &str,
) -> bool {
    settle(
        "reply_to_thread",
        &thread.id,
        engine
            .gateway
            .reply_to_thread(pr, &anchor.reply_id, &mark_reply(body))
            .await,
    )
    .is_some()
}

async fn minimize_all(engine: &HygieneEngine<'_>, thread: &ReviewThread) -> usize {
    let results = join_all(thread.comments.iter().map(|comment| async move {
        settle(
            "minimize_comment",
            &comment.id,
            engine.gateway.minimize_comment(&comment.id).await,
        )
        .is_some()
    }))
    .await;

    results.into_iter().filter(|ok| *ok).count()
}

fn describe(outcome: &ThreadOutcome) -> String {
    format!(
        "{} replied={} resolved={} reacted={} minimized={}",
        outcome.thread_id, outcome.replied, outcome.resolved, outcome.reacted, outcome.minimized
    )
}
