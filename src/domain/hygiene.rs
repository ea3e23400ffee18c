//! 리뷰 스레드 정리(hygiene) 도메인 엔티티/값 객체.

use std::fmt;

use chrono::{DateTime, Utc};

/// 이 도구가 남긴 스레드 reply를 식별하는 숨김 마커.
pub const REPLY_MARKER: &str = "<!-- tidypilot:thread-reply -->";

/// reply 본문 앞에 마커를 붙인다.
pub fn mark_reply(body: &str) -> String {
    format!("{REPLY_MARKER}\n\n{body}")
}

/// 1회 실행 입력.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub url: String,
    pub owner_logins: Vec<String>,
    pub dry_run: bool,
}

/// 리뷰 스레드 내 개별 코멘트(생성 후 불변).
#[derive(Debug, Clone)]
pub struct ThreadComment {
    /// GraphQL node id (reaction/minimize 대상)
    pub id: String,
    /// REST reply 대상 id
    pub reply_id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl ThreadComment {
    pub fn is_hygiene_reply(&self) -> bool {
        self.body.contains(REPLY_MARKER)
    }
}

/// 파일/라인에 고정된 리뷰 스레드 스냅샷.
#[derive(Debug, Clone)]
pub struct ReviewThread {
    pub id: String,
    pub is_resolved: bool,
    pub is_outdated: bool,
    pub path: Option<String>,
    pub comments: Vec<ThreadComment>,
}

impl ReviewThread {
    /// reply/reaction의 기준이 되는 첫 코멘트.
    pub fn anchor(&self) -> Option<&ThreadComment> {
        self.comments.first()
    }

    /// 이전 실행에서 이미 reply를 남겼는지 여부.
    pub fn has_hygiene_reply(&self) -> bool {
        self.comments.iter().any(ThreadComment::is_hygiene_reply)
    }

    /// 리뷰어 코멘트 본문을 이어 붙인 텍스트. 이 도구의 reply는 제외한다.
    pub fn reviewer_text(&self) -> String {
        self.comments
            .iter()
            .filter(|c| !c.is_hygiene_reply())
            .map(|c| c.body.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// PR 대화(issue-level) 코멘트.
#[derive(Debug, Clone)]
pub struct IssueComment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// 커밋 하나가 변경한 파일 목록.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFiles {
    pub sha: String,
    pub files: Vec<String>,
}

impl CommitFiles {
    pub fn touches(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(7)
            .map(|(idx, _)| idx)
            .unwrap_or(self.sha.len());
        &self.sha[..end]
    }
}

/// 스레드별 처리 동작.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Resolve,
    Reply,
    Valuable,
    Skip,
}

impl Action {
    pub fn code(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Reply => "reply",
            Self::Valuable => "valuable",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 분류 결과. 실행 1회 안에서만 존재한다.
#[derive(Debug, Clone, Copy)]
pub struct Classification<'a> {
    pub action: Action,
    pub evidence: Option<&'a CommitFiles>,
}

/// reaction 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
}

/// 실행 집계 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    pub resolved: usize,
    pub replied: usize,
    pub minimized: usize,
    pub deleted: usize,
}

impl RunResult {
    pub fn is_empty(&self) -> bool {
        self.resolved == 0 && self.replied == 0 && self.minimized == 0 && self.deleted == 0
    }

    pub fn merge(self, other: RunResult) -> RunResult {
        RunResult {
            resolved: self.resolved + other.resolved,
            replied: self.replied + other.replied,
            minimized: self.minimized + other.minimized,
            deleted: self.deleted + other.deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread_comment(id: &str, body: &str) -> ThreadComment {
        ThreadComment {
            id: id.to_string(),
            reply_id: id.to_string(),
            author: "someone".to_string(),
            body: body.to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn hygiene_replies_are_detected_and_left_out_of_reviewer_text() {
        let mut thread = ReviewThread {
            id: "T".to_string(),
            is_resolved: false,
            is_outdated: false,
            path: Some("src/a.rs".to_string()),
            comments: vec![thread_comment("1", "rename this")],
        };
        assert!(!thread.has_hygiene_reply());

        thread
            .comments
            .push(thread_comment("2", &mark_reply("Changed files: `src/security/auth.rs`")));
        assert!(thread.has_hygiene_reply());
        assert_eq!(thread.reviewer_text(), "rename this");
    }

    #[test]
    fn short_sha_truncates_to_seven_chars() {
        let commit = CommitFiles {
            sha: "deadbeefcafe".to_string(),
            files: vec![],
        };
        assert_eq!(commit.short_sha(), "deadbee");

        let short = CommitFiles {
            sha: "abc".to_string(),
            files: vec![],
        };
        assert_eq!(short.short_sha(), "abc");
    }

    #[test]
    fn run_result_merge_and_empty() {
        let a = RunResult {
            resolved: 1,
            replied: 1,
            minimized: 2,
            deleted: 0,
        };
        let b = RunResult {
            deleted: 3,
            ..RunResult::default()
        };
        let merged = a.merge(b);
        assert_eq!(merged.deleted, 3);
        assert_eq!(merged.minimized, 2);
        assert!(!merged.is_empty());
        assert!(RunResult::default().is_empty());
    }
}
