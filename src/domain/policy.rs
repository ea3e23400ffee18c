//! 도메인 정책(스레드 분류, 트리거 코멘트 판별, 커밋 탐색 구간).

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use regex::{Regex, RegexBuilder};

use crate::domain::hygiene::{
    Action, Classification, CommitFiles, IssueComment, ReviewThread,
};

pub const DEFAULT_BOT_LOGINS: &[&str] = &[
    "github-actions[bot]",
    "dependabot[bot]",
    "renovate[bot]",
    "tidypilot[bot]",
    "claude[bot]",
    "copilot",
    "coderabbitai[bot]",
    "greptile-apps[bot]",
    "gemini-code-assist[bot]",
    "chatgpt-codex-connector[bot]",
];

pub const DEFAULT_AGENT_MENTIONS: &[&str] =
    &["claude", "codex", "copilot", "coderabbitai", "greptileai", "gemini"];

pub const DEFAULT_SLASH_COMMANDS: &[&str] =
    &["/review", "/describe", "/improve", "/ask", "/summary", "/gemini"];

pub const DEFAULT_VALUABLE_PATTERNS: &[&str] = &[
    r"security|vulnerab|injection|xss|csrf|secret",
    r"breaking|backward.?compat|compatib|deprecat",
    r"architect|design",
    r"performance|latency|memory leak|n\+1",
    r"\bP0\b|\bP1\b|critical|blocker",
];

pub const DEFAULT_MAX_LISTED_FILES: usize = 5;
pub const DEFAULT_FALLBACK_LOOKBACK_HOURS: i64 = 24;

/// 정책 구성 입력(설정에서 해석된 원시 값).
#[derive(Debug, Clone)]
pub struct PolicySpec {
    pub bot_logins: Vec<String>,
    pub agent_mentions: Vec<String>,
    pub slash_commands: Vec<String>,
    pub valuable_patterns: Vec<String>,
    pub max_listed_files: usize,
    pub fallback_lookback_hours: i64,
}

impl Default for PolicySpec {
    fn default() -> Self {
        Self {
            bot_logins: to_owned_list(DEFAULT_BOT_LOGINS),
            agent_mentions: to_owned_list(DEFAULT_AGENT_MENTIONS),
            slash_commands: to_owned_list(DEFAULT_SLASH_COMMANDS),
            valuable_patterns: to_owned_list(DEFAULT_VALUABLE_PATTERNS),
            max_listed_files: DEFAULT_MAX_LISTED_FILES,
            fallback_lookback_hours: DEFAULT_FALLBACK_LOOKBACK_HOURS,
        }
    }
}

/// 실행 시작 시 한 번 구성되어 주입되는 불변 정책 값.
#[derive(Debug, Clone)]
pub struct HygienePolicy {
    bot_logins: Vec<String>,
    agent_mention: Option<Regex>,
    slash_command: Option<Regex>,
    valuable: Vec<Regex>,
    max_listed_files: usize,
    fallback_lookback: Duration,
}

impl HygienePolicy {
    /// 패턴을 컴파일한다. 잘못된 정규식은 설정 오류로 취급한다.
    pub fn new(spec: PolicySpec) -> Result<Self> {
        let valuable = spec
            .valuable_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("invalid valuable pattern: {pattern}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let agent_mention = alternation(&spec.agent_mentions)
            .map(|alt| Regex::new(&format!(r"(?i)(?:^|[^\w@])@(?:{alt})\b")))
            .transpose()
            .context("invalid agent mention list")?;

        let slash_command = alternation(&spec.slash_commands)
            .map(|alt| Regex::new(&format!(r"(?im)^\s*(?:{alt})(?:\s|$)")))
            .transpose()
            .context("invalid slash command list")?;

        let fallback_lookback = Duration::try_hours(spec.fallback_lookback_hours.max(0))
            .with_context(|| {
                format!(
                    "fallback_lookback_hours out of range: {}",
                    spec.fallback_lookback_hours
                )
            })?;

        Ok(Self {
            bot_logins: spec
                .bot_logins
                .iter()
                .map(|login| login.trim().to_ascii_lowercase())
                .filter(|login| !login.is_empty())
                .collect(),
            agent_mention,
            slash_command,
            valuable,
            max_listed_files: spec.max_listed_files,
            fallback_lookback,
        })
    }

    pub fn max_listed_files(&self) -> usize {
        self.max_listed_files
    }

    /// 자동화 계정 여부(대소문자 무시).
    pub fn is_bot(&self, login: &str) -> bool {
        let login = login.trim().to_ascii_lowercase();
        self.bot_logins.iter().any(|bot| *bot == login)
    }

    /// `@agent` 멘션 또는 슬래시 명령 포함 여부.
    pub fn has_trigger(&self, body: &str) -> bool {
        self.agent_mention
            .as_ref()
            .is_some_and(|re| re.is_match(body))
            || self
                .slash_command
                .as_ref()
                .is_some_and(|re| re.is_match(body))
    }

    pub fn is_valuable(&self, text: &str) -> bool {
        self.valuable.iter().any(|re| re.is_match(text))
    }

    /// 스레드 1개를 분류한다. 검사 순서 자체가 우선순위다.
    pub fn classify<'a>(
        &self,
        thread: &ReviewThread,
        commits: &'a [CommitFiles],
    ) -> Classification<'a> {
        let evidence = matching_commit(thread, commits);

        let action = if thread.is_resolved {
            Action::Skip
        } else if thread.is_outdated {
            Action::Resolve
        } else if self.is_valuable(&thread.reviewer_text()) {
            Action::Valuable
        } else if evidence.is_some() {
            Action::Reply
        } else {
            Action::Skip
        };

        let evidence = match action {
            Action::Resolve | Action::Reply => evidence,
            Action::Valuable | Action::Skip => None,
        };

        Classification { action, evidence }
    }

    /// maintainer가 남긴 자동화 트리거 코멘트인지 판별한다.
    pub fn is_prompt_comment(&self, comment: &IssueComment, owner_logins: &[String]) -> bool {
        let is_owner = owner_logins
            .iter()
            .any(|owner| owner.trim().eq_ignore_ascii_case(comment.author.trim()));

        is_owner && !self.is_bot(&comment.author) && self.has_trigger(&comment.body)
    }

    /// 미해결 스레드 코멘트 중 가장 오래된 시각. 없으면 `now - lookback`.
    pub fn commit_cutoff(&self, threads: &[ReviewThread], now: DateTime<Utc>) -> DateTime<Utc> {
        threads
            .iter()
            .filter(|t| !t.is_resolved)
            .flat_map(|t| t.comments.iter().map(|c| c.created_at))
            .min()
            .unwrap_or_else(|| {
                now.checked_sub_signed(self.fallback_lookback)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC)
            })
    }
}

/// 스레드 경로를 변경한 첫 커밋.
pub fn matching_commit<'a>(
    thread: &ReviewThread,
    commits: &'a [CommitFiles],
) -> Option<&'a CommitFiles> {
    let path = thread.path.as_deref()?;
    commits.iter().find(|c| c.touches(path))
}

fn alternation(items: &[String]) -> Option<String> {
    let escaped: Vec<String> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| regex::escape(item.trim_start_matches('@')))
        .collect();

    if escaped.is_empty() {
        None
    } else {
        Some(escaped.join("|"))
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::hygiene::{ThreadComment, mark_reply};

    fn policy() -> HygienePolicy {
        HygienePolicy::new(PolicySpec::default()).expect("default policy compiles")
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    fn thread(path: Option<&str>, body: &str) -> ReviewThread {
        ReviewThread {
            id: "T1".to_string(),
            is_resolved: false,
            is_outdated: false,
            path: path.map(ToString::to_string),
            comments: vec![ThreadComment {
                id: "C1".to_string(),
                reply_id: "101".to_string(),
                author: "reviewer".to_string(),
                body: body.to_string(),
                created_at: at(10),
            }],
        }
    }

    fn commits() -> Vec<CommitFiles> {
        vec![CommitFiles {
            sha: "abc1234".to_string(),
            files: vec!["src/a.ts".to_string()],
        }]
    }

    fn comment(author: &str, body: &str) -> IssueComment {
        IssueComment {
            id: "1".to_string(),
            author: author.to_string(),
            body: body.to_string(),
            created_at: at(9),
        }
    }

    #[test]
    fn resolved_thread_is_skipped_even_when_outdated() {
        let mut t = thread(Some("src/a.ts"), "security hole");
        t.is_resolved = true;
        t.is_outdated = true;
        let commits = commits();
        let result = policy().classify(&t, &commits);
        assert_eq!(result.action, Action::Skip);
        assert!(result.evidence.is_none());
    }

    #[test]
    fn outdated_wins_over_valuable_content() {
        let mut t = thread(Some("src/a.ts"), "This introduces a security vulnerability");
        t.is_outdated = true;
        let commits = commits();
        let result = policy().classify(&t, &commits);
        assert_eq!(result.action, Action::Resolve);
        assert_eq!(result.evidence.map(|c| c.sha.as_str()), Some("abc1234"));
    }

    #[test]
    fn outdated_without_matching_commit_has_no_evidence() {
        let mut t = thread(Some("other.ts"), "nit");
        t.is_outdated = true;
        let commits = commits();
        let result = policy().classify(&t, &commits);
        assert_eq!(result.action, Action::Resolve);
        assert!(result.evidence.is_none());
    }

    #[test]
    fn valuable_wins_over_path_match() {
        let t = thread(Some("src/a.ts"), "This is a breaking change for callers");
        let commits = commits();
        let result = policy().classify(&t, &commits);
        assert_eq!(result.action, Action::Valuable);
        assert!(result.evidence.is_none());
    }

    #[test]
    fn valuable_detects_severity_markers_in_replies() {
        let mut t = thread(Some("src/a.ts"), "rename this");
        t.comments.push(ThreadComment {
            id: "C2".to_string(),
            reply_id: "102".to_string(),
            author: "lead".to_string(),
            body: "Marking as p1".to_string(),
            created_at: at(11),
        });
        assert_eq!(policy().classify(&t, &commits()).action, Action::Valuable);
    }

    #[test]
    fn path_match_yields_reply() {
        let t = thread(Some("src/a.ts"), "please rename this variable");
        let commits = commits();
        let result = policy().classify(&t, &commits);
        assert_eq!(result.action, Action::Reply);
        assert_eq!(result.evidence.map(|c| c.sha.as_str()), Some("abc1234"));
    }

    #[test]
    fn no_evidence_is_skip() {
        assert_eq!(
            policy()
                .classify(&thread(Some("src/b.ts"), "rename"), &commits())
                .action,
            Action::Skip
        );
        assert_eq!(
            policy().classify(&thread(None, "rename"), &commits()).action,
            Action::Skip
        );
    }

    #[test]
    fn prompt_comment_requires_owner_trigger_and_non_bot() {
        let owners = vec!["Maintainer".to_string(), "claude[bot]".to_string()];
        let p = policy();

        assert!(p.is_prompt_comment(&comment("maintainer", "@claude please review"), &owners));
        assert!(!p.is_prompt_comment(&comment("claude[bot]", "@claude please review"), &owners));
        assert!(!p.is_prompt_comment(&comment("stranger", "@claude please review"), &owners));
        assert!(!p.is_prompt_comment(&comment("maintainer", "thanks, looks good"), &owners));
    }

    #[test]
    fn trigger_tokens_match_mentions_and_slash_commands() {
        let p = policy();
        assert!(p.has_trigger("@Codex fix the tests"));
        assert!(p.has_trigger("LGTM\n  /review"));
        assert!(p.has_trigger("/describe"));
        assert!(!p.has_trigger("mail me at dev@claude.example"));
        assert!(!p.has_trigger("see /reviewers list"));
        assert!(!p.has_trigger("@claudette hi"));
    }

    #[test]
    fn bot_check_is_case_insensitive() {
        assert!(policy().is_bot("GitHub-Actions[bot]"));
        assert!(!policy().is_bot("octocat"));
    }

    #[test]
    fn own_reply_listing_sensitive_paths_does_not_make_thread_valuable() {
        let mut t = thread(Some("src/a.ts"), "please rename this variable");
        t.comments.push(ThreadComment {
            id: "C2".to_string(),
            reply_id: "102".to_string(),
            author: "tidypilot[bot]".to_string(),
            body: mark_reply("Changed files: `src/security/auth.rs`, `docs/design.md`"),
            created_at: at(11),
        });
        let commits = commits();
        assert_eq!(policy().classify(&t, &commits).action, Action::Reply);
    }

    #[test]
    fn huge_lookback_is_a_config_error() {
        let spec = PolicySpec {
            fallback_lookback_hours: i64::MAX,
            ..PolicySpec::default()
        };
        let err = HygienePolicy::new(spec).unwrap_err();
        assert!(format!("{err:#}").contains("fallback_lookback_hours"));
    }

    #[test]
    fn invalid_valuable_pattern_is_rejected() {
        let spec = PolicySpec {
            valuable_patterns: vec!["(unclosed".to_string()],
            ..PolicySpec::default()
        };
        assert!(HygienePolicy::new(spec).is_err());
    }

    #[test]
    fn cutoff_is_oldest_unresolved_comment_or_fallback() {
        let p = policy();
        let mut older = thread(Some("a"), "x");
        older.comments[0].created_at = at(3);
        let mut resolved = thread(Some("b"), "y");
        resolved.is_resolved = true;
        resolved.comments[0].created_at = at(1);
        let newer = thread(Some("c"), "z");

        let now = at(20);
        assert_eq!(p.commit_cutoff(&[older, resolved.clone(), newer], now), at(3));
        assert_eq!(p.commit_cutoff(&[resolved], now), now - Duration::hours(24));
        assert_eq!(p.commit_cutoff(&[], now), now - Duration::hours(24));
    }
}
