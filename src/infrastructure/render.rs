//! 스레드 reply / 상태 섹션용 Markdown 렌더링 모듈.

use crate::domain::hygiene::{CommitFiles, RunResult};

/// 경로가 변경된 커밋을 근거로 "반영됨" reply 본문을 생성한다.
pub fn render_addressed_reply(commit: &CommitFiles, max_files: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "✅ This looks addressed in `{}`.\n\n",
        commit.short_sha()
    ));
    out.push_str(&format!("Changed files: {}\n", file_list(commit, max_files)));
    out.push_str("\n_Resolved automatically; reopen the thread if the feedback still applies._\n");
    out
}

/// outdated 스레드 설명 reply. 매칭 커밋이 있으면 함께 인용한다.
pub fn render_outdated_reply(commit: Option<&CommitFiles>, max_files: usize) -> String {
    let mut out = String::new();
    match commit {
        Some(commit) => {
            out.push_str(&format!(
                "♻️ The code this thread was anchored to changed in `{}`.\n\n",
                commit.short_sha()
            ));
            out.push_str(&format!("Changed files: {}\n", file_list(commit, max_files)));
        }
        None => {
            out.push_str("♻️ This thread is outdated: the code it was anchored to no longer exists.\n");
        }
    }
    out.push_str("\n_Resolved automatically; reopen the thread if the feedback still applies._\n");
    out
}

/// 실행 집계를 고정 형태의 표로 렌더링한다.
pub fn render_summary_table(result: &RunResult) -> String {
    let mut out = String::new();
    out.push_str("### Review Thread Hygiene\n\n");
    out.push_str("| Action | Count |\n");
    out.push_str("|---|---:|\n");
    out.push_str(&format!("| Threads resolved | {} |\n", result.resolved));
    out.push_str(&format!("| Evidence replies | {} |\n", result.replied));
    out.push_str(&format!("| Comments minimized | {} |\n", result.minimized));
    out.push_str(&format!("| Prompt comments deleted | {} |\n", result.deleted));
    out
}

pub fn section_start(section_id: &str) -> String {
    format!("<!-- {section_id}:start -->")
}

pub fn section_end(section_id: &str) -> String {
    format!("<!-- {section_id}:end -->")
}

/// 새 상태 코멘트 본문(마커 + 섹션 블록).
pub fn render_new_status_comment(marker: &str, section_id: &str, body: &str) -> String {
    format!("{marker}\n\n{}", section_block(section_id, body))
}

/// 기존 코멘트에서 섹션 블록만 교체하고, 없으면 끝에 덧붙인다.
pub fn merge_section(existing: &str, section_id: &str, body: &str) -> String {
    let start = section_start(section_id);
    let end = section_end(section_id);
    let block = section_block(section_id, body);

    if let Some(begin) = existing.find(&start)
        && let Some(rel_end) = existing[begin..].find(&end)
    {
        let stop = begin + rel_end + end.len();
        let mut out = String::with_capacity(existing.len() + block.len());
        out.push_str(&existing[..begin]);
        out.push_str(&block);
        out.push_str(&existing[stop..]);
        return out;
    }

    let mut out = existing.trim_end().to_string();
    out.push_str("\n\n");
    out.push_str(&block);
    out
}

fn section_block(section_id: &str, body: &str) -> String {
    format!(
        "{}\n{}\n{}",
        section_start(section_id),
        body.trim(),
        section_end(section_id)
    )
}

fn file_list(commit: &CommitFiles, max_files: usize) -> String {
    if commit.files.is_empty() {
        return "_none reported_".to_string();
    }

    let shown: Vec<String> = commit
        .files
        .iter()
        .take(max_files)
        .map(|f| format!("`{f}`"))
        .collect();
    let hidden = commit.files.len().saturating_sub(shown.len());

    if hidden > 0 {
        format!("{} (+{hidden} more)", shown.join(", "))
    } else {
        shown.join(", ")
    }
}
