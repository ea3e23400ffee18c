//! 마크다운 렌더링 포트 구현 어댑터.

use crate::application::ports::MarkdownRenderer;
use crate::domain::hygiene::{CommitFiles, RunResult};
use crate::infrastructure::render;

/// 마크다운 렌더링 어댑터.
pub struct MarkdownRendererAdapter;

impl MarkdownRenderer for MarkdownRendererAdapter {
    fn render_addressed_reply(&self, commit: &CommitFiles, max_files: usize) -> String {
        render::render_addressed_reply(commit, max_files)
    }

    fn render_outdated_reply(&self, commit: Option<&CommitFiles>, max_files: usize) -> String {
        render::render_outdated_reply(commit, max_files)
    }

    fn render_summary(&self, result: &RunResult) -> String {
        render::render_summary_table(result)
    }
}
