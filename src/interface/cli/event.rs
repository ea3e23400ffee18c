//! GitHub webhook payload에서 PR URL을 꺼낸다.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// 이벤트 파일을 읽어 PR URL을 반환한다.
pub fn pr_url_from_event_file(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read event payload: {}", path.display()))?;
    let payload: Value = serde_json::from_str(&raw)
        .with_context(|| format!("invalid event payload JSON: {}", path.display()))?;

    pr_url_from_payload(&payload)
        .with_context(|| format!("event payload has no pull request URL: {}", path.display()))
}

/// `pull_request.html_url` 우선, 없으면 issue_comment 이벤트의 `issue.pull_request.html_url`.
pub fn pr_url_from_payload(payload: &Value) -> Option<String> {
    ["/pull_request/html_url", "/issue/pull_request/html_url"]
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
}
