//! GitHub REST/GraphQL 연동 구현.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::application::ports::HygieneGateway;
use crate::domain::hygiene::{
    CommitFiles, IssueComment, ReviewThread, Sentiment, ThreadComment,
};
use crate::infrastructure::render;

const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 50;
const GHOST_LOGIN: &str = "ghost";

const REVIEW_THREADS_QUERY: &str = r"
query ReviewThreads($owner: String!, $repo: String!, $number: Int!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      reviewThreads(first: 100, after: $cursor) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          isResolved
          isOutdated
          path
          comments(first: 100) {
            nodes { id databaseId body createdAt author { login } }
          }
        }
      }
    }
  }
}";

const RESOLVE_THREAD_MUTATION: &str = r"
mutation ResolveThread($id: ID!) {
  resolveReviewThread(input: { threadId: $id }) { thread { isResolved } }
}";

const MINIMIZE_COMMENT_MUTATION: &str = r"
mutation MinimizeComment($id: ID!) {
  minimizeComment(input: { subjectId: $id, classifier: RESOLVED }) { minimizedComment { isMinimized } }
}";

const ADD_REACTION_MUTATION: &str = r"
mutation AddReaction($id: ID!, $content: ReactionContent!) {
  addReaction(input: { subjectId: $id, content: $content }) { reaction { content } }
}";

pub struct GitHubClient {
    client: Client,
    host: String,
    owner: String,
    repo: String,
    token: Option<String>,
    api_base: Option<String>,
}

impl GitHubClient {
    /// owner/repo 한 쌍에 묶인 클라이언트를 생성한다.
    pub fn new(
        host: String,
        owner: String,
        repo: String,
        token: Option<String>,
        api_base: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            host,
            owner,
            repo,
            token,
            api_base,
        }
    }

    fn api_base(&self) -> String {
        // github.com은 공개 API, 그 외는 Enterprise 기본 경로를 사용한다.
        if let Some(base) = &self.api_base {
            return base.trim_end_matches('/').to_string();
        }
        if self.host == "github.com" {
            "https://api.github.com".to_string()
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }

    fn graphql_endpoint(&self) -> String {
        // Enterprise GraphQL은 /api/v3 아래가 아니라 /api/graphql에 있다.
        if self.api_base.is_none() && self.host != "github.com" {
            return format!("https://{}/api/graphql", self.host);
        }
        format!("{}/graphql", self.api_base())
    }

    fn repo_endpoint(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base(),
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        // 공통 헤더/인증 적용.
        let req = self
            .client
            .request(method, url)
            .header("User-Agent", "tidypilot")
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        if let Some(token) = &self.token {
            req.bearer_auth(token)
        } else {
            req
        }
    }

    async fn send_raw(&self, req: RequestBuilder, what: &str) -> Result<(StatusCode, String)> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("github: failed to {what}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("github: failed to read {what} body"))?;

        if !status.is_success() {
            bail!("github: failed to {what} ({status}): {body}");
        }
        Ok((status, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
        let (_, body) = self.send_raw(req, what).await?;
        serde_json::from_str(&body).with_context(|| format!("github: invalid {what} JSON"))
    }

    /// `per_page`/`page` 기반 REST 목록 조회.
    async fn get_paginated<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for page in 1..=MAX_PAGES {
            let url = format!(
                "{}?per_page={PER_PAGE}&page={page}",
                self.repo_endpoint(path)
            );
            tracing::debug!(%url, "github: GET page");
            let items: Vec<T> = self.send_json(self.request(Method::GET, url), what).await?;
            let last = items.len() < PER_PAGE;
            out.extend(items);
            if last {
                break;
            }
        }
        Ok(out)
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value, what: &str) -> Result<T> {
        tracing::debug!(what, "github: graphql");
        let req = self
            .request(Method::POST, self.graphql_endpoint())
            .json(&json!({ "query": query, "variables": variables }));
        let envelope: GraphQlResponse<T> = self.send_json(req, what).await?;

        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            bail!("github: {what} returned errors: {}", messages.join("; "));
        }
        envelope
            .data
            .with_context(|| format!("github: {what} returned no data"))
    }

    async fn fetch_files_for(&self, sha: String) -> Result<CommitFiles> {
        let url = self.repo_endpoint(&format!("commits/{sha}"));
        let detail: CommitDetailResponse = self
            .send_json(self.request(Method::GET, url), "fetch commit detail")
            .await?;
        Ok(CommitFiles {
            sha,
            files: detail
                .files
                .unwrap_or_default()
                .into_iter()
                .map(|f| f.filename)
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ThreadsData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    pull_request: Option<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    review_threads: ThreadConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadConnection {
    page_info: PageInfo,
    nodes: Vec<ThreadNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadNode {
    id: String,
    is_resolved: bool,
    is_outdated: bool,
    path: Option<String>,
    comments: CommentConnection,
}

#[derive(Debug, Deserialize)]
struct CommentConnection {
    nodes: Vec<CommentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    id: String,
    database_id: Option<u64>,
    body: String,
    created_at: DateTime<Utc>,
    author: Option<LoginNode>,
}

#[derive(Debug, Deserialize)]
struct LoginNode {
    login: String,
}

#[derive(Debug, Deserialize)]
struct IssueCommentResponse {
    id: u64,
    #[serde(default)]
    body: String,
    user: Option<LoginNode>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PullCommitResponse {
    sha: String,
    commit: GitCommit,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    author: Option<GitSignature>,
}

#[derive(Debug, Deserialize)]
struct GitSignature {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommitDetailResponse {
    files: Option<Vec<CommitFileResponse>>,
}

#[derive(Debug, Deserialize)]
struct CommitFileResponse {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: u64,
}

impl From<ThreadNode> for ReviewThread {
    fn from(node: ThreadNode) -> Self {
        ReviewThread {
            id: node.id,
            is_resolved: node.is_resolved,
            is_outdated: node.is_outdated,
            path: node.path,
            comments: node
                .comments
                .nodes
                .into_iter()
                .map(|c| ThreadComment {
                    reply_id: c.database_id.map(|id| id.to_string()).unwrap_or_default(),
                    id: c.id,
                    author: login_or_ghost(c.author),
                    body: c.body,
                    created_at: c.created_at,
                })
                .collect(),
        }
    }
}

fn login_or_ghost(author: Option<LoginNode>) -> String {
    author
        .map(|a| a.login)
        .unwrap_or_else(|| GHOST_LOGIN.to_string())
}

fn reaction_content(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "THUMBS_UP",
        Sentiment::Negative => "THUMBS_DOWN",
    }
}

#[async_trait]
impl HygieneGateway for GitHubClient {
    async fn fetch_threads(&self, pr_number: u64) -> Result<Vec<ReviewThread>> {
        let mut threads = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let data: ThreadsData = self
                .graphql(
                    REVIEW_THREADS_QUERY,
                    json!({
                        "owner": self.owner,
                        "repo": self.repo,
                        "number": pr_number,
                        "cursor": cursor,
                    }),
                    "fetch review threads",
                )
                .await?;

            let connection = data
                .repository
                .and_then(|r| r.pull_request)
                .map(|pr| pr.review_threads)
                .with_context(|| format!("github: pull request #{pr_number} not found"))?;

            threads.extend(connection.nodes.into_iter().map(ReviewThread::from));

            match (connection.page_info.has_next_page, connection.page_info.end_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(threads)
    }

    async fn fetch_comments(&self, pr_number: u64) -> Result<Vec<IssueComment>> {
        let comments: Vec<IssueCommentResponse> = self
            .get_paginated(&format!("issues/{pr_number}/comments"), "list comments")
            .await?;

        Ok(comments
            .into_iter()
            .map(|c| IssueComment {
                id: c.id.to_string(),
                author: login_or_ghost(c.user),
                body: c.body,
                created_at: c.created_at,
            })
            .collect())
    }

    async fn fetch_commit_files(
        &self,
        pr_number: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitFiles>> {
        let commits: Vec<PullCommitResponse> = self
            .get_paginated(&format!("pulls/{pr_number}/commits"), "list PR commits")
            .await?;

        let recent: Vec<String> = commits
            .into_iter()
            .filter(|c| {
                c.commit
                    .author
                    .as_ref()
                    .and_then(|a| a.date)
                    .is_some_and(|date| date > since)
            })
            .map(|c| c.sha)
            .collect();

        let lookups = join_all(recent.into_iter().map(|sha| self.fetch_files_for(sha))).await;

        // 개별 커밋 조회 실패는 해당 커밋만 제외한다.
        let mut out = Vec::new();
        for lookup in lookups {
            match lookup {
                Ok(commit) => out.push(commit),
                Err(err) => tracing::warn!(error = %format!("{err:#}"), "github: commit files skipped"),
            }
        }
        Ok(out)
    }

    async fn resolve_thread(&self, thread_id: &str) -> Result<()> {
        let _: Value = self
            .graphql(RESOLVE_THREAD_MUTATION, json!({ "id": thread_id }), "resolve thread")
            .await?;
        Ok(())
    }

    async fn reply_to_thread(
        &self,
        pr_number: u64,
        anchor_comment_id: &str,
        body: &str,
    ) -> Result<String> {
        if anchor_comment_id.is_empty() {
            bail!("github: thread anchor comment has no REST id");
        }
        let url = self.repo_endpoint(&format!(
            "pulls/{pr_number}/comments/{anchor_comment_id}/replies"
        ));
        let created: CreatedResponse = self
            .send_json(
                self.request(Method::POST, url).json(&json!({ "body": body })),
                "reply to thread",
            )
            .await?;
        Ok(created.id.to_string())
    }

    async fn minimize_comment(&self, comment_id: &str) -> Result<()> {
        let _: Value = self
            .graphql(
                MINIMIZE_COMMENT_MUTATION,
                json!({ "id": comment_id }),
                "minimize comment",
            )
            .await?;
        Ok(())
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let url = self.repo_endpoint(&format!("issues/comments/{comment_id}"));
        self.send_raw(self.request(Method::DELETE, url), "delete comment")
            .await?;
        Ok(())
    }

    async fn react(&self, comment_id: &str, sentiment: Sentiment) -> Result<()> {
        let _: Value = self
            .graphql(
                ADD_REACTION_MUTATION,
                json!({ "id": comment_id, "content": reaction_content(sentiment) }),
                "add reaction",
            )
            .await?;
        Ok(())
    }

    async fn upsert_section(
        &self,
        pr_number: u64,
        marker: &str,
        section_id: &str,
        body: &str,
    ) -> Result<()> {
        let comments: Vec<IssueCommentResponse> = self
            .get_paginated(&format!("issues/{pr_number}/comments"), "list comments")
            .await?;

        if let Some(existing) = comments.iter().find(|c| c.body.contains(marker)) {
            let merged = render::merge_section(&existing.body, section_id, body);
            if merged == existing.body {
                return Ok(());
            }
            let url = self.repo_endpoint(&format!("issues/comments/{}", existing.id));
            self.send_raw(
                self.request(Method::PATCH, url).json(&json!({ "body": merged })),
                "update status comment",
            )
            .await?;
        } else {
            let url = self.repo_endpoint(&format!("issues/{pr_number}/comments"));
            let created = render::render_new_status_comment(marker, section_id, body);
            self.send_raw(
                self.request(Method::POST, url).json(&json!({ "body": created })),
                "create status comment",
            )
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_defaults_by_host_and_honors_override() {
        let public = GitHubClient::new("github.com".into(), "o".into(), "r".into(), None, None);
        assert_eq!(public.api_base(), "https://api.github.com");
        assert_eq!(
            public.repo_endpoint("issues/1/comments"),
            "https://api.github.com/repos/o/r/issues/1/comments"
        );

        let enterprise =
            GitHubClient::new("ghe.corp".into(), "o".into(), "r".into(), None, None);
        assert_eq!(enterprise.graphql_endpoint(), "https://ghe.corp/api/graphql");
        assert_eq!(
            enterprise.repo_endpoint("pulls/1/commits"),
            "https://ghe.corp/api/v3/repos/o/r/pulls/1/commits"
        );

        let proxied = GitHubClient::new(
            "github.com".into(),
            "o".into(),
            "r".into(),
            None,
            Some("http://localhost:8080/".into()),
        );
        assert_eq!(proxied.api_base(), "http://localhost:8080");
    }

    #[test]
    fn thread_node_maps_ids_and_ghost_authors() {
        let raw = r#"{
            "id": "PRRT_1",
            "isResolved": false,
            "isOutdated": true,
            "path": "src/a.ts",
            "comments": { "nodes": [
                { "id": "PRRC_1", "databaseId": 555, "body": "hi",
                  "createdAt": "2026-01-02T03:04:05Z", "author": null }
            ] }
        }"#;
        let node: ThreadNode = serde_json::from_str(raw).unwrap();
        let thread = ReviewThread::from(node);

        assert!(thread.is_outdated);
        assert_eq!(thread.path.as_deref(), Some("src/a.ts"));
        let anchor = thread.anchor().unwrap();
        assert_eq!(anchor.id, "PRRC_1");
        assert_eq!(anchor.reply_id, "555");
        assert_eq!(anchor.author, GHOST_LOGIN);
    }

    #[test]
    fn graphql_errors_are_deserialized() {
        let raw = r#"{ "data": null, "errors": [ { "message": "Resource not accessible" } ] }"#;
        let envelope: GraphQlResponse<Value> = serde_json::from_str(raw).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.errors.unwrap()[0].message, "Resource not accessible");
    }

    #[test]
    fn reactions_map_to_thumbs() {
        assert_eq!(reaction_content(Sentiment::Positive), "THUMBS_UP");
        assert_eq!(reaction_content(Sentiment::Negative), "THUMBS_DOWN");
    }
}
