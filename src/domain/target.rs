//! 입력 URL을 GitHub PR 대상으로 해석하는 모듈.

use anyhow::{Result, bail};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestTarget {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub url: String,
}

impl PullRequestTarget {
    /// `https://<host>/<owner>/<repo>/pull/<number>` 형태만 허용한다.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim())?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("URL host is missing"))?
            .to_string();

        let segments: Vec<String> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).map(ToString::to_string).collect())
            .unwrap_or_default();

        // /owner/repo/pull/<number>[/files|/commits...]
        if segments.len() < 4 || segments[2] != "pull" {
            bail!("unsupported URL format: {input}");
        }

        let Ok(number) = segments[3].parse() else {
            bail!("invalid pull request number in URL: {input}");
        };

        Ok(Self {
            host,
            owner: segments[0].clone(),
            repo: segments[1].clone(),
            number,
            url: input.trim().to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn slug(&self) -> String {
        format!("{}/{}#{}", self.owner, self.repo, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_github_pull_url() {
        let target = PullRequestTarget::parse("https://github.com/acme/widgets/pull/42").unwrap();
        assert_eq!(target.host(), "github.com");
        assert_eq!(target.owner, "acme");
        assert_eq!(target.repo, "widgets");
        assert_eq!(target.number, 42);
        assert_eq!(target.slug(), "acme/widgets#42");
    }

    #[test]
    fn accepts_trailing_tab_segments() {
        let target =
            PullRequestTarget::parse("https://ghe.example.com/org/app/pull/7/files").unwrap();
        assert_eq!(target.host(), "ghe.example.com");
        assert_eq!(target.number, 7);
    }

    #[test]
    fn rejects_non_pull_urls() {
        assert!(PullRequestTarget::parse("https://github.com/acme/widgets/issues/42").is_err());
        assert!(PullRequestTarget::parse("https://github.com/acme/widgets/pull/abc").is_err());
        assert!(PullRequestTarget::parse("not a url").is_err());
    }
}
