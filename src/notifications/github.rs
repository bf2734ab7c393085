//! GitHub pull request comments

use anyhow::Result;
use serde_json::json;
use std::env;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Where and as whom to post
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub token: Option<String>,
    pub repository: Option<String>,
    pub api_url: String,
}

impl GithubConfig {
    /// Read `GITHUB_TOKEN`, `GITHUB_REPOSITORY` and `GITHUB_API_URL` (set by GitHub Actions)
    pub fn from_env() -> Self {
        Self {
            token: env::var("GITHUB_TOKEN").ok(),
            repository: env::var("GITHUB_REPOSITORY").ok(),
            api_url: env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        }
    }
}

pub fn comments_url(api_url: &str, repository: &str, pr_number: u64) -> String {
    format!(
        "{}/repos/{}/issues/{}/comments",
        api_url.trim_end_matches('/'),
        repository,
        pr_number
    )
}

/// Post a markdown comment on a pull request
pub async fn post_pr_comment(config: &GithubConfig, pr_number: u64, body: &str) -> Result<()> {
    let token = config
        .token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("GitHub token not found"))?;

    let repo = config
        .repository
        .clone()
        .ok_or_else(|| anyhow::anyhow!("GITHUB_REPOSITORY not set"))?;

    let url = comments_url(&config.api_url, &repo, pr_number);
    let payload = json!({ "body": body });

    tracing::debug!(%url, "posting coverage comment");

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .header("Authorization", format!("token {}", token))
        .header("User-Agent", "kover-gate")
        .header("Accept", "application/vnd.github.v3+json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        anyhow::bail!("GitHub comment failed: {} - {}", status, text);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_url() {
        assert_eq!(
            comments_url("https://api.github.com/", "acme/app", 42),
            "https://api.github.com/repos/acme/app/issues/42/comments"
        );
    }

    #[tokio::test]
    async fn test_post_requires_token() {
        let config = GithubConfig {
            token: None,
            repository: Some("acme/app".to_string()),
            api_url: DEFAULT_API_URL.to_string(),
        };

        let err = post_pr_comment(&config, 1, "body").await.unwrap_err();
        assert!(err.to_string().contains("token"));
    }
}
