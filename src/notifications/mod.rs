//! Notifications module
//!
//! Provides:
//! - GitHub pull request comments

mod github;

pub use github::*;

use crate::annotate::RecordingSink;

/// Post everything collected in `sink` as a single PR comment
pub async fn send_review_comment(
    config: &GithubConfig,
    pr_number: u64,
    sink: &RecordingSink,
) -> anyhow::Result<()> {
    post_pr_comment(config, pr_number, &sink.to_comment()).await
}
