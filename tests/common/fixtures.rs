//! Orchestrator and record store fixtures

use rmd_orchestrator::db::NewPost;
use rmd_orchestrator::{Config, Orchestrator, PostKind};
use std::time::Duration;
use tempfile::TempDir;

/// Configuration rooted in `temp_dir` with a fast relay
pub fn test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.persistence.database_path = temp_dir.path().join("manifest.sqlite");
    config.output.base_dir = temp_dir.path().join("download");
    config.relay.poll_interval = Duration::from_millis(10);
    config.job.request_timeout = Duration::from_secs(5);
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    config
}

/// Orchestrator with the built-in fetch job and a running relay
pub async fn create_orchestrator() -> (Orchestrator, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(test_config(&temp_dir)).await.unwrap();
    (orchestrator, temp_dir)
}

/// Insert a submission owning one URL per address, returning the post row ID
pub async fn add_post(
    orchestrator: &Orchestrator,
    reddit_id: &str,
    title: &str,
    created_utc: i64,
    addresses: &[String],
) -> i64 {
    let post_id = orchestrator
        .db
        .insert_post(&NewPost {
            reddit_id: reddit_id.to_string(),
            kind: PostKind::Submission,
            author: "poster".to_string(),
            title: Some(title.to_string()),
            body: None,
            parent_id: None,
            subreddit: "pics".to_string(),
            over_18: false,
            created_utc,
            num_comments: 0,
            score: 1,
            source_alias: "saved".to_string(),
        })
        .await
        .unwrap();

    for address in addresses {
        orchestrator.db.insert_url(post_id, address).await.unwrap();
    }
    post_id
}
