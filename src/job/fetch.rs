//! The default download job: fetch every unprocessed URL into the output root.

use crate::config::JobConfig;
use crate::db::{Database, Url};
use crate::types::{FileId, ProgressEvent};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use utoipa::ToSchema;

use super::{DownloadJob, JobContext, JobController, JobFactory, TaskController};

/// Progress events emitted by [`UrlFetchJob`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// The job found its work list
    JobStarted {
        /// Number of URLs to fetch
        total: u64,
    },

    /// A URL was fetched and stored
    UrlDownloaded {
        /// URL row ID
        url_id: i64,
        /// Address that was fetched
        address: String,
        /// Token of the stored file
        file_id: FileId,
        /// Stored location relative to the output root
        path: String,
    },

    /// A URL could not be fetched
    UrlFailed {
        /// URL row ID
        url_id: i64,
        /// Address that failed
        address: String,
        /// Failure reason
        error: String,
    },

    /// The job processed its whole work list
    JobFinished {
        /// Number of URLs processed
        processed: u64,
        /// Number of URLs that failed
        failed: u64,
    },
}

/// Fetches every unprocessed URL and records the resulting files
pub struct UrlFetchJob {
    db: Arc<Database>,
    base_dir: PathBuf,
    client: reqwest::Client,
}

impl UrlFetchJob {
    /// Create a job writing into `base_dir`
    pub fn new(db: Arc<Database>, base_dir: PathBuf, client: reqwest::Client) -> Self {
        Self {
            db,
            base_dir,
            client,
        }
    }

    fn emit(ctx: &JobContext, event: &JobEvent) {
        match ProgressEvent::from_serialize(event) {
            Ok(event) => ctx.emit(event),
            Err(e) => tracing::warn!(error = %e, "failed to serialize job event"),
        }
    }

    /// Fetch one URL and store its body, returning the new file's token and
    /// relative path
    async fn fetch_one(&self, url: &Url) -> Result<(FileId, String)> {
        let response = self
            .client
            .get(&url.address)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        let relative = relative_path_for(url);
        let destination = self.base_dir.join(&relative);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&destination, &body).await?;

        let file_id = self.db.insert_file(&relative, true).await?;
        self.db.attach_file(url.id, file_id).await?;
        Ok((file_id, relative))
    }
}

#[async_trait]
impl DownloadJob for UrlFetchJob {
    async fn run(self, ctx: JobContext) -> Result<()> {
        let urls = self.db.list_unprocessed_urls().await?;
        let total = urls.len() as u64;
        ctx.update(|s| s.total = total);
        Self::emit(&ctx, &JobEvent::JobStarted { total });

        let mut processed = 0;
        let mut failed = 0;

        for url in urls {
            ctx.update(|s| s.current = Some(url.address.clone()));

            match self.fetch_one(&url).await {
                Ok((file_id, path)) => {
                    self.db.mark_url_processed(url.id, false).await?;
                    tracing::debug!(url_id = url.id, file_id = %file_id, "url downloaded");
                    Self::emit(
                        &ctx,
                        &JobEvent::UrlDownloaded {
                            url_id: url.id,
                            address: url.address,
                            file_id,
                            path,
                        },
                    );
                }
                Err(e) => {
                    failed += 1;
                    self.db.mark_url_processed(url.id, true).await?;
                    tracing::warn!(url_id = url.id, address = %url.address, error = %e, "url failed");
                    Self::emit(
                        &ctx,
                        &JobEvent::UrlFailed {
                            url_id: url.id,
                            address: url.address,
                            error: e.to_string(),
                        },
                    );
                }
            }

            processed += 1;
            ctx.update(|s| {
                s.processed = processed;
                s.failed = failed;
            });
        }

        Self::emit(&ctx, &JobEvent::JobFinished { processed, failed });
        Ok(())
    }
}

/// `<post id>/<url id>[.ext]`, keeping a short alphanumeric extension from
/// the address when there is one
fn relative_path_for(row: &Url) -> String {
    let extension = url::Url::parse(&row.address)
        .ok()
        .and_then(|parsed| {
            let name = parsed.path_segments()?.next_back()?.to_string();
            Path::new(&name)
                .extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
                .map(|ext| ext.to_ascii_lowercase())
        });

    match extension {
        Some(ext) => format!("{}/{}.{}", row.post_id, row.id, ext),
        None => format!("{}/{}", row.post_id, row.id),
    }
}

/// [`JobFactory`] producing a [`UrlFetchJob`] per start
pub struct UrlFetchFactory {
    db: Arc<Database>,
    base_dir: PathBuf,
    client: reqwest::Client,
}

impl UrlFetchFactory {
    /// Create a factory
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(db: Arc<Database>, base_dir: PathBuf, config: &JobConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            db,
            base_dir,
            client,
        })
    }
}

impl JobFactory for UrlFetchFactory {
    fn create(&self) -> Arc<dyn JobController> {
        Arc::new(TaskController::new(UrlFetchJob::new(
            self.db.clone(),
            self.base_dir.clone(),
            self.client.clone(),
        )))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewPost;
    use crate::types::PostKind;
    use std::time::Duration;
    use tempfile::{NamedTempFile, TempDir, tempdir};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url_row(post_id: i64, id: i64, address: &str) -> Url {
        Url {
            id,
            post_id,
            address: address.to_string(),
            processed: 0,
            failed: 0,
            file_id: None,
        }
    }

    #[test]
    fn relative_path_keeps_short_extension() {
        assert_eq!(
            relative_path_for(&url_row(3, 7, "https://i.example.com/abc.JPG")),
            "3/7.jpg"
        );
        assert_eq!(
            relative_path_for(&url_row(3, 8, "https://example.com/gallery/")),
            "3/8"
        );
        assert_eq!(
            relative_path_for(&url_row(3, 9, "https://example.com/file.tar.gz?x=1")),
            "3/9.gz"
        );
        assert_eq!(
            relative_path_for(&url_row(3, 10, "https://example.com/a.verylongext")),
            "3/10"
        );
        assert_eq!(relative_path_for(&url_row(3, 11, "not a url")), "3/11");
    }

    async fn setup() -> (Arc<Database>, NamedTempFile, TempDir) {
        let db_file = NamedTempFile::new().unwrap();
        let db = Arc::new(Database::new(db_file.path()).await.unwrap());
        (db, db_file, tempdir().unwrap())
    }

    async fn insert_post(db: &Database, reddit_id: &str) -> i64 {
        db.insert_post(&NewPost {
            reddit_id: reddit_id.into(),
            kind: PostKind::Submission,
            author: "someone".into(),
            title: Some("title".into()),
            body: None,
            parent_id: None,
            subreddit: "pics".into(),
            over_18: false,
            created_utc: 1,
            num_comments: 0,
            score: 0,
            source_alias: "saved".into(),
        })
        .await
        .unwrap()
    }

    async fn wait_until_dead(controller: &dyn JobController) {
        for _ in 0..200 {
            if !controller.is_alive() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job did not terminate");
    }

    #[tokio::test]
    async fn fetches_urls_and_records_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/good.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (db, _db_file, out) = setup().await;
        let post_id = insert_post(&db, "t3_a").await;
        let good = db
            .insert_url(post_id, &format!("{}/good.png", server.uri()))
            .await
            .unwrap();
        let bad = db
            .insert_url(post_id, &format!("{}/missing.png", server.uri()))
            .await
            .unwrap();

        let factory =
            UrlFetchFactory::new(db.clone(), out.path().to_path_buf(), &JobConfig::default())
                .unwrap();
        let controller = factory.create();
        controller.start().unwrap();
        wait_until_dead(controller.as_ref()).await;

        let snapshot = controller.get_progress();
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.processed, 2);
        assert_eq!(snapshot.failed, 1);
        assert!(snapshot.error.is_none());

        let good_row = db.get_url(good).await.unwrap().unwrap();
        assert_eq!((good_row.processed, good_row.failed), (1, 0));
        let file = db.get_file(good_row.file_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(file.path, format!("{post_id}/{good}.png"));
        assert_eq!(
            std::fs::read(out.path().join(&file.path)).unwrap(),
            b"png-bytes"
        );

        let bad_row = db.get_url(bad).await.unwrap().unwrap();
        assert_eq!((bad_row.processed, bad_row.failed), (1, 1));
        assert!(bad_row.file_id.is_none());

        let events: Vec<JobEvent> = controller
            .events()
            .drain()
            .into_iter()
            .map(|e| serde_json::from_value(e.into_payload()).unwrap())
            .collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], JobEvent::JobStarted { total: 2 });
        assert!(matches!(events[1], JobEvent::UrlDownloaded { url_id, .. } if url_id == good));
        assert!(matches!(events[2], JobEvent::UrlFailed { url_id, .. } if url_id == bad));
        assert_eq!(
            events[3],
            JobEvent::JobFinished {
                processed: 2,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn nothing_to_do_still_reports_start_and_finish() {
        let (db, _db_file, out) = setup().await;

        let factory =
            UrlFetchFactory::new(db, out.path().to_path_buf(), &JobConfig::default()).unwrap();
        let controller = factory.create();
        controller.start().unwrap();
        wait_until_dead(controller.as_ref()).await;

        let events = controller.events().drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].payload()["type"], "job_started");
        assert_eq!(events[1].payload()["type"], "job_finished");
    }
}
