//! Shared test helpers for creating Orchestrator instances in tests.

use crate::config::Config;
use crate::db::{Database, NewPost};
use crate::job::{EventQueue, JobController, JobFactory, ProgressSnapshot};
use crate::orchestrator::Orchestrator;
use crate::types::{FileId, PostKind, ProgressEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

/// Controller whose liveness is driven by the test
pub(crate) struct MockController {
    started: AtomicBool,
    alive: AtomicBool,
    events: EventQueue,
    progress: Mutex<ProgressSnapshot>,
}

impl MockController {
    pub(crate) fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            alive: AtomicBool::new(false),
            events: EventQueue::new(),
            progress: Mutex::new(ProgressSnapshot::default()),
        }
    }

    /// Queue an event as the job would
    pub(crate) fn emit(&self, payload: serde_json::Value) {
        self.events.push(ProgressEvent::new(payload));
    }

    /// Simulate the job task terminating
    pub(crate) fn finish(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.progress.lock().unwrap().running = false;
    }

    pub(crate) fn set_processed(&self, processed: u64) {
        self.progress.lock().unwrap().processed = processed;
    }
}

impl JobController for MockController {
    fn start(&self) -> crate::Result<()> {
        self.started.store(true, Ordering::SeqCst);
        self.alive.store(true, Ordering::SeqCst);
        self.progress.lock().unwrap().running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.progress.lock().unwrap().running
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn events(&self) -> &EventQueue {
        &self.events
    }

    fn get_progress(&self) -> ProgressSnapshot {
        self.progress.lock().unwrap().clone()
    }
}

/// Factory recording every controller it hands out
#[derive(Default)]
pub(crate) struct MockFactory {
    created: Mutex<Vec<Arc<MockController>>>,
}

impl MockFactory {
    pub(crate) fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Most recently created controller
    pub(crate) fn last(&self) -> Arc<MockController> {
        self.created.lock().unwrap().last().cloned().unwrap()
    }
}

impl JobFactory for MockFactory {
    fn create(&self) -> Arc<dyn JobController> {
        let controller = Arc::new(MockController::new());
        self.created.lock().unwrap().push(controller.clone());
        controller
    }
}

/// Helper to create a test Orchestrator backed by a temp database and output
/// root. The relay is not started. Returns the tempdir, which must be kept alive.
pub(crate) async fn create_test_orchestrator()
-> (Orchestrator, Arc<MockFactory>, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.persistence.database_path = temp_dir.path().join("manifest.sqlite");
    config.output.base_dir = temp_dir.path().join("download");
    config.relay.poll_interval = Duration::from_millis(10);
    std::fs::create_dir_all(config.base_dir()).unwrap();

    let db = Arc::new(
        Database::new(&config.persistence.database_path)
            .await
            .unwrap(),
    );
    let factory = Arc::new(MockFactory::default());
    let orchestrator = Orchestrator::with_factory(config, db, factory.clone());

    (orchestrator, factory, temp_dir)
}

/// Insert a post with one URL per entry of `files`; `Some(name)` also writes
/// `<reddit_id>/<name>` under the output root and attaches a file record
pub(crate) async fn seed_post(
    orchestrator: &Orchestrator,
    reddit_id: &str,
    kind: PostKind,
    title: &str,
    created_utc: i64,
    files: &[Option<&str>],
) -> Vec<FileId> {
    let db = &orchestrator.db;
    let post_id = db
        .insert_post(&NewPost {
            reddit_id: reddit_id.into(),
            kind,
            author: "someone".into(),
            title: Some(title.into()),
            body: None,
            parent_id: None,
            subreddit: "pics".into(),
            over_18: false,
            created_utc,
            num_comments: 0,
            score: 1,
            source_alias: "saved".into(),
        })
        .await
        .unwrap();

    let mut ids = Vec::new();
    for (i, file) in files.iter().enumerate() {
        let url_id = db
            .insert_url(post_id, &format!("https://example.com/{reddit_id}/{i}"))
            .await
            .unwrap();
        match file {
            Some(name) => {
                let relative = format!("{reddit_id}/{name}");
                let on_disk = orchestrator.config.base_dir().join(&relative);
                std::fs::create_dir_all(on_disk.parent().unwrap()).unwrap();
                std::fs::write(&on_disk, b"content").unwrap();
                let file_id = db.insert_file(&relative, true).await.unwrap();
                db.attach_file(url_id, file_id).await.unwrap();
                db.mark_url_processed(url_id, false).await.unwrap();
                ids.push(file_id);
            }
            None => db.mark_url_processed(url_id, true).await.unwrap(),
        }
    }
    ids
}
