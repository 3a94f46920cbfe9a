use super::*;
use crate::Error;
use crate::error::DatabaseError;
use crate::types::{FileId, PostKind, SearchField};
use tempfile::NamedTempFile;

mod posts;

/// Open a fresh database backed by a temp file
async fn open_test_db() -> (Database, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    (db, temp_file)
}

/// Build a post with sensible defaults
fn new_post(reddit_id: &str, kind: PostKind, created_utc: i64) -> NewPost {
    NewPost {
        reddit_id: reddit_id.to_string(),
        kind,
        author: "someone".to_string(),
        title: match kind {
            PostKind::Submission => Some(format!("title of {reddit_id}")),
            PostKind::Comment => None,
        },
        body: Some(format!("body of {reddit_id}")),
        parent_id: None,
        subreddit: "pics".to_string(),
        over_18: false,
        created_utc,
        num_comments: 0,
        score: 1,
        source_alias: "saved".to_string(),
    }
}

/// Load a post row straight from the table
async fn fetch_post(db: &Database, reddit_id: &str) -> Option<Post> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE reddit_id = ?")
        .bind(reddit_id)
        .fetch_optional(db.pool())
        .await
        .unwrap()
}

/// Insert a post owning one URL that produced `path`, returning the file id
async fn insert_post_with_file(db: &Database, post: &NewPost, path: &str) -> FileId {
    let post_id = db.insert_post(post).await.unwrap();
    let url_id = db
        .insert_url(post_id, &format!("https://i.example.com/{}.jpg", post.reddit_id))
        .await
        .unwrap();
    let file_id = db.insert_file(path, true).await.unwrap();
    db.attach_file(url_id, file_id).await.unwrap();
    db.mark_url_processed(url_id, false).await.unwrap();
    file_id
}
