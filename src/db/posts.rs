//! Post inserts, search and failed-post listing.

use crate::error::DatabaseError;
use crate::types::{FailedPost, PostKind, SearchField};
use crate::{Error, Result};

use super::{Database, NewPost, Post, PostRecord, SearchWindow};

const POST_COLUMNS: &str = "id, reddit_id, type, author, title, body, parent_id, subreddit, \
     over_18, created_utc, num_comments, score, source_alias";

/// `%term%`; `%` and `_` inside the term keep their LIKE meaning
fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}

/// `col LIKE ? OR ...` over allow-listed columns only
fn match_clause(fields: &[SearchField]) -> String {
    fields
        .iter()
        .map(|field| format!("{} LIKE ?", field.column()))
        .collect::<Vec<_>>()
        .join(" OR ")
}

fn search_failed(e: sqlx::Error) -> Error {
    Error::Database(DatabaseError::QueryFailed(format!(
        "Failed to search posts: {}",
        e
    )))
}

impl Database {
    /// Insert a new post record
    pub async fn insert_post(&self, post: &NewPost) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (
                reddit_id, type, author, title, body, parent_id, subreddit,
                over_18, created_utc, num_comments, score, source_alias
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.reddit_id)
        .bind(post.kind.as_str())
        .bind(&post.author)
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.parent_id)
        .bind(&post.subreddit)
        .bind(post.over_18 as i32)
        .bind(post.created_utc)
        .bind(post.num_comments)
        .bind(post.score)
        .bind(&post.source_alias)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Database(DatabaseError::ConstraintViolation(format!(
                    "Post {} already exists",
                    post.reddit_id
                )))
            }
            e => Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert post: {}",
                e
            ))),
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch one page of posts matching `term`, newest first, with their
    /// URL/File graph populated
    ///
    /// Matching is a case-insensitive LIKE test of `%term%` against each
    /// field, so `%` and `_` inside the term act as wildcards. An empty field
    /// list matches nothing.
    ///
    /// Page `n` covers matches `[n * page_size, (n + 1) * page_size)` under
    /// `created_utc DESC, id DESC`, so consecutive pages never overlap or
    /// skip a post. The count and the page come from one transaction.
    pub async fn search_posts(
        &self,
        fields: &[SearchField],
        term: &str,
        page: u64,
        page_size: u64,
    ) -> Result<SearchWindow> {
        if fields.is_empty() {
            return Ok(SearchWindow::default());
        }

        let clause = match_clause(fields);
        let pattern = like_pattern(term);

        let mut tx = self.pool.begin().await.map_err(search_failed)?;

        let count_sql = format!("SELECT COUNT(*) FROM posts WHERE {clause}");
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        for _ in fields {
            count = count.bind(pattern.clone());
        }
        let total = count.fetch_one(&mut *tx).await.map_err(search_failed)?;

        let window = page
            .checked_mul(page_size)
            .filter(|offset| page_size > 0 && *offset < total.max(0) as u64);

        let posts = match window {
            Some(offset) => {
                let select_sql = format!(
                    "SELECT {POST_COLUMNS} FROM posts WHERE {clause} \
                     ORDER BY created_utc DESC, id DESC LIMIT ? OFFSET ?"
                );
                let mut select = sqlx::query_as::<_, Post>(&select_sql);
                for _ in fields {
                    select = select.bind(pattern.clone());
                }
                select
                    .bind(i64::try_from(page_size).unwrap_or(i64::MAX))
                    .bind(i64::try_from(offset).unwrap_or(i64::MAX))
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(search_failed)?
            }
            None => Vec::new(),
        };

        tx.commit().await.map_err(search_failed)?;

        let mut records = Vec::with_capacity(posts.len());
        for post in posts {
            let urls = self.urls_for_post(post.id).await?;
            records.push(PostRecord { post, urls });
        }

        Ok(SearchWindow { total, records })
    }

    /// List posts that own at least one failed URL, newest first
    pub async fn posts_with_failed_urls(&self) -> Result<Vec<FailedPost>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE EXISTS (SELECT 1 FROM urls WHERE urls.post_id = posts.id AND urls.failed = 1) \
             ORDER BY created_utc DESC, id DESC"
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list posts with failed urls: {}",
                    e
                )))
            })?;

        let mut failed = Vec::with_capacity(posts.len());
        for post in posts {
            let failed_urls: Vec<String> = sqlx::query_scalar(
                "SELECT address FROM urls WHERE post_id = ? AND failed = 1 ORDER BY id",
            )
            .bind(post.id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list failed urls: {}",
                    e
                )))
            })?;

            failed.push(FailedPost {
                reddit_id: post.reddit_id,
                author: post.author,
                kind: PostKind::from_db(&post.kind),
                title: post.title,
                subreddit: post.subreddit,
                created_utc: post.created_utc,
                source_alias: post.source_alias,
                failed_urls,
            });
        }

        Ok(failed)
    }
}
