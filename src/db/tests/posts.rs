use super::*;

#[tokio::test]
async fn test_insert_and_get_post() {
    let (db, _temp) = open_test_db().await;

    let mut post = new_post("t3_abc", PostKind::Submission, 1_700_000_000);
    post.over_18 = true;
    post.parent_id = Some("t3_parent".into());
    let id = db.insert_post(&post).await.unwrap();
    assert!(id > 0);

    let stored = fetch_post(&db, "t3_abc").await.unwrap();
    assert_eq!(stored.kind, "Submission");
    assert_eq!(stored.over_18, 1);
    assert_eq!(stored.parent_id.as_deref(), Some("t3_parent"));
    assert_eq!(stored.created_utc, 1_700_000_000);
}

#[tokio::test]
async fn test_duplicate_reddit_id_is_constraint_violation() {
    let (db, _temp) = open_test_db().await;

    let post = new_post("t3_dup", PostKind::Submission, 1);
    db.insert_post(&post).await.unwrap();
    let result = db.insert_post(&post).await;

    assert!(
        matches!(
            result,
            Err(Error::Database(DatabaseError::ConstraintViolation(_)))
        ),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let (db, _temp) = open_test_db().await;

    let mut post = new_post("t3_cat", PostKind::Submission, 1);
    post.title = Some("My Cat Photos".into());
    db.insert_post(&post).await.unwrap();
    db.insert_post(&new_post("t3_dog", PostKind::Submission, 2))
        .await
        .unwrap();

    let window = db
        .search_posts(&[SearchField::Title], "CAT", 0, 10)
        .await
        .unwrap();
    assert_eq!(window.total, 1);
    assert_eq!(window.records.len(), 1);
    assert_eq!(window.records[0].post.reddit_id, "t3_cat");
}

#[tokio::test]
async fn test_search_orders_newest_first() {
    let (db, _temp) = open_test_db().await;

    for (id, created) in [("t3_old", 10), ("t3_new", 30), ("t3_mid", 20)] {
        db.insert_post(&new_post(id, PostKind::Submission, created))
            .await
            .unwrap();
    }

    let window = db
        .search_posts(&[SearchField::Title], "title", 0, 10)
        .await
        .unwrap();
    let ids: Vec<_> = window.records.iter().map(|r| r.post.reddit_id.as_str()).collect();
    assert_eq!(ids, vec!["t3_new", "t3_mid", "t3_old"]);
}

#[tokio::test]
async fn test_search_windows_do_not_overlap() {
    let (db, _temp) = open_test_db().await;

    // Same timestamp everywhere; id breaks the tie
    for i in 0..5 {
        db.insert_post(&new_post(&format!("t3_{i}"), PostKind::Submission, 100))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for page in 0..3 {
        let window = db
            .search_posts(&[SearchField::Title], "title", page, 2)
            .await
            .unwrap();
        assert_eq!(window.total, 5);
        seen.extend(window.records.into_iter().map(|r| r.post.reddit_id));
    }
    assert_eq!(seen.len(), 5);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn test_search_keeps_inner_wildcards() {
    let (db, _temp) = open_test_db().await;

    let mut spaced = new_post("t3_spaced", PostKind::Submission, 1);
    spaced.title = Some("50 percent off".into());
    db.insert_post(&spaced).await.unwrap();

    let mut other = new_post("t3_other", PostKind::Submission, 2);
    other.title = Some("full price".into());
    db.insert_post(&other).await.unwrap();

    let percent = db
        .search_posts(&[SearchField::Title], "50%off", 0, 10)
        .await
        .unwrap();
    assert_eq!(percent.total, 1);
    assert_eq!(percent.records[0].post.reddit_id, "t3_spaced");

    let underscore = db
        .search_posts(&[SearchField::Title], "full_price", 0, 10)
        .await
        .unwrap();
    assert_eq!(underscore.total, 1);
    assert_eq!(underscore.records[0].post.reddit_id, "t3_other");
}

#[tokio::test]
async fn test_search_past_last_page_keeps_total() {
    let (db, _temp) = open_test_db().await;
    for i in 0..3 {
        db.insert_post(&new_post(&format!("t3_{i}"), PostKind::Submission, i))
            .await
            .unwrap();
    }

    let window = db
        .search_posts(&[SearchField::Title], "title", 5, 10)
        .await
        .unwrap();
    assert_eq!(window.total, 3);
    assert!(window.records.is_empty());

    let empty_page = db
        .search_posts(&[SearchField::Title], "title", 0, 0)
        .await
        .unwrap();
    assert_eq!(empty_page.total, 3);
    assert!(empty_page.records.is_empty());
}

#[tokio::test]
async fn test_search_matches_any_listed_field() {
    let (db, _temp) = open_test_db().await;

    let mut by_author = new_post("t3_a", PostKind::Submission, 1);
    by_author.author = "needle_fan".into();
    db.insert_post(&by_author).await.unwrap();

    let mut by_body = new_post("t1_b", PostKind::Comment, 2);
    by_body.body = Some("a needle in a haystack".into());
    db.insert_post(&by_body).await.unwrap();

    let fields = [SearchField::Author, SearchField::Body];
    let window = db.search_posts(&fields, "needle", 0, 10).await.unwrap();
    assert_eq!(window.total, 2);
    let titles = db
        .search_posts(&[SearchField::Title], "needle", 0, 10)
        .await
        .unwrap();
    assert_eq!(titles.total, 0);
}

#[tokio::test]
async fn test_search_with_no_fields_matches_nothing() {
    let (db, _temp) = open_test_db().await;
    db.insert_post(&new_post("t3_a", PostKind::Submission, 1))
        .await
        .unwrap();

    let window = db.search_posts(&[], "title", 0, 10).await.unwrap();
    assert_eq!(window.total, 0);
    assert!(window.records.is_empty());
}

#[tokio::test]
async fn test_search_populates_url_file_graph() {
    let (db, _temp) = open_test_db().await;

    let post = new_post("t3_graph", PostKind::Submission, 1);
    let file_id = insert_post_with_file(&db, &post, "t3_graph/1.jpg").await;

    // A second URL that never produced a file
    let stored = fetch_post(&db, "t3_graph").await.unwrap();
    db.insert_url(stored.id, "https://example.com/broken")
        .await
        .unwrap();

    let window = db
        .search_posts(&[SearchField::RedditId], "graph", 0, 10)
        .await
        .unwrap();
    assert_eq!(window.records.len(), 1);
    let record = &window.records[0];
    assert_eq!(record.urls.len(), 2);
    assert!(record.urls[1].file.is_none());

    let files: Vec<_> = record.files().collect();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, file_id);
    assert_eq!(files[0].path, "t3_graph/1.jpg");
}

#[tokio::test]
async fn test_posts_with_failed_urls() {
    let (db, _temp) = open_test_db().await;

    let ok_post = db
        .insert_post(&new_post("t3_ok", PostKind::Submission, 1))
        .await
        .unwrap();
    let ok_url = db.insert_url(ok_post, "https://example.com/ok").await.unwrap();
    db.mark_url_processed(ok_url, false).await.unwrap();

    let bad_post = db
        .insert_post(&new_post("t3_bad", PostKind::Submission, 2))
        .await
        .unwrap();
    let bad_a = db.insert_url(bad_post, "https://example.com/a").await.unwrap();
    let bad_b = db.insert_url(bad_post, "https://example.com/b").await.unwrap();
    db.mark_url_processed(bad_a, true).await.unwrap();
    db.mark_url_processed(bad_b, true).await.unwrap();

    let failed = db.posts_with_failed_urls().await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].reddit_id, "t3_bad");
    assert_eq!(
        failed[0].failed_urls,
        vec!["https://example.com/a", "https://example.com/b"]
    );
}
