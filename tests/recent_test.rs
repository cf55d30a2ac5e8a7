//! Integration tests for the recent activity listing

mod common;
use serial_test::serial;

use chrono::{Duration, Utc};
use common::{database::*, fixtures::*};
use groupportal::comments::{self, CommentForm};
use groupportal::forums::{self, ForumForm};
use groupportal::orm::thread_tags;
use groupportal::polls::{self, PollForm};
use groupportal::recent::{get_recent_activity, RecentFilter};
use sea_orm::{entity::*, ActiveValue::Set};

#[actix_rt::test]
#[serial]
async fn test_recent_window_excludes_old_and_deleted_threads() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let now = Utc::now().naive_utc();
    let fresh = create_test_thread(&db, author.id, "Fresh", None)
        .await
        .expect("Failed to create thread");
    create_test_thread_at(&db, author.id, "Stale", None, now - Duration::days(30))
        .await
        .expect("Failed to create thread");
    let deleted = create_test_thread(&db, author.id, "Gone", None)
        .await
        .expect("Failed to create thread");
    groupportal::threads::delete_thread(&db, deleted.id)
        .await
        .expect("Failed to delete thread");

    let activity = get_recent_activity(&db, &RecentFilter::default(), Utc::now().naive_utc(), 7, 100)
        .await
        .expect("Failed to load activity");
    let ids: Vec<i32> = activity.threads.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![fresh.id]);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_recent_category_filter_applies_to_comments() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let homework = create_test_category(&db, "Homework")
        .await
        .expect("Failed to create category");
    let sports = create_test_category(&db, "Sports")
        .await
        .expect("Failed to create category");
    let maths = create_test_thread(&db, author.id, "Maths help", Some(homework.id))
        .await
        .expect("Failed to create thread");
    let football = create_test_thread(&db, author.id, "Football", Some(sports.id))
        .await
        .expect("Failed to create thread");
    let on_maths = create_test_comment(&db, author.id, maths.id, None, "Try this")
        .await
        .expect("Failed to create comment");
    create_test_comment(&db, author.id, football.id, None, "Goal")
        .await
        .expect("Failed to create comment");

    let filter = RecentFilter {
        category: Some(homework.id),
        ..Default::default()
    };
    let activity = get_recent_activity(&db, &filter, Utc::now().naive_utc(), 7, 100)
        .await
        .expect("Failed to load activity");

    let thread_ids: Vec<i32> = activity.threads.iter().map(|t| t.id).collect();
    let comment_ids: Vec<i32> = activity.comments.iter().map(|c| c.id).collect();
    assert_eq!(thread_ids, vec![maths.id]);
    assert_eq!(comment_ids, vec![on_maths.id]);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_recent_forum_filter_follows_forum_categories() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let homework = create_test_category(&db, "Homework")
        .await
        .expect("Failed to create category");
    let sports = create_test_category(&db, "Sports")
        .await
        .expect("Failed to create category");
    let forum = forums::create_forum(
        &db,
        author.id,
        &ForumForm {
            name: "Study".to_string(),
            categories: vec![homework.id],
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create forum");
    let maths = create_test_thread(&db, author.id, "Maths help", Some(homework.id))
        .await
        .expect("Failed to create thread");
    create_test_thread(&db, author.id, "Football", Some(sports.id))
        .await
        .expect("Failed to create thread");

    let filter = RecentFilter {
        forum: Some(forum.id),
        ..Default::default()
    };
    let activity = get_recent_activity(&db, &filter, Utc::now().naive_utc(), 7, 100)
        .await
        .expect("Failed to load activity");
    let ids: Vec<i32> = activity.threads.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![maths.id]);

    let forum_threads = forums::get_forum_threads(&db, forum.id)
        .await
        .expect("Failed to load forum threads");
    assert_eq!(forum_threads.len(), 1);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_recent_tag_filter_follows_thread_tags() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let rust = create_test_tag(&db, "rust").await.expect("Failed to create tag");
    let tagged = create_test_thread(&db, author.id, "Borrow checker", None)
        .await
        .expect("Failed to create thread");
    create_test_thread(&db, author.id, "Untagged", None)
        .await
        .expect("Failed to create thread");
    thread_tags::ActiveModel {
        thread_id: Set(tagged.id),
        tag_id: Set(rust.id),
    }
    .insert(&db)
    .await
    .expect("Failed to tag thread");
    let on_tagged = create_test_comment(&db, author.id, tagged.id, None, "Lifetimes")
        .await
        .expect("Failed to create comment");

    let filter = RecentFilter {
        tag: Some(rust.id),
        ..Default::default()
    };
    let activity = get_recent_activity(&db, &filter, Utc::now().naive_utc(), 7, 100)
        .await
        .expect("Failed to load activity");
    let thread_ids: Vec<i32> = activity.threads.iter().map(|t| t.id).collect();
    let comment_ids: Vec<i32> = activity.comments.iter().map(|c| c.id).collect();
    assert_eq!(thread_ids, vec![tagged.id]);
    assert_eq!(comment_ids, vec![on_tagged.id]);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_recent_hides_poll_comments_of_deleted_threads() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Trip", None)
        .await
        .expect("Failed to create thread");
    let poll = polls::create_poll(
        &db,
        &PollForm {
            thread: thread.id.to_string(),
            question: "Where to?".to_string(),
            options: vec!["Museum".to_string(), "Zoo".to_string()],
        },
    )
    .await
    .expect("Failed to create poll");
    comments::create_comment(
        &db,
        author.id,
        &CommentForm {
            content: "Zoo please".to_string(),
            poll: poll.id.to_string(),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to comment on poll");

    groupportal::threads::delete_thread(&db, thread.id)
        .await
        .expect("Failed to delete thread");

    let activity = get_recent_activity(&db, &RecentFilter::default(), Utc::now().naive_utc(), 7, 100)
        .await
        .expect("Failed to load activity");
    assert!(activity.threads.is_empty());
    assert!(activity.polls.is_empty());
    assert!(activity.comments.is_empty());

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
