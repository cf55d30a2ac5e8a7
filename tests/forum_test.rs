//! Integration tests for threads, comments, votes and taxonomy

mod common;
use serial_test::serial;

use common::{database::*, fixtures::*};
use groupportal::achievements::{self, AchievementForm};
use groupportal::comments::{self, build_reply_tree, CommentForm};
use groupportal::error::StoreError;
use groupportal::forums::{self, ForumForm};
use groupportal::orm::vote_type::VoteType;
use groupportal::orm::{thread_votes, users};
use groupportal::taxonomy::{self, CategoryForm, TagForm};
use groupportal::threads::{self, ThreadForm};
use groupportal::votes;
use sea_orm::{entity::*, query::*};

#[actix_rt::test]
#[serial]
async fn test_thread_vote_overwrites_previous_vote() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let voter = create_test_user(&db, "voter").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Vote me", None)
        .await
        .expect("Failed to create thread");

    votes::vote_thread(&db, voter.id, thread.id, VoteType::Up)
        .await
        .expect("Failed to vote");
    votes::vote_thread(&db, voter.id, thread.id, VoteType::Down)
        .await
        .expect("Failed to vote again");

    let tally = votes::thread_tally(&db, thread.id).await.expect("Failed to tally");
    assert_eq!(tally.up, 0);
    assert_eq!(tally.down, 1);
    assert_eq!(tally.score(), -1);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_comment_votes_are_counted_per_user() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let first = create_test_user(&db, "first").await.expect("Failed to create user");
    let second = create_test_user(&db, "second").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Thread", None)
        .await
        .expect("Failed to create thread");
    let comment = create_test_comment(&db, author.id, thread.id, None, "Hello")
        .await
        .expect("Failed to create comment");

    votes::vote_comment(&db, first.id, comment.id, VoteType::Up)
        .await
        .expect("Failed to vote");
    votes::vote_comment(&db, first.id, comment.id, VoteType::Up)
        .await
        .expect("Failed to repeat vote");
    votes::vote_comment(&db, second.id, comment.id, VoteType::Down)
        .await
        .expect("Failed to vote");

    let tallies = votes::comment_tallies(&db, &[comment.id])
        .await
        .expect("Failed to tally");
    let tally = tallies.get(&comment.id).copied().unwrap_or_default();
    assert_eq!(tally.up, 1);
    assert_eq!(tally.down, 1);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_vote_on_missing_thread_is_not_found() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let voter = create_test_user(&db, "voter").await.expect("Failed to create user");
    let result = votes::vote_thread(&db, voter.id, 9999, VoteType::Up).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_deleted_thread_is_hidden_but_kept() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Short lived", None)
        .await
        .expect("Failed to create thread");

    threads::delete_thread(&db, thread.id)
        .await
        .expect("Failed to delete thread");

    let stored = threads::get_thread(&db, thread.id)
        .await
        .expect("Row should still exist");
    assert!(stored.is_deleted);
    assert!(matches!(
        threads::get_visible_thread(&db, thread.id).await,
        Err(StoreError::NotFound(_))
    ));

    let listed = threads::list_threads(&db).await.expect("Failed to list");
    assert!(listed.iter().all(|t| t.id != thread.id));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_thread_edit_records_history() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let form = ThreadForm {
        title: "Original".to_string(),
        description: "First version".to_string(),
        ..Default::default()
    };
    let thread = threads::create_thread(&db, author.id, &form)
        .await
        .expect("Failed to create thread");

    let edit = ThreadForm {
        title: "Original".to_string(),
        description: "Second version".to_string(),
        ..Default::default()
    };
    let updated = threads::update_thread(&db, thread.id, author.id, &edit)
        .await
        .expect("Failed to update thread");
    assert_eq!(updated.description, "Second version");

    let history = threads::get_thread_history(&db, thread.id)
        .await
        .expect("Failed to load history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_content, "First version");
    assert_eq!(history[0].new_content, "Second version");
    assert_eq!(history[0].user_id, Some(author.id));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_blank_thread_title_is_rejected() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let form = ThreadForm {
        title: "   ".to_string(),
        description: "Body".to_string(),
        ..Default::default()
    };

    match threads::create_thread(&db, author.id, &form).await {
        Err(StoreError::Invalid(errors)) => assert!(errors.has("title")),
        other => panic!("expected a title error, got {:?}", other),
    }

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_comment_edit_records_history() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Thread", None)
        .await
        .expect("Failed to create thread");
    let comment = create_test_comment(&db, author.id, thread.id, None, "Before")
        .await
        .expect("Failed to create comment");

    comments::update_comment(&db, comment.id, author.id, "After")
        .await
        .expect("Failed to edit comment");

    let history = comments::get_comment_history(&db, comment.id)
        .await
        .expect("Failed to load history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_content, "Before");
    assert_eq!(history[0].new_content, "After");

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_comment_needs_thread_or_poll() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let form = CommentForm {
        content: "Floating".to_string(),
        ..Default::default()
    };

    let result = comments::create_comment(&db, author.id, &form).await;
    assert!(matches!(result, Err(StoreError::Invalid(_))));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_deleted_comment_with_replies_becomes_tombstone() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Thread", None)
        .await
        .expect("Failed to create thread");
    let root = create_test_comment(&db, author.id, thread.id, None, "Root")
        .await
        .expect("Failed to create comment");
    let reply = create_test_comment(&db, author.id, thread.id, Some(root.id), "Reply")
        .await
        .expect("Failed to create reply");
    let lonely = create_test_comment(&db, author.id, thread.id, None, "Lonely")
        .await
        .expect("Failed to create comment");

    comments::delete_comment(&db, root.id)
        .await
        .expect("Failed to delete root");
    comments::delete_comment(&db, lonely.id)
        .await
        .expect("Failed to delete lonely");

    let all = comments::get_thread_comments(&db, thread.id)
        .await
        .expect("Failed to load comments");
    assert_eq!(all.len(), 3);

    let tree = build_reply_tree(all);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].comment.id, root.id);
    assert!(tree[0].is_tombstone);
    assert_eq!(tree[1].comment.id, reply.id);
    assert_eq!(tree[1].depth, 1);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_subscribe_twice_keeps_one_row() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Thread", None)
        .await
        .expect("Failed to create thread");

    let first = threads::subscribe(&db, author.id, thread.id)
        .await
        .expect("Failed to subscribe");
    let second = threads::subscribe(&db, author.id, thread.id)
        .await
        .expect("Failed to subscribe again");
    assert_eq!(first.id, second.id);
    assert!(threads::is_subscribed(&db, author.id, thread.id).await.unwrap());

    threads::unsubscribe(&db, author.id, thread.id)
        .await
        .expect("Failed to unsubscribe");
    assert!(!threads::is_subscribed(&db, author.id, thread.id).await.unwrap());

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_category_names_are_unique_ignoring_case() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let form = CategoryForm {
        name: "Homework".to_string(),
        description: String::new(),
    };
    let category = taxonomy::create_category(&db, &form)
        .await
        .expect("Failed to create category");

    let duplicate = CategoryForm {
        name: "HOMEWORK".to_string(),
        description: String::new(),
    };
    match taxonomy::create_category(&db, &duplicate).await {
        Err(StoreError::Invalid(errors)) => assert_eq!(
            errors.get("name"),
            vec!["Category with this Name already exists.".to_string()]
        ),
        other => panic!("expected a duplicate name error, got {:?}", other),
    }

    // Renaming to a different case of its own name is allowed.
    let renamed = taxonomy::update_category(&db, category.id, &duplicate)
        .await
        .expect("Failed to rename category");
    assert_eq!(renamed.name, "HOMEWORK");

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_tag_names_are_unique_ignoring_case() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    create_test_tag(&db, "rust").await.expect("Failed to create tag");
    let result = taxonomy::create_tag(
        &db,
        &TagForm {
            name: "Rust".to_string(),
        },
    )
    .await;
    assert!(matches!(result, Err(StoreError::Invalid(_))));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_forum_names_are_unique_ignoring_case() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let form = ForumForm {
        name: "Science".to_string(),
        ..Default::default()
    };
    forums::create_forum(&db, author.id, &form)
        .await
        .expect("Failed to create forum");

    let duplicate = ForumForm {
        name: "science".to_string(),
        ..Default::default()
    };
    match forums::create_forum(&db, author.id, &duplicate).await {
        Err(StoreError::Invalid(errors)) => assert_eq!(
            errors.get("name"),
            vec!["Forum with this Name already exists.".to_string()]
        ),
        other => panic!("expected a duplicate name error, got {:?}", other),
    }

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_achievement_names_are_unique_ignoring_case() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let form = AchievementForm {
        name: "First Post".to_string(),
        description: "Wrote a thread".to_string(),
        points: 10,
        criteria: String::new(),
        points_raw: "10".to_string(),
    };
    achievements::create_achievement(&db, &form)
        .await
        .expect("Failed to create achievement");

    let duplicate = AchievementForm {
        name: "FIRST POST".to_string(),
        ..form.clone()
    };
    match achievements::create_achievement(&db, &duplicate).await {
        Err(StoreError::Invalid(errors)) => assert_eq!(
            errors.get("name"),
            vec!["Achievement with this Name already exists.".to_string()]
        ),
        other => panic!("expected a duplicate name error, got {:?}", other),
    }

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_deleted_comment_is_still_found_by_id() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Thread", None)
        .await
        .expect("Failed to create thread");
    let comment = create_test_comment(&db, author.id, thread.id, None, "Gone")
        .await
        .expect("Failed to create comment");

    comments::delete_comment(&db, comment.id)
        .await
        .expect("Failed to delete comment");

    let stored = comments::get_comment(&db, comment.id)
        .await
        .expect("Deleted comment should still load");
    assert!(stored.is_deleted);
    assert_eq!(stored.content, "Gone");
    assert!(matches!(
        comments::get_visible_comment(&db, comment.id).await,
        Err(StoreError::NotFound(_))
    ));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_deleting_author_keeps_their_content() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "leaver").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Orphan", None)
        .await
        .expect("Failed to create thread");
    let comment = create_test_comment(&db, author.id, thread.id, None, "Still here")
        .await
        .expect("Failed to create comment");
    let forum = forums::create_forum(
        &db,
        author.id,
        &ForumForm {
            name: "Leftovers".to_string(),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create forum");

    users::Entity::delete_by_id(author.id)
        .exec(&db)
        .await
        .expect("Failed to delete user");

    let thread = threads::get_thread(&db, thread.id).await.expect("Thread should remain");
    assert_eq!(thread.author_id, None);
    let comment = comments::get_comment(&db, comment.id)
        .await
        .expect("Comment should remain");
    assert_eq!(comment.author_id, None);
    let forum = forums::get_forum(&db, forum.id).await.expect("Forum should remain");
    assert_eq!(forum.author_id, None);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_save_and_unsave_are_idempotent() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Keep me", None)
        .await
        .expect("Failed to create thread");

    let first = threads::save(&db, author.id, thread.id).await.expect("Failed to save");
    let second = threads::save(&db, author.id, thread.id)
        .await
        .expect("Failed to save again");
    assert_eq!(first.id, second.id);
    assert!(threads::is_saved(&db, author.id, thread.id).await.unwrap());

    threads::unsave(&db, author.id, thread.id).await.expect("Failed to unsave");
    threads::unsave(&db, author.id, thread.id)
        .await
        .expect("Unsaving twice should succeed");
    assert!(!threads::is_saved(&db, author.id, thread.id).await.unwrap());

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_concurrent_votes_keep_one_row() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let voter = create_test_user(&db, "voter").await.expect("Failed to create user");
    let thread = create_test_thread(&db, author.id, "Contested", None)
        .await
        .expect("Failed to create thread");

    let (up, down) = futures::join!(
        votes::vote_thread(&db, voter.id, thread.id, VoteType::Up),
        votes::vote_thread(&db, voter.id, thread.id, VoteType::Down),
    );
    up.expect("First vote failed");
    down.expect("Second vote failed");

    let rows = thread_votes::Entity::find()
        .filter(thread_votes::Column::ThreadId.eq(thread.id))
        .count(&db)
        .await
        .expect("Failed to count votes");
    assert_eq!(rows, 1);
    let tally = votes::thread_tally(&db, thread.id).await.expect("Failed to tally");
    assert_eq!(tally.up + tally.down, 1);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_concurrent_duplicate_categories_fail_validation() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let lower = CategoryForm {
        name: "clubs".to_string(),
        description: String::new(),
    };
    let upper = CategoryForm {
        name: "CLUBS".to_string(),
        description: String::new(),
    };
    let (a, b) = futures::join!(
        taxonomy::create_category(&db, &lower),
        taxonomy::create_category(&db, &upper),
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        match result {
            Err(StoreError::Invalid(errors)) => assert_eq!(
                errors.get("name"),
                vec!["Category with this Name already exists.".to_string()]
            ),
            other => panic!("expected a duplicate name error, got {:?}", other),
        }
    }

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_reply_must_share_parent_thread() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author").await.expect("Failed to create user");
    let here = create_test_thread(&db, author.id, "Here", None)
        .await
        .expect("Failed to create thread");
    let elsewhere = create_test_thread(&db, author.id, "Elsewhere", None)
        .await
        .expect("Failed to create thread");
    let parent = create_test_comment(&db, author.id, elsewhere.id, None, "Over there")
        .await
        .expect("Failed to create comment");

    let form = CommentForm {
        content: "Crossing over".to_string(),
        thread: here.id.to_string(),
        parent: parent.id.to_string(),
        ..Default::default()
    };
    match comments::create_comment(&db, author.id, &form).await {
        Err(StoreError::Invalid(errors)) => assert!(errors.has("parent")),
        other => panic!("expected a parent error, got {:?}", other),
    }

    // Same thread is fine.
    let form = CommentForm {
        thread: elsewhere.id.to_string(),
        ..form
    };
    let reply = comments::create_comment(&db, author.id, &form)
        .await
        .expect("Failed to reply");
    assert_eq!(reply.parent_id, Some(parent.id));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
