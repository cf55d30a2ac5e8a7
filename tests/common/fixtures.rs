//! Test fixtures for creating test data
#![allow(dead_code)]

use chrono::{NaiveDateTime, Utc};
use groupportal::orm::threads::ThreadStatus;
use groupportal::orm::{categories, comments, students, subjects, tags, threads, users};
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

/// Create an active, unprivileged user.
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(Some(format!("{}@test.com", username))),
        is_staff: Set(false),
        is_superuser: Set(false),
        is_active: Set(true),
        date_joined: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a staff user.
pub async fn create_staff_user(db: &DatabaseConnection, username: &str) -> Result<users::Model, DbErr> {
    let user = create_test_user(db, username).await?;
    let mut active = user.into_active_model();
    active.is_staff = Set(true);
    active.update(db).await
}

pub async fn create_test_category(db: &DatabaseConnection, name: &str) -> Result<categories::Model, DbErr> {
    categories::ActiveModel {
        name: Set(name.to_string()),
        description: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_test_tag(db: &DatabaseConnection, name: &str) -> Result<tags::Model, DbErr> {
    tags::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a thread directly, bypassing form validation.
pub async fn create_test_thread(
    db: &DatabaseConnection,
    author_id: i32,
    title: &str,
    category_id: Option<i32>,
) -> Result<threads::Model, DbErr> {
    create_test_thread_at(db, author_id, title, category_id, Utc::now().naive_utc()).await
}

/// Create a thread with a chosen creation time.
pub async fn create_test_thread_at(
    db: &DatabaseConnection,
    author_id: i32,
    title: &str,
    category_id: Option<i32>,
    created_at: NaiveDateTime,
) -> Result<threads::Model, DbErr> {
    threads::ActiveModel {
        title: Set(title.to_string()),
        description: Set(format!("About {}", title)),
        attachment: Set(None),
        author_id: Set(Some(author_id)),
        category_id: Set(category_id),
        views: Set(0),
        is_deleted: Set(false),
        status: Set(ThreadStatus::Open),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a comment on a thread, optionally as a reply.
pub async fn create_test_comment(
    db: &DatabaseConnection,
    author_id: i32,
    thread_id: i32,
    parent_id: Option<i32>,
    content: &str,
) -> Result<comments::Model, DbErr> {
    let now = Utc::now().naive_utc();
    comments::ActiveModel {
        thread_id: Set(Some(thread_id)),
        poll_id: Set(None),
        author_id: Set(Some(author_id)),
        parent_id: Set(parent_id),
        content: Set(content.to_string()),
        attachment: Set(None),
        views: Set(0),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_test_student(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
) -> Result<students::Model, DbErr> {
    students::ActiveModel {
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_test_subject(db: &DatabaseConnection, name: &str) -> Result<subjects::Model, DbErr> {
    subjects::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}
