//! Comments on threads and polls, their edit history and reply trees.

pub mod tree;

pub use tree::{build_reply_tree, ThreadedComment};

use crate::error::StoreError;
use crate::form::{validate_form, FormData, FormErrors, NON_FIELD_ERRORS};
use crate::orm::{comment_edit_history, comments, polls};
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr};
use validator::Validate;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Comment fields as submitted.
#[derive(Clone, Debug, Default, Validate)]
pub struct CommentForm {
    #[validate(custom = "crate::form::not_blank")]
    pub content: String,
    /// Thread select value, may be empty when a poll is given.
    pub thread: String,
    /// Poll select value, may be empty when a thread is given.
    pub poll: String,
    /// Parent comment id for replies.
    pub parent: String,
    pub attachment: String,
}

impl CommentForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            content: data.text("content"),
            thread: data.text("thread"),
            poll: data.text("poll"),
            parent: data.text("parent"),
            attachment: data.text("attachment"),
        }
    }

    /// A comment on `thread_id`, optionally replying to `parent_id`.
    pub fn for_thread(data: &FormData, thread_id: i32, parent_id: Option<i32>) -> Self {
        Self {
            thread: thread_id.to_string(),
            parent: parent_id.map(|id| id.to_string()).unwrap_or_default(),
            ..Self::from_data(data)
        }
    }
}

struct CleanComment {
    content: String,
    thread_id: Option<i32>,
    poll_id: Option<i32>,
    parent_id: Option<i32>,
    attachment: Option<String>,
}

/// Parses a select value into an id, recording an error for junk input.
fn parse_choice(raw: &str, errors: &mut FormErrors, field: &str) -> Option<i32> {
    match crate::form::parse_optional_id(raw) {
        Ok(id) => id,
        Err(()) => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

async fn clean_comment<C>(db: &C, form: &CommentForm) -> Result<CleanComment, StoreError>
where
    C: ConnectionTrait,
{
    let mut errors = match validate_form(form) {
        Ok(()) => FormErrors::new(),
        Err(errors) => errors,
    };
    crate::threads::check_content_length(&mut errors, "content", &form.content);

    let thread_id = parse_choice(&form.thread, &mut errors, "thread");
    let poll_id = parse_choice(&form.poll, &mut errors, "poll");
    let parent_id = parse_choice(&form.parent, &mut errors, "parent");

    if thread_id.is_none() && poll_id.is_none() && !errors.has("thread") && !errors.has("poll") {
        errors.add(NON_FIELD_ERRORS, "A comment must belong to a thread or a poll.");
    }

    if let Some(thread_id) = thread_id {
        match crate::threads::get_visible_thread(db, thread_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => errors.add("thread", INVALID_CHOICE),
            Err(err) => return Err(err),
        }
    }
    if let Some(poll_id) = poll_id {
        if polls::Entity::find_by_id(poll_id).one(db).await?.is_none() {
            errors.add("poll", INVALID_CHOICE);
        }
    }
    if let Some(parent_id) = parent_id {
        // A reply stays on its parent's thread or poll.
        let parent = comments::Entity::find_by_id(parent_id).one(db).await?;
        if !parent.map_or(false, |p| p.thread_id == thread_id && p.poll_id == poll_id) {
            errors.add("parent", INVALID_CHOICE);
        }
    }

    errors.into_result()?;

    Ok(CleanComment {
        content: form.content.to_owned(),
        thread_id,
        poll_id,
        parent_id,
        attachment: Some(form.attachment.to_owned()).filter(|a| !a.is_empty()),
    })
}

pub async fn create_comment<C>(
    db: &C,
    author_id: i32,
    form: &CommentForm,
) -> Result<comments::Model, StoreError>
where
    C: ConnectionTrait,
{
    let clean = clean_comment(db, form).await?;
    let now = chrono::Utc::now().naive_utc();

    let comment = comments::ActiveModel {
        thread_id: Set(clean.thread_id),
        poll_id: Set(clean.poll_id),
        author_id: Set(Some(author_id)),
        parent_id: Set(clean.parent_id),
        content: Set(clean.content),
        attachment: Set(clean.attachment),
        views: Set(0),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("user {} created comment {}", author_id, comment.id);
    Ok(comment)
}

/// Replaces a comment's content, recording the previous content first.
pub async fn update_comment(
    db: &DatabaseConnection,
    comment_id: i32,
    editor_id: i32,
    content: &str,
) -> Result<comments::Model, StoreError> {
    let comment = get_comment(db, comment_id).await?;

    let content = content.trim();
    let mut errors = FormErrors::new();
    if content.is_empty() {
        errors.add("content", "This field is required.");
    }
    crate::threads::check_content_length(&mut errors, "content", content);
    errors.into_result()?;

    let now = chrono::Utc::now().naive_utc();
    let txn = db.begin().await?;
    comment_edit_history::ActiveModel {
        user_id: Set(Some(editor_id)),
        comment_id: Set(comment.id),
        old_content: Set(comment.content.to_owned()),
        new_content: Set(content.to_owned()),
        edited_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut active = comment.into_active_model();
    active.content = Set(content.to_owned());
    active.updated_at = Set(now);
    let comment = active.update(&txn).await?;
    txn.commit().await?;

    log::info!("user {} edited comment {}", editor_id, comment.id);
    Ok(comment)
}

/// Soft delete. Replies stay attached.
pub async fn delete_comment<C>(db: &C, comment_id: i32) -> Result<comments::Model, StoreError>
where
    C: ConnectionTrait,
{
    let comment = get_comment(db, comment_id).await?;
    let mut active = comment.into_active_model();
    active.is_deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let comment = active.update(db).await?;

    log::info!("comment {} marked deleted", comment_id);
    Ok(comment)
}

/// Returns a comment by id, deleted or not.
pub async fn get_comment<C>(db: &C, id: i32) -> Result<comments::Model, StoreError>
where
    C: ConnectionTrait,
{
    comments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Comment"))
}

pub async fn get_visible_comment<C>(db: &C, id: i32) -> Result<comments::Model, StoreError>
where
    C: ConnectionTrait,
{
    match get_comment(db, id).await? {
        comment if comment.is_deleted => Err(StoreError::NotFound("Comment")),
        comment => Ok(comment),
    }
}

/// Every comment on a thread, deleted ones included, oldest first.
pub async fn get_thread_comments<C>(db: &C, thread_id: i32) -> Result<Vec<comments::Model>, DbErr>
where
    C: ConnectionTrait,
{
    comments::Entity::find()
        .filter(comments::Column::ThreadId.eq(thread_id))
        .order_by_asc(comments::Column::CreatedAt)
        .order_by_asc(comments::Column::Id)
        .all(db)
        .await
}

/// Every comment on a poll, deleted ones included, oldest first.
pub async fn get_poll_comments<C>(db: &C, poll_id: i32) -> Result<Vec<comments::Model>, DbErr>
where
    C: ConnectionTrait,
{
    comments::Entity::find()
        .filter(comments::Column::PollId.eq(poll_id))
        .order_by_asc(comments::Column::CreatedAt)
        .order_by_asc(comments::Column::Id)
        .all(db)
        .await
}

/// Edits of a comment, newest first.
pub async fn get_comment_history<C>(
    db: &C,
    comment_id: i32,
) -> Result<Vec<comment_edit_history::Model>, DbErr>
where
    C: ConnectionTrait,
{
    comment_edit_history::Entity::find()
        .filter(comment_edit_history::Column::CommentId.eq(comment_id))
        .order_by_desc(comment_edit_history::Column::EditedAt)
        .order_by_desc(comment_edit_history::Column::Id)
        .all(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::from(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_for_thread_overrides_target() {
        let form = CommentForm::for_thread(
            &data(&[("content", " Nice "), ("thread", "9"), ("parent", "x")]),
            3,
            Some(12),
        );
        assert_eq!(form.content, "Nice");
        assert_eq!(form.thread, "3");
        assert_eq!(form.parent, "12");
        assert_eq!(form.poll, "");
    }

    #[test]
    fn test_parse_choice() {
        let mut errors = FormErrors::new();
        assert_eq!(parse_choice("", &mut errors, "poll"), None);
        assert_eq!(parse_choice("5", &mut errors, "poll"), Some(5));
        assert!(errors.is_empty());
        assert_eq!(parse_choice("five", &mut errors, "poll"), None);
        assert!(errors.has("poll"));
    }
}
