//! Threads and their side tables: edit history, tags, subscriptions and saves.

use crate::error::StoreError;
use crate::form::{validate_form, FormData, FormErrors};
use crate::orm::threads::ThreadStatus;
use crate::orm::{
    categories, saved_threads, tags, thread_edit_history, thread_subscriptions, thread_tags,
    threads,
};
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, Statement,
};
use validator::Validate;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Thread fields as submitted.
#[derive(Clone, Debug, Default, Validate)]
pub struct ThreadForm {
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub title: String,
    #[validate(custom = "crate::form::not_blank")]
    pub description: String,
    /// Category select value. Empty means no category.
    pub category: String,
    /// `None` keeps the current tags, `Some` replaces them.
    pub tags: Option<Vec<i32>>,
    /// Status select value. Empty means open on create and unchanged on update.
    pub status: String,
    /// Attachment reference. Empty means none on create and unchanged on update.
    pub attachment: String,
}

impl ThreadForm {
    /// Reads the HTML form. The tag list is always a replacement, so a form
    /// without tags clears them.
    pub fn from_data(data: &FormData) -> Self {
        Self {
            title: data.text("title"),
            description: data.text("description"),
            category: data.text("category"),
            tags: Some(crate::form::parse_id_list(&data.get_all("tags"))),
            status: data.text("status"),
            attachment: data.text("attachment"),
        }
    }

    pub fn from_model(thread: &threads::Model, tag_ids: Vec<i32>) -> Self {
        Self {
            title: thread.title.to_owned(),
            description: thread.description.to_owned(),
            category: thread
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            tags: Some(tag_ids),
            status: thread.status.as_str().to_owned(),
            attachment: thread.attachment.to_owned().unwrap_or_default(),
        }
    }

    pub fn category_id(&self) -> Option<i32> {
        self.category.parse().ok()
    }

    pub fn has_tag(&self, tag_id: &i32) -> bool {
        self.tags
            .as_ref()
            .map(|tags| tags.contains(tag_id))
            .unwrap_or(false)
    }
}

struct CleanThread {
    title: String,
    description: String,
    category_id: Option<i32>,
    status: Option<ThreadStatus>,
    attachment: Option<String>,
    tags: Option<Vec<i32>>,
}

/// Rejects content longer than the configured limit.
pub fn check_content_length(errors: &mut FormErrors, field: &str, value: &str) {
    let max = crate::app_config::limits().max_content_length as usize;
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this value has at most {} characters.", max),
        );
    }
}

async fn clean_thread<C>(db: &C, form: &ThreadForm) -> Result<CleanThread, StoreError>
where
    C: ConnectionTrait,
{
    let mut errors = match validate_form(form) {
        Ok(()) => FormErrors::new(),
        Err(errors) => errors,
    };
    check_content_length(&mut errors, "description", &form.description);

    let category_id = match crate::form::parse_optional_id(&form.category) {
        Ok(None) => None,
        Ok(Some(id)) => {
            if categories::Entity::find_by_id(id).one(db).await?.is_none() {
                errors.add("category", INVALID_CHOICE);
            }
            Some(id)
        }
        Err(()) => {
            errors.add("category", INVALID_CHOICE);
            None
        }
    };

    let status = if form.status.is_empty() {
        None
    } else {
        match ThreadStatus::parse(&form.status) {
            Some(status) => Some(status),
            None => {
                errors.add("status", INVALID_CHOICE);
                None
            }
        }
    };

    if let Some(tag_ids) = &form.tags {
        if !tag_ids.is_empty() {
            let found = tags::Entity::find()
                .filter(tags::Column::Id.is_in(tag_ids.clone()))
                .count(db)
                .await?;
            if found != tag_ids.len() {
                errors.add("tags", INVALID_CHOICE);
            }
        }
    }

    errors.into_result()?;

    let attachment = if form.attachment.is_empty() {
        None
    } else {
        Some(form.attachment.to_owned())
    };

    Ok(CleanThread {
        title: form.title.to_owned(),
        description: form.description.to_owned(),
        category_id,
        status,
        attachment,
        tags: form.tags.clone(),
    })
}

/// Swaps the thread's tag set for `tag_ids`.
async fn replace_tags(
    txn: &DatabaseTransaction,
    thread_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    thread_tags::Entity::delete_many()
        .filter(thread_tags::Column::ThreadId.eq(thread_id))
        .exec(txn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    thread_tags::Entity::insert_many(tag_ids.iter().map(|tag_id| thread_tags::ActiveModel {
        thread_id: Set(thread_id),
        tag_id: Set(*tag_id),
    }))
    .exec(txn)
    .await?;

    Ok(())
}

pub async fn create_thread(
    db: &DatabaseConnection,
    author_id: i32,
    form: &ThreadForm,
) -> Result<threads::Model, StoreError> {
    let clean = clean_thread(db, form).await?;
    let now = chrono::Utc::now().naive_utc();

    let txn = db.begin().await?;
    let thread = threads::ActiveModel {
        title: Set(clean.title),
        description: Set(clean.description),
        attachment: Set(clean.attachment),
        author_id: Set(Some(author_id)),
        category_id: Set(clean.category_id),
        views: Set(0),
        is_deleted: Set(false),
        status: Set(clean.status.unwrap_or_default()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(tag_ids) = &clean.tags {
        replace_tags(&txn, thread.id, tag_ids).await?;
    }
    txn.commit().await?;

    log::info!("user {} created thread {}", author_id, thread.id);
    Ok(thread)
}

/// Applies an edit and records the description change in the edit history.
///
/// Category is cleared when absent; status and attachment are kept.
pub async fn update_thread(
    db: &DatabaseConnection,
    thread_id: i32,
    editor_id: i32,
    form: &ThreadForm,
) -> Result<threads::Model, StoreError> {
    let thread = get_thread(db, thread_id).await?;
    let clean = clean_thread(db, form).await?;
    let now = chrono::Utc::now().naive_utc();

    let txn = db.begin().await?;
    thread_edit_history::ActiveModel {
        user_id: Set(Some(editor_id)),
        thread_id: Set(thread.id),
        old_content: Set(thread.description.to_owned()),
        new_content: Set(clean.description.to_owned()),
        edited_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut active = thread.into_active_model();
    active.title = Set(clean.title);
    active.description = Set(clean.description);
    active.category_id = Set(clean.category_id);
    if let Some(status) = clean.status {
        active.status = Set(status);
    }
    if let Some(attachment) = clean.attachment {
        active.attachment = Set(Some(attachment));
    }
    active.updated_at = Set(now);
    let thread = active.update(&txn).await?;

    if let Some(tag_ids) = &clean.tags {
        replace_tags(&txn, thread.id, tag_ids).await?;
    }
    txn.commit().await?;

    log::info!("user {} edited thread {}", editor_id, thread.id);
    Ok(thread)
}

/// Returns a thread by id, deleted or not.
pub async fn get_thread<C>(db: &C, id: i32) -> Result<threads::Model, StoreError>
where
    C: ConnectionTrait,
{
    threads::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Thread"))
}

/// Returns a thread that has not been deleted.
pub async fn get_visible_thread<C>(db: &C, id: i32) -> Result<threads::Model, StoreError>
where
    C: ConnectionTrait,
{
    match get_thread(db, id).await? {
        thread if thread.is_deleted => Err(StoreError::NotFound("Thread")),
        thread => Ok(thread),
    }
}

/// Soft delete. The row stays and is hidden from listings.
pub async fn delete_thread<C>(db: &C, id: i32) -> Result<threads::Model, StoreError>
where
    C: ConnectionTrait,
{
    let thread = get_thread(db, id).await?;
    let mut active = thread.into_active_model();
    active.is_deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let thread = active.update(db).await?;

    log::info!("thread {} marked deleted", id);
    Ok(thread)
}

/// Counts one view.
pub async fn increment_views<C>(db: &C, id: i32) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    threads::Entity::update_many()
        .col_expr(
            threads::Column::Views,
            Expr::col(threads::Column::Views).add(1),
        )
        .filter(threads::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Non-deleted threads, newest first.
pub async fn list_threads<C>(db: &C) -> Result<Vec<threads::Model>, DbErr>
where
    C: ConnectionTrait,
{
    threads::Entity::find()
        .filter(threads::Column::IsDeleted.eq(false))
        .order_by_desc(threads::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn get_thread_tags<C>(db: &C, thread_id: i32) -> Result<Vec<tags::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let tag_ids: Vec<i32> = thread_tags::Entity::find()
        .filter(thread_tags::Column::ThreadId.eq(thread_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.tag_id)
        .collect();

    crate::taxonomy::find_tags(db, &tag_ids).await
}

/// Edits of a thread, newest first.
pub async fn get_thread_history<C>(
    db: &C,
    thread_id: i32,
) -> Result<Vec<thread_edit_history::Model>, DbErr>
where
    C: ConnectionTrait,
{
    thread_edit_history::Entity::find()
        .filter(thread_edit_history::Column::ThreadId.eq(thread_id))
        .order_by_desc(thread_edit_history::Column::EditedAt)
        .order_by_desc(thread_edit_history::Column::Id)
        .all(db)
        .await
}

/// Subscribes the user. Subscribing twice keeps one row.
pub async fn subscribe<C>(
    db: &C,
    user_id: i32,
    thread_id: i32,
) -> Result<thread_subscriptions::Model, StoreError>
where
    C: ConnectionTrait,
{
    get_visible_thread(db, thread_id).await?;

    // A concurrent subscribe may win the insert; the unique pair keeps one row.
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO thread_subscriptions (user_id, thread_id, subscribed_at) \
         VALUES ($1, $2, $3) ON CONFLICT (user_id, thread_id) DO NOTHING",
        vec![
            user_id.into(),
            thread_id.into(),
            chrono::Utc::now().naive_utc().into(),
        ],
    ))
    .await?;

    find_subscription(db, user_id, thread_id)
        .await?
        .ok_or(StoreError::NotFound("Subscription"))
}

/// Removes the subscription if there is one.
pub async fn unsubscribe<C>(db: &C, user_id: i32, thread_id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    get_thread(db, thread_id).await?;

    thread_subscriptions::Entity::delete_many()
        .filter(thread_subscriptions::Column::UserId.eq(user_id))
        .filter(thread_subscriptions::Column::ThreadId.eq(thread_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn find_subscription<C>(
    db: &C,
    user_id: i32,
    thread_id: i32,
) -> Result<Option<thread_subscriptions::Model>, DbErr>
where
    C: ConnectionTrait,
{
    thread_subscriptions::Entity::find()
        .filter(thread_subscriptions::Column::UserId.eq(user_id))
        .filter(thread_subscriptions::Column::ThreadId.eq(thread_id))
        .one(db)
        .await
}

pub async fn is_subscribed<C>(db: &C, user_id: i32, thread_id: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    Ok(find_subscription(db, user_id, thread_id).await?.is_some())
}

/// Saves the thread for the user. Saving twice keeps one row.
pub async fn save<C>(db: &C, user_id: i32, thread_id: i32) -> Result<saved_threads::Model, StoreError>
where
    C: ConnectionTrait,
{
    get_visible_thread(db, thread_id).await?;

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO saved_threads (user_id, thread_id, saved_at) \
         VALUES ($1, $2, $3) ON CONFLICT (user_id, thread_id) DO NOTHING",
        vec![
            user_id.into(),
            thread_id.into(),
            chrono::Utc::now().naive_utc().into(),
        ],
    ))
    .await?;

    find_saved(db, user_id, thread_id)
        .await?
        .ok_or(StoreError::NotFound("Saved thread"))
}

/// Removes the save if there is one.
pub async fn unsave<C>(db: &C, user_id: i32, thread_id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    get_thread(db, thread_id).await?;

    saved_threads::Entity::delete_many()
        .filter(saved_threads::Column::UserId.eq(user_id))
        .filter(saved_threads::Column::ThreadId.eq(thread_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn find_saved<C>(
    db: &C,
    user_id: i32,
    thread_id: i32,
) -> Result<Option<saved_threads::Model>, DbErr>
where
    C: ConnectionTrait,
{
    saved_threads::Entity::find()
        .filter(saved_threads::Column::UserId.eq(user_id))
        .filter(saved_threads::Column::ThreadId.eq(thread_id))
        .one(db)
        .await
}

pub async fn is_saved<C>(db: &C, user_id: i32, thread_id: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    Ok(find_saved(db, user_id, thread_id).await?.is_some())
}
