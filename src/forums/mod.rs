//! Forums group threads through the categories attached to them.

use crate::error::StoreError;
use crate::form::{validate_form, FormData, FormErrors};
use crate::orm::{categories, forum_categories, forum_tags, forums, tags, threads};
use crate::taxonomy::{ensure_unique_name, NamedTable};
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr};
use validator::Validate;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Clone, Debug, Default, Validate)]
pub struct ForumForm {
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub name: String,
    pub description: String,
    pub categories: Vec<i32>,
    pub tags: Vec<i32>,
}

impl ForumForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            name: data.text("name"),
            description: data.text("description"),
            categories: crate::form::parse_id_list(&data.get_all("categories")),
            tags: crate::form::parse_id_list(&data.get_all("tags")),
        }
    }

    pub fn from_forum(forum: &ForumDetail) -> Self {
        Self {
            name: forum.forum.name.to_owned(),
            description: forum.forum.description.to_owned(),
            categories: forum.categories.iter().map(|c| c.id).collect(),
            tags: forum.tags.iter().map(|t| t.id).collect(),
        }
    }

    pub fn has_category(&self, id: &i32) -> bool {
        self.categories.contains(id)
    }

    pub fn has_tag(&self, id: &i32) -> bool {
        self.tags.contains(id)
    }
}

/// A forum with its labels.
#[derive(Clone, Debug)]
pub struct ForumDetail {
    pub forum: forums::Model,
    pub categories: Vec<categories::Model>,
    pub tags: Vec<tags::Model>,
}

async fn clean_forum<C>(db: &C, form: &ForumForm, exclude_id: Option<i32>) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    let mut errors = match validate_form(form) {
        Ok(()) => FormErrors::new(),
        Err(errors) => errors,
    };

    if !form.categories.is_empty()
        && crate::taxonomy::find_categories(db, &form.categories).await?.len()
            != form.categories.len()
    {
        errors.add("categories", INVALID_CHOICE);
    }
    if !form.tags.is_empty()
        && crate::taxonomy::find_tags(db, &form.tags).await?.len() != form.tags.len()
    {
        errors.add("tags", INVALID_CHOICE);
    }

    errors.into_result()?;
    ensure_unique_name(db, NamedTable::Forums, &form.name, exclude_id).await
}

/// Swaps the forum's category and tag sets.
async fn replace_labels(
    txn: &DatabaseTransaction,
    forum_id: i32,
    form: &ForumForm,
) -> Result<(), DbErr> {
    forum_categories::Entity::delete_many()
        .filter(forum_categories::Column::ForumId.eq(forum_id))
        .exec(txn)
        .await?;
    forum_tags::Entity::delete_many()
        .filter(forum_tags::Column::ForumId.eq(forum_id))
        .exec(txn)
        .await?;

    if !form.categories.is_empty() {
        forum_categories::Entity::insert_many(form.categories.iter().map(|category_id| {
            forum_categories::ActiveModel {
                forum_id: Set(forum_id),
                category_id: Set(*category_id),
            }
        }))
        .exec(txn)
        .await?;
    }
    if !form.tags.is_empty() {
        forum_tags::Entity::insert_many(form.tags.iter().map(|tag_id| forum_tags::ActiveModel {
            forum_id: Set(forum_id),
            tag_id: Set(*tag_id),
        }))
        .exec(txn)
        .await?;
    }

    Ok(())
}

pub async fn create_forum(
    db: &DatabaseConnection,
    author_id: i32,
    form: &ForumForm,
) -> Result<forums::Model, StoreError> {
    clean_forum(db, form, None).await?;

    let txn = db.begin().await?;
    let forum = forums::ActiveModel {
        author_id: Set(Some(author_id)),
        name: Set(form.name.to_owned()),
        description: Set(form.description.to_owned()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|err| NamedTable::Forums.conflict(err))?;
    replace_labels(&txn, forum.id, form).await?;
    txn.commit().await?;

    log::info!("user {} created forum {} ({})", author_id, forum.id, forum.name);
    Ok(forum)
}

pub async fn update_forum(
    db: &DatabaseConnection,
    id: i32,
    form: &ForumForm,
) -> Result<forums::Model, StoreError> {
    let forum = get_forum(db, id).await?;
    clean_forum(db, form, Some(id)).await?;

    let txn = db.begin().await?;
    let mut active = forum.into_active_model();
    active.name = Set(form.name.to_owned());
    active.description = Set(form.description.to_owned());
    let forum = active
        .update(&txn)
        .await
        .map_err(|err| NamedTable::Forums.conflict(err))?;
    replace_labels(&txn, forum.id, form).await?;
    txn.commit().await?;

    Ok(forum)
}

pub async fn delete_forum<C>(db: &C, id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    let forum = get_forum(db, id).await?;
    forums::Entity::delete_by_id(forum.id).exec(db).await?;
    log::info!("deleted forum {}", id);
    Ok(())
}

pub async fn get_forum<C>(db: &C, id: i32) -> Result<forums::Model, StoreError>
where
    C: ConnectionTrait,
{
    forums::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Forum"))
}

pub async fn list_forums<C>(db: &C) -> Result<Vec<forums::Model>, DbErr>
where
    C: ConnectionTrait,
{
    forums::Entity::find()
        .order_by_asc(forums::Column::Name)
        .all(db)
        .await
}

pub async fn get_forum_category_ids<C>(db: &C, forum_id: i32) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(forum_categories::Entity::find()
        .filter(forum_categories::Column::ForumId.eq(forum_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.category_id)
        .collect())
}

pub async fn get_forum_detail<C>(db: &C, id: i32) -> Result<ForumDetail, StoreError>
where
    C: ConnectionTrait,
{
    let forum = get_forum(db, id).await?;
    let category_ids = get_forum_category_ids(db, forum.id).await?;
    let tag_ids: Vec<i32> = forum_tags::Entity::find()
        .filter(forum_tags::Column::ForumId.eq(forum.id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.tag_id)
        .collect();

    Ok(ForumDetail {
        categories: crate::taxonomy::find_categories(db, &category_ids).await?,
        tags: crate::taxonomy::find_tags(db, &tag_ids).await?,
        forum,
    })
}

/// Non-deleted threads filed under one of the forum's categories, newest first.
pub async fn get_forum_threads<C>(db: &C, forum_id: i32) -> Result<Vec<threads::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let category_ids = get_forum_category_ids(db, forum_id).await?;
    if category_ids.is_empty() {
        return Ok(Vec::new());
    }

    threads::Entity::find()
        .filter(threads::Column::IsDeleted.eq(false))
        .filter(threads::Column::CategoryId.is_in(category_ids))
        .order_by_desc(threads::Column::CreatedAt)
        .all(db)
        .await
}
