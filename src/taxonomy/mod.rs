//! Categories and tags: flat labels attached to forums and threads.

use crate::error::{is_unique_violation, StoreError};
use crate::form::{validate_form, FormData};
use crate::orm::{categories, tags};
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DbBackend, DbErr, FromQueryResult, Statement,
};
use validator::Validate;

/// Tables whose `name` column is unique regardless of case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamedTable {
    Categories,
    Tags,
    Forums,
    Achievements,
}

impl NamedTable {
    fn table(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Tags => "tags",
            Self::Forums => "forums",
            Self::Achievements => "achievements",
        }
    }

    /// Message shown when a name collides.
    pub fn duplicate_message(&self) -> &'static str {
        match self {
            Self::Categories => "Category with this Name already exists.",
            Self::Tags => "Tag with this Name already exists.",
            Self::Forums => "Forum with this Name already exists.",
            Self::Achievements => "Achievement with this Name already exists.",
        }
    }
}

impl NamedTable {
    /// Maps a unique violation from a racing write to the duplicate-name
    /// field error. Other database errors pass through.
    pub fn conflict(&self, err: DbErr) -> StoreError {
        if is_unique_violation(&err) {
            StoreError::invalid("name", self.duplicate_message())
        } else {
            StoreError::Db(err)
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountResult {
    count: i64,
}

/// True when another row of `table` already uses `name`, ignoring case.
///
/// `exclude_id` is the row being updated, so it may keep its own name.
pub async fn name_taken<C>(
    db: &C,
    table: NamedTable,
    name: &str,
    exclude_id: Option<i32>,
) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let sql = format!(
        "SELECT COUNT(*) AS count FROM {} WHERE LOWER(name) = LOWER($1) AND id <> $2",
        table.table()
    );
    let backend: DbBackend = db.get_database_backend();
    let result = CountResult::find_by_statement(Statement::from_sql_and_values(
        backend,
        &sql,
        vec![name.into(), exclude_id.unwrap_or(0).into()],
    ))
    .one(db)
    .await?;

    Ok(result.map(|r| r.count > 0).unwrap_or(false))
}

/// Fails with a `name` field error when the name is already used.
pub async fn ensure_unique_name<C>(
    db: &C,
    table: NamedTable,
    name: &str,
    exclude_id: Option<i32>,
) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    if name_taken(db, table, name, exclude_id).await? {
        return Err(StoreError::invalid("name", table.duplicate_message()));
    }
    Ok(())
}

#[derive(Clone, Debug, Default, Validate)]
pub struct CategoryForm {
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub name: String,
    pub description: String,
}

impl CategoryForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            name: data.text("name"),
            description: data.text("description"),
        }
    }

    pub fn from_model(category: &categories::Model) -> Self {
        Self {
            name: category.name.to_owned(),
            description: category.description.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, Validate)]
pub struct TagForm {
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 50, message = "Ensure this value has at most 50 characters.")
    )]
    pub name: String,
}

impl TagForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            name: data.text("name"),
        }
    }

    pub fn from_model(tag: &tags::Model) -> Self {
        Self {
            name: tag.name.to_owned(),
        }
    }
}

pub async fn list_categories<C>(db: &C) -> Result<Vec<categories::Model>, DbErr>
where
    C: ConnectionTrait,
{
    categories::Entity::find()
        .order_by_asc(categories::Column::Name)
        .all(db)
        .await
}

pub async fn get_category<C>(db: &C, id: i32) -> Result<categories::Model, StoreError>
where
    C: ConnectionTrait,
{
    categories::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Category"))
}

pub async fn create_category<C>(db: &C, form: &CategoryForm) -> Result<categories::Model, StoreError>
where
    C: ConnectionTrait,
{
    validate_form(form)?;
    ensure_unique_name(db, NamedTable::Categories, &form.name, None).await?;

    let category = categories::ActiveModel {
        name: Set(form.name.to_owned()),
        description: Set(form.description.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| NamedTable::Categories.conflict(err))?;

    log::info!("created category {} ({})", category.id, category.name);
    Ok(category)
}

pub async fn update_category<C>(
    db: &C,
    id: i32,
    form: &CategoryForm,
) -> Result<categories::Model, StoreError>
where
    C: ConnectionTrait,
{
    let category = get_category(db, id).await?;
    validate_form(form)?;
    ensure_unique_name(db, NamedTable::Categories, &form.name, Some(id)).await?;

    let mut active = category.into_active_model();
    active.name = Set(form.name.to_owned());
    active.description = Set(form.description.to_owned());
    active
        .update(db)
        .await
        .map_err(|err| NamedTable::Categories.conflict(err))
}

/// Threads in the category keep existing with no category.
pub async fn delete_category<C>(db: &C, id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    let category = get_category(db, id).await?;
    categories::Entity::delete_by_id(category.id).exec(db).await?;
    log::info!("deleted category {}", id);
    Ok(())
}

pub async fn list_tags<C>(db: &C) -> Result<Vec<tags::Model>, DbErr>
where
    C: ConnectionTrait,
{
    tags::Entity::find()
        .order_by_asc(tags::Column::Name)
        .all(db)
        .await
}

pub async fn get_tag<C>(db: &C, id: i32) -> Result<tags::Model, StoreError>
where
    C: ConnectionTrait,
{
    tags::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Tag"))
}

/// Tags matching `ids`. Unknown ids are dropped.
pub async fn find_tags<C>(db: &C, ids: &[i32]) -> Result<Vec<tags::Model>, DbErr>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    tags::Entity::find()
        .filter(tags::Column::Id.is_in(ids.to_vec()))
        .order_by_asc(tags::Column::Name)
        .all(db)
        .await
}

/// Categories matching `ids`. Unknown ids are dropped.
pub async fn find_categories<C>(db: &C, ids: &[i32]) -> Result<Vec<categories::Model>, DbErr>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    categories::Entity::find()
        .filter(categories::Column::Id.is_in(ids.to_vec()))
        .order_by_asc(categories::Column::Name)
        .all(db)
        .await
}

pub async fn create_tag<C>(db: &C, form: &TagForm) -> Result<tags::Model, StoreError>
where
    C: ConnectionTrait,
{
    validate_form(form)?;
    ensure_unique_name(db, NamedTable::Tags, &form.name, None).await?;

    let tag = tags::ActiveModel {
        name: Set(form.name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| NamedTable::Tags.conflict(err))?;

    log::info!("created tag {} ({})", tag.id, tag.name);
    Ok(tag)
}

pub async fn update_tag<C>(db: &C, id: i32, form: &TagForm) -> Result<tags::Model, StoreError>
where
    C: ConnectionTrait,
{
    let tag = get_tag(db, id).await?;
    validate_form(form)?;
    ensure_unique_name(db, NamedTable::Tags, &form.name, Some(id)).await?;

    let mut active = tag.into_active_model();
    active.name = Set(form.name.to_owned());
    active
        .update(db)
        .await
        .map_err(|err| NamedTable::Tags.conflict(err))
}

pub async fn delete_tag<C>(db: &C, id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    let tag = get_tag(db, id).await?;
    tags::Entity::delete_by_id(tag.id).exec(db).await?;
    log::info!("deleted tag {}", id);
    Ok(())
}
