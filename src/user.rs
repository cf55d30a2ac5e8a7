use crate::constants::{DELETED_USERNAME, GUEST_USERNAME};
use crate::error::StoreError;
use crate::form::{validate_form, FormData};
use crate::orm::{user_profiles, users};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use std::collections::HashMap;
use validator::Validate;

/// Staff and superusers may manage the gradebook and achievements.
pub fn is_admin(user: &users::Model) -> bool {
    user.is_superuser || user.is_staff
}

/// Returns an active user by id. Deactivated accounts read as absent.
pub async fn get_active_user<C>(db: &C, id: i32) -> Result<Option<users::Model>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(users::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|user| user.is_active))
}

/// Usernames for a set of ids, for rendering authors next to content.
pub async fn get_usernames<C>(db: &C, ids: &[i32]) -> Result<HashMap<i32, String>, DbErr>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    Ok(users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|user| (user.id, user.username))
        .collect())
}

/// Name to show for an author reference.
///
/// Authors are nulled when their account is removed.
pub fn display_name(names: &HashMap<i32, String>, author_id: Option<i32>) -> String {
    match author_id.and_then(|id| names.get(&id)) {
        Some(name) => name.to_owned(),
        None => DELETED_USERNAME.to_owned(),
    }
}

/// Name for the current visitor.
pub fn visitor_name(user: Option<&users::Model>) -> String {
    match user {
        Some(user) => user.username.to_owned(),
        None => GUEST_USERNAME.to_owned(),
    }
}

/// Submitted profile fields.
#[derive(Clone, Debug, Default, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 500, message = "Ensure this value has at most 500 characters."))]
    pub bio: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub location: String,
    #[validate(custom = "crate::form::optional_http_url")]
    pub website: String,
}

impl ProfileForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            bio: data.text("bio"),
            location: data.text("location"),
            website: data.text("website"),
        }
    }

    pub fn from_profile(profile: Option<&user_profiles::Model>) -> Self {
        match profile {
            Some(profile) => Self {
                bio: profile.bio.to_owned(),
                location: profile.location.to_owned(),
                website: profile.website.to_owned(),
            },
            None => Self::default(),
        }
    }
}

/// Active accounts by username, for award forms.
pub async fn list_users<C>(db: &C) -> Result<Vec<users::Model>, DbErr>
where
    C: ConnectionTrait,
{
    users::Entity::find()
        .filter(users::Column::IsActive.eq(true))
        .order_by_asc(users::Column::Username)
        .all(db)
        .await
}

pub async fn get_profile<C>(db: &C, user_id: i32) -> Result<Option<user_profiles::Model>, DbErr>
where
    C: ConnectionTrait,
{
    user_profiles::Entity::find()
        .filter(user_profiles::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Saves a user's profile, creating the row on first edit.
pub async fn update_profile<C>(
    db: &C,
    user_id: i32,
    form: &ProfileForm,
) -> Result<user_profiles::Model, StoreError>
where
    C: ConnectionTrait,
{
    validate_form(form)?;

    let now = chrono::Utc::now().naive_utc();
    let profile = match get_profile(db, user_id).await? {
        Some(existing) => {
            let mut active = existing.into_active_model();
            active.bio = Set(form.bio.to_owned());
            active.location = Set(form.location.to_owned());
            active.website = Set(form.website.to_owned());
            active.updated_at = Set(now);
            active.update(db).await?
        }
        None => {
            user_profiles::ActiveModel {
                user_id: Set(user_id),
                bio: Set(form.bio.to_owned()),
                location: Set(form.location.to_owned()),
                website: Set(form.website.to_owned()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    log::info!("user {} updated their profile", user_id);
    Ok(profile)
}
