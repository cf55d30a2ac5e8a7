//! Achievement catalogue and awards.

use crate::error::StoreError;
use crate::form::{validate_form, FormData, FormErrors};
use crate::orm::{achievements, user_achievements, users};
use crate::taxonomy::{ensure_unique_name, NamedTable};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, Statement};
use validator::Validate;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Clone, Debug, Default, Validate)]
pub struct AchievementForm {
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub points: i64,
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub criteria: String,
    /// Raw points input, kept for re-rendering.
    pub points_raw: String,
}

impl AchievementForm {
    pub fn from_data(data: &FormData) -> Self {
        let points_raw = data.text("points");
        Self {
            name: data.text("name"),
            description: data.text("description"),
            points: points_raw.parse().unwrap_or(0),
            criteria: data.text("criteria"),
            points_raw,
        }
    }

    pub fn from_model(achievement: &achievements::Model) -> Self {
        Self {
            name: achievement.name.to_owned(),
            description: achievement.description.to_owned(),
            points: achievement.points as i64,
            criteria: achievement.criteria.to_owned(),
            points_raw: achievement.points.to_string(),
        }
    }

    fn check(&self) -> FormErrors {
        let mut errors = match validate_form(self) {
            Ok(()) => FormErrors::new(),
            Err(errors) => errors,
        };
        if !self.points_raw.is_empty() && self.points_raw.parse::<i32>().is_err() {
            errors.add("points", "Enter a whole number.");
        }
        errors
    }
}

pub async fn list_achievements<C>(db: &C) -> Result<Vec<achievements::Model>, DbErr>
where
    C: ConnectionTrait,
{
    achievements::Entity::find()
        .order_by_asc(achievements::Column::Name)
        .all(db)
        .await
}

pub async fn get_achievement<C>(db: &C, id: i32) -> Result<achievements::Model, StoreError>
where
    C: ConnectionTrait,
{
    achievements::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Achievement"))
}

pub async fn create_achievement<C>(
    db: &C,
    form: &AchievementForm,
) -> Result<achievements::Model, StoreError>
where
    C: ConnectionTrait,
{
    form.check().into_result()?;
    ensure_unique_name(db, NamedTable::Achievements, &form.name, None).await?;

    let achievement = achievements::ActiveModel {
        name: Set(form.name.to_owned()),
        description: Set(form.description.to_owned()),
        points: Set(form.points as i32),
        criteria: Set(form.criteria.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| NamedTable::Achievements.conflict(err))?;

    log::info!("created achievement {} ({})", achievement.id, achievement.name);
    Ok(achievement)
}

pub async fn update_achievement<C>(
    db: &C,
    id: i32,
    form: &AchievementForm,
) -> Result<achievements::Model, StoreError>
where
    C: ConnectionTrait,
{
    let achievement = get_achievement(db, id).await?;
    form.check().into_result()?;
    ensure_unique_name(db, NamedTable::Achievements, &form.name, Some(id)).await?;

    let mut active = achievement.into_active_model();
    active.name = Set(form.name.to_owned());
    active.description = Set(form.description.to_owned());
    active.points = Set(form.points as i32);
    active.criteria = Set(form.criteria.to_owned());
    active
        .update(db)
        .await
        .map_err(|err| NamedTable::Achievements.conflict(err))
}

/// Award form as submitted.
#[derive(Clone, Debug, Default)]
pub struct AwardForm {
    pub user: String,
    pub achievement: String,
}

impl AwardForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            user: data.text("user"),
            achievement: data.text("achievement"),
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        self.user.parse().ok()
    }

    pub fn achievement_id(&self) -> Option<i32> {
        self.achievement.parse().ok()
    }
}

/// Grants an achievement. Awarding it twice keeps the first award.
pub async fn award<C>(db: &C, form: &AwardForm) -> Result<user_achievements::Model, StoreError>
where
    C: ConnectionTrait,
{
    let mut errors = FormErrors::new();

    let user = match form.user_id() {
        Some(id) => users::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    if user.is_none() {
        errors.add("user", INVALID_CHOICE);
    }

    let achievement = match form.achievement_id() {
        Some(id) => achievements::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    if achievement.is_none() {
        errors.add("achievement", INVALID_CHOICE);
    }

    let (user, achievement) = match (user, achievement) {
        (Some(user), Some(achievement)) => (user, achievement),
        _ => return Err(StoreError::Invalid(errors)),
    };

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO user_achievements (user_id, achievement_id, earned_at) \
         VALUES ($1, $2, $3) ON CONFLICT (user_id, achievement_id) DO NOTHING",
        vec![
            user.id.into(),
            achievement.id.into(),
            chrono::Utc::now().naive_utc().into(),
        ],
    ))
    .await?;

    let earned = user_achievements::Entity::find()
        .filter(user_achievements::Column::UserId.eq(user.id))
        .filter(user_achievements::Column::AchievementId.eq(achievement.id))
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Award"))?;

    log::info!("awarded achievement {} to user {}", achievement.id, user.id);
    Ok(earned)
}

/// An achievement together with when the user earned it.
#[derive(Clone, Debug)]
pub struct EarnedAchievement {
    pub achievement: achievements::Model,
    pub earned_at: chrono::NaiveDateTime,
}

/// Achievements a user holds, most recent first.
pub async fn get_user_achievements<C>(db: &C, user_id: i32) -> Result<Vec<EarnedAchievement>, DbErr>
where
    C: ConnectionTrait,
{
    let earned = user_achievements::Entity::find()
        .filter(user_achievements::Column::UserId.eq(user_id))
        .order_by_desc(user_achievements::Column::EarnedAt)
        .find_also_related(achievements::Entity)
        .all(db)
        .await?;

    Ok(earned
        .into_iter()
        .filter_map(|(award, achievement)| {
            achievement.map(|achievement| EarnedAchievement {
                achievement,
                earned_at: award.earned_at,
            })
        })
        .collect())
}

/// Sum of points over a user's achievements.
pub fn total_points(earned: &[EarnedAchievement]) -> i64 {
    earned
        .iter()
        .map(|earned| earned.achievement.points as i64)
        .sum()
}
