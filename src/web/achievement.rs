//! Staff pages for the achievement catalogue and awards.

use super::{read_form, RawForm};
use crate::achievements::{self, AchievementForm, AwardForm};
use crate::db::get_db_pool;
use crate::error::StoreError;
use crate::form::FormErrors;
use crate::middleware::ClientCtx;
use crate::orm::{achievements as achievement_entity, users};
use crate::template::{render_invalid, success};
use crate::user;
use actix_session::Session;
use actix_web::{get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(add_achievement_form)
        .service(add_achievement)
        .service(update_achievement_form)
        .service(update_achievement)
        .service(award_achievement_form)
        .service(award_achievement);
}

#[derive(Template)]
#[template(path = "achievement_form.html")]
pub struct AchievementFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    pub form: AchievementForm,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "award_form.html")]
pub struct AwardFormTemplate {
    pub client: ClientCtx,
    pub users: Vec<users::Model>,
    pub achievements: Vec<achievement_entity::Model>,
    pub form: AwardForm,
    pub errors: FormErrors,
}

impl AwardFormTemplate {
    async fn new(client: ClientCtx, form: AwardForm, errors: FormErrors) -> Result<Self, Error> {
        let db = get_db_pool();
        Ok(Self {
            client,
            users: user::list_users(db).await.map_err(StoreError::from)?,
            achievements: achievements::list_achievements(db)
                .await
                .map_err(StoreError::from)?,
            form,
            errors,
        })
    }

    pub fn is_user_selected(&self, id: &i32) -> bool {
        self.form.user_id() == Some(*id)
    }

    pub fn is_achievement_selected(&self, id: &i32) -> bool {
        self.form.achievement_id() == Some(*id)
    }
}

#[get("/add-achievement/")]
pub async fn add_achievement_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_admin()?;
    Ok(AchievementFormTemplate {
        client,
        heading: "Add achievement",
        action: "/add-achievement/".to_owned(),
        form: AchievementForm::default(),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/add-achievement/")]
pub async fn add_achievement(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let form = AchievementForm::from_data(&read_form(&session, form)?);

    match achievements::create_achievement(get_db_pool(), &form).await {
        Ok(_) => Ok(success(client, "Achievement added successfully!")),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&AchievementFormTemplate {
            client,
            heading: "Add achievement",
            action: "/add-achievement/".to_owned(),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/update-achievement/{id}/")]
pub async fn update_achievement_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_admin()?;
    let achievement = achievements::get_achievement(get_db_pool(), path.into_inner()).await?;

    Ok(AchievementFormTemplate {
        client,
        heading: "Update achievement",
        action: format!("/update-achievement/{}/", achievement.id),
        form: AchievementForm::from_model(&achievement),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/update-achievement/{id}/")]
pub async fn update_achievement(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let id = path.into_inner();
    let form = AchievementForm::from_data(&read_form(&session, form)?);

    match achievements::update_achievement(get_db_pool(), id, &form).await {
        Ok(_) => Ok(success(client, "Achievement updated successfully!")),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&AchievementFormTemplate {
            client,
            heading: "Update achievement",
            action: format!("/update-achievement/{}/", id),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/award-achievement/")]
pub async fn award_achievement_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_admin()?;
    let template = AwardFormTemplate::new(client, AwardForm::default(), FormErrors::new()).await?;
    Ok(template.to_response())
}

#[post("/award-achievement/")]
pub async fn award_achievement(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let form = AwardForm::from_data(&read_form(&session, form)?);

    match achievements::award(get_db_pool(), &form).await {
        Ok(_) => Ok(success(client, "Achievement awarded successfully!")),
        Err(StoreError::Invalid(errors)) => {
            let template = AwardFormTemplate::new(client, form, errors).await?;
            Ok(render_invalid(&template))
        }
        Err(err) => Err(err.into()),
    }
}
