use super::{read_form, RawForm};
use crate::achievements::{self, EarnedAchievement};
use crate::db::get_db_pool;
use crate::error::StoreError;
use crate::form::FormErrors;
use crate::middleware::ClientCtx;
use crate::orm::user_profiles;
use crate::template::{redirect, render_invalid};
use crate::user::{self, ProfileForm};
use actix_session::Session;
use actix_web::{get, post, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_profile)
        .service(edit_profile_form)
        .service(edit_profile);
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub client: ClientCtx,
    pub profile: Option<user_profiles::Model>,
    pub achievements: Vec<EarnedAchievement>,
    pub total_points: i64,
}

#[derive(Template)]
#[template(path = "profile_form.html")]
pub struct ProfileFormTemplate {
    pub client: ClientCtx,
    pub form: ProfileForm,
    pub errors: FormErrors,
}

#[get("/profile/")]
pub async fn view_profile(client: ClientCtx) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let db = get_db_pool();
    let profile = user::get_profile(db, user_id)
        .await
        .map_err(StoreError::from)?;
    let earned = achievements::get_user_achievements(db, user_id)
        .await
        .map_err(StoreError::from)?;

    Ok(ProfileTemplate {
        client,
        profile,
        total_points: achievements::total_points(&earned),
        achievements: earned,
    }
    .to_response())
}

#[get("/profile/edit/")]
pub async fn edit_profile_form(client: ClientCtx) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let profile = user::get_profile(get_db_pool(), user_id)
        .await
        .map_err(StoreError::from)?;

    Ok(ProfileFormTemplate {
        client,
        form: ProfileForm::from_profile(profile.as_ref()),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/profile/edit/")]
pub async fn edit_profile(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let form = ProfileForm::from_data(&read_form(&session, form)?);

    match user::update_profile(get_db_pool(), user_id, &form).await {
        Ok(_) => Ok(redirect("/profile/")),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&ProfileFormTemplate {
            client,
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}
