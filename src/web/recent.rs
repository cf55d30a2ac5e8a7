use super::thread::{summarize_threads, ThreadSummary};
use crate::app_config;
use crate::db::get_db_pool;
use crate::error::StoreError;
use crate::forums;
use crate::middleware::ClientCtx;
use crate::orm::{categories, comments, forums as forum_entity, polls, tags};
use crate::recent::{self, RecentFilter, RecentQuery};
use crate::taxonomy;
use actix_web::{get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_recent);
}

#[derive(Template)]
#[template(path = "recent.html")]
pub struct RecentTemplate {
    pub client: ClientCtx,
    pub window_days: u32,
    pub filter: RecentFilter,
    pub categories: Vec<categories::Model>,
    pub forums: Vec<forum_entity::Model>,
    pub tags: Vec<tags::Model>,
    pub threads: Vec<ThreadSummary>,
    pub comments: Vec<comments::Model>,
    pub polls: Vec<polls::Model>,
}

impl RecentTemplate {
    pub fn is_category_selected(&self, id: &i32) -> bool {
        self.filter.category == Some(*id)
    }

    pub fn is_forum_selected(&self, id: &i32) -> bool {
        self.filter.forum == Some(*id)
    }

    pub fn is_tag_selected(&self, id: &i32) -> bool {
        self.filter.tag == Some(*id)
    }
}

#[get("/recent/")]
pub async fn view_recent(
    client: ClientCtx,
    query: web::Query<RecentQuery>,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let config = app_config::recent();
    let filter = RecentFilter::from(&query.into_inner());

    let activity = recent::get_recent_activity(
        db,
        &filter,
        chrono::Utc::now().naive_utc(),
        config.window_days,
        config.limit as u64,
    )
    .await
    .map_err(StoreError::from)?;

    Ok(RecentTemplate {
        client,
        window_days: config.window_days,
        filter,
        categories: taxonomy::list_categories(db)
            .await
            .map_err(StoreError::from)?,
        forums: forums::list_forums(db).await.map_err(StoreError::from)?,
        tags: taxonomy::list_tags(db).await.map_err(StoreError::from)?,
        threads: summarize_threads(db, activity.threads).await?,
        comments: activity.comments,
        polls: activity.polls,
    }
    .to_response())
}
