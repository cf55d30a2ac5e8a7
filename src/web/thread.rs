//! Thread pages: create, view, edit, delete, votes, history and the
//! per-user subscribe and save toggles. Comments posted from a thread page
//! land here too.

use super::{read_form, RawForm};
use crate::comments::{self, CommentForm, ThreadedComment};
use crate::db::get_db_pool;
use crate::error::StoreError;
use crate::form::FormErrors;
use crate::middleware::ClientCtx;
use crate::orm::threads::ThreadStatus;
use crate::orm::vote_type::VoteType;
use crate::orm::{categories, comments as comment_entity, tags, threads};
use crate::polls::{self, PollResults};
use crate::taxonomy;
use crate::template::{confirm_delete, redirect, render_invalid, success};
use crate::threads::{self as thread_store, ThreadForm};
use crate::user;
use crate::votes::{self, VoteTally};
use actix_session::Session;
use actix_web::{get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};
use chrono::NaiveDateTime;
use sea_orm::ConnectionTrait;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_thread_form)
        .service(create_thread)
        .service(view_thread)
        .service(create_comment)
        .service(reply_form)
        .service(create_reply)
        .service(edit_thread_form)
        .service(edit_thread)
        .service(delete_thread_confirm)
        .service(delete_thread)
        .service(vote_thread)
        .service(view_thread_history)
        .service(subscribe)
        .service(unsubscribe)
        .service(save)
        .service(unsave);
}

/// A thread in a listing, with its author's name.
#[derive(Clone, Debug)]
pub struct ThreadSummary {
    pub thread: threads::Model,
    pub author: String,
}

/// Pairs each thread with its author's name.
pub async fn summarize_threads<C>(
    db: &C,
    threads: Vec<threads::Model>,
) -> Result<Vec<ThreadSummary>, StoreError>
where
    C: ConnectionTrait,
{
    let author_ids: Vec<i32> = threads.iter().filter_map(|t| t.author_id).collect();
    let names = user::get_usernames(db, &author_ids).await?;

    Ok(threads
        .into_iter()
        .map(|thread| ThreadSummary {
            author: user::display_name(&names, thread.author_id),
            thread,
        })
        .collect())
}

/// A comment as shown in a reply tree.
#[derive(Clone, Debug)]
pub struct CommentView {
    pub entry: ThreadedComment,
    pub author: String,
    pub tally: VoteTally,
    pub can_edit: bool,
}

impl CommentView {
    pub fn id(&self) -> i32 {
        self.entry.comment.id
    }
}

/// Builds the reply tree for `comments` with author names and vote counts.
pub async fn comment_views<C>(
    db: &C,
    client: &ClientCtx,
    comments: Vec<comment_entity::Model>,
) -> Result<Vec<CommentView>, StoreError>
where
    C: ConnectionTrait,
{
    let tree = comments::build_reply_tree(comments);
    let ids: Vec<i32> = tree.iter().map(|c| c.comment.id).collect();
    let author_ids: Vec<i32> = tree.iter().filter_map(|c| c.comment.author_id).collect();
    let names = user::get_usernames(db, &author_ids).await?;
    let tallies = votes::comment_tallies(db, &ids).await?;

    Ok(tree
        .into_iter()
        .map(|entry| CommentView {
            author: user::display_name(&names, entry.comment.author_id),
            tally: tallies.get(&entry.comment.id).copied().unwrap_or_default(),
            can_edit: !entry.is_tombstone && client.owns(entry.comment.author_id),
            entry,
        })
        .collect())
}

/// One row of an edit history page.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub editor: String,
    pub old_content: String,
    pub new_content: String,
    pub edited_at: NaiveDateTime,
}

/// Edit history of a thread or a comment, newest first.
#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub client: ClientCtx,
    pub heading: String,
    pub back_url: String,
    pub entries: Vec<HistoryEntry>,
}

/// Resolves editor names for history rows given as (editor, old, new, at).
pub async fn history_entries<C>(
    db: &C,
    rows: Vec<(Option<i32>, String, String, NaiveDateTime)>,
) -> Result<Vec<HistoryEntry>, StoreError>
where
    C: ConnectionTrait,
{
    let editor_ids: Vec<i32> = rows.iter().filter_map(|row| row.0).collect();
    let names = user::get_usernames(db, &editor_ids).await?;

    Ok(rows
        .into_iter()
        .map(|(editor, old_content, new_content, edited_at)| HistoryEntry {
            editor: user::display_name(&names, editor),
            old_content,
            new_content,
            edited_at,
        })
        .collect())
}

#[derive(Template)]
#[template(path = "thread.html")]
pub struct ThreadTemplate {
    pub client: ClientCtx,
    pub thread: threads::Model,
    pub author: String,
    pub category: Option<categories::Model>,
    pub tags: Vec<tags::Model>,
    pub tally: VoteTally,
    pub my_vote: Option<VoteType>,
    pub poll: Option<PollResults>,
    pub comments: Vec<CommentView>,
    pub is_subscribed: bool,
    pub is_saved: bool,
    pub can_edit: bool,
}

impl ThreadTemplate {
    pub fn voted(&self, direction: &str) -> bool {
        self.my_vote.map(|v| v.as_str() == direction).unwrap_or(false)
    }
}

#[derive(Template)]
#[template(path = "thread_form.html")]
pub struct ThreadFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    pub categories: Vec<categories::Model>,
    pub tags: Vec<tags::Model>,
    pub statuses: [ThreadStatus; 4],
    pub form: ThreadForm,
    pub errors: FormErrors,
}

impl ThreadFormTemplate {
    async fn new(
        client: ClientCtx,
        heading: &'static str,
        action: String,
        form: ThreadForm,
        errors: FormErrors,
    ) -> Result<Self, Error> {
        let db = get_db_pool();
        Ok(Self {
            client,
            heading,
            action,
            categories: taxonomy::list_categories(db)
                .await
                .map_err(StoreError::from)?,
            tags: taxonomy::list_tags(db).await.map_err(StoreError::from)?,
            statuses: ThreadStatus::all(),
            form,
            errors,
        })
    }

    pub fn is_category_selected(&self, id: &i32) -> bool {
        self.form.category_id() == Some(*id)
    }

    pub fn is_status_selected(&self, status: &ThreadStatus) -> bool {
        match self.form.status.as_str() {
            "" => *status == ThreadStatus::Open,
            value => value == status.as_str(),
        }
    }
}

/// Comment or reply form under a thread.
#[derive(Template)]
#[template(path = "reply_form.html")]
pub struct ReplyFormTemplate {
    pub client: ClientCtx,
    pub thread: threads::Model,
    pub parent: Option<comment_entity::Model>,
    pub parent_author: String,
    pub action: String,
    pub form: CommentForm,
    pub errors: FormErrors,
}

fn thread_url(id: i32) -> String {
    format!("/thread/{}/", id)
}

// Create

#[get("/create-thread/")]
pub async fn create_thread_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_login()?;
    let template = ThreadFormTemplate::new(
        client,
        "Create thread",
        "/create-thread/".to_owned(),
        ThreadForm::default(),
        FormErrors::new(),
    )
    .await?;
    Ok(template.to_response())
}

#[post("/create-thread/")]
pub async fn create_thread(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let form = ThreadForm::from_data(&read_form(&session, form)?);

    match thread_store::create_thread(get_db_pool(), user_id, &form).await {
        Ok(thread) => Ok(redirect(thread_url(thread.id))),
        Err(StoreError::Invalid(errors)) => {
            let template = ThreadFormTemplate::new(
                client,
                "Create thread",
                "/create-thread/".to_owned(),
                form,
                errors,
            )
            .await?;
            Ok(render_invalid(&template))
        }
        Err(err) => Err(err.into()),
    }
}

// View

#[get("/thread/{id}/")]
pub async fn view_thread(client: ClientCtx, path: web::Path<i32>) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let mut thread = thread_store::get_visible_thread(db, path.into_inner()).await?;
    thread_store::increment_views(db, thread.id)
        .await
        .map_err(StoreError::from)?;
    thread.views += 1;

    let names = user::get_usernames(db, &thread.author_id.into_iter().collect::<Vec<_>>())
        .await
        .map_err(StoreError::from)?;
    let category = match thread.category_id {
        Some(id) => taxonomy::find_categories(db, &[id])
            .await
            .map_err(StoreError::from)?
            .pop(),
        None => None,
    };
    let poll = match polls::get_poll_for_thread(db, thread.id)
        .await
        .map_err(StoreError::from)?
    {
        Some(poll) => Some(polls::get_results(db, poll.id).await?),
        None => None,
    };
    let comments = comments::get_thread_comments(db, thread.id)
        .await
        .map_err(StoreError::from)?;

    let (my_vote, is_subscribed, is_saved) = match client.get_id() {
        Some(user_id) => (
            votes::user_thread_vote(db, user_id, thread.id)
                .await
                .map_err(StoreError::from)?,
            thread_store::is_subscribed(db, user_id, thread.id)
                .await
                .map_err(StoreError::from)?,
            thread_store::is_saved(db, user_id, thread.id)
                .await
                .map_err(StoreError::from)?,
        ),
        None => (None, false, false),
    };

    Ok(ThreadTemplate {
        author: user::display_name(&names, thread.author_id),
        category,
        tags: thread_store::get_thread_tags(db, thread.id)
            .await
            .map_err(StoreError::from)?,
        tally: votes::thread_tally(db, thread.id)
            .await
            .map_err(StoreError::from)?,
        my_vote,
        poll,
        comments: comment_views(db, &client, comments).await?,
        is_subscribed,
        is_saved,
        can_edit: client.owns(thread.author_id),
        thread,
        client,
    }
    .to_response())
}

// Comments

async fn post_comment(
    client: ClientCtx,
    session: Session,
    thread_id: i32,
    parent_id: Option<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let db = get_db_pool();
    let thread = thread_store::get_visible_thread(db, thread_id).await?;
    let parent = match parent_id {
        Some(id) => Some(comments::get_visible_comment(db, id).await?),
        None => None,
    };
    let form = CommentForm::for_thread(&read_form(&session, form)?, thread.id, parent_id);

    match comments::create_comment(db, user_id, &form).await {
        Ok(comment) => Ok(redirect(format!(
            "{}#comment-{}",
            thread_url(thread.id),
            comment.id
        ))),
        Err(StoreError::Invalid(errors)) => {
            let names = user::get_usernames(
                db,
                &parent
                    .as_ref()
                    .and_then(|p| p.author_id)
                    .into_iter()
                    .collect::<Vec<_>>(),
            )
            .await
            .map_err(StoreError::from)?;
            Ok(render_invalid(&ReplyFormTemplate {
                client,
                parent_author: user::display_name(
                    &names,
                    parent.as_ref().and_then(|p| p.author_id),
                ),
                action: comment_action(thread.id, parent_id),
                thread,
                parent,
                form,
                errors,
            }))
        }
        Err(err) => Err(err.into()),
    }
}

fn comment_action(thread_id: i32, parent_id: Option<i32>) -> String {
    match parent_id {
        Some(parent_id) => format!("/thread/{}/comment/{}/", thread_id, parent_id),
        None => format!("/thread/{}/comment/", thread_id),
    }
}

#[post("/thread/{id}/comment/")]
pub async fn create_comment(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    post_comment(client, session, path.into_inner(), None, form).await
}

#[get("/thread/{id}/comment/{parent_id}/")]
pub async fn reply_form(
    client: ClientCtx,
    path: web::Path<(i32, i32)>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    let (thread_id, parent_id) = path.into_inner();
    let db = get_db_pool();
    let thread = thread_store::get_visible_thread(db, thread_id).await?;
    let parent = comments::get_visible_comment(db, parent_id).await?;
    let names = user::get_usernames(db, &parent.author_id.into_iter().collect::<Vec<_>>())
        .await
        .map_err(StoreError::from)?;

    Ok(ReplyFormTemplate {
        client,
        parent_author: user::display_name(&names, parent.author_id),
        action: comment_action(thread.id, Some(parent.id)),
        thread,
        parent: Some(parent),
        form: CommentForm::default(),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/thread/{id}/comment/{parent_id}/")]
pub async fn create_reply(
    client: ClientCtx,
    session: Session,
    path: web::Path<(i32, i32)>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let (thread_id, parent_id) = path.into_inner();
    post_comment(client, session, thread_id, Some(parent_id), form).await
}

// Edit and delete

#[get("/thread/{id}/edit/")]
pub async fn edit_thread_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let thread = thread_store::get_visible_thread(db, path.into_inner()).await?;
    client.require_ownership(thread.author_id)?;

    let tag_ids = thread_store::get_thread_tags(db, thread.id)
        .await
        .map_err(StoreError::from)?
        .into_iter()
        .map(|tag| tag.id)
        .collect();
    let template = ThreadFormTemplate::new(
        client,
        "Edit thread",
        format!("/thread/{}/edit/", thread.id),
        ThreadForm::from_model(&thread, tag_ids),
        FormErrors::new(),
    )
    .await?;
    Ok(template.to_response())
}

#[post("/thread/{id}/edit/")]
pub async fn edit_thread(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let thread = thread_store::get_visible_thread(db, path.into_inner()).await?;
    let user_id = client.require_ownership(thread.author_id)?;
    let form = ThreadForm::from_data(&read_form(&session, form)?);

    match thread_store::update_thread(db, thread.id, user_id, &form).await {
        Ok(thread) => Ok(redirect(thread_url(thread.id))),
        Err(StoreError::Invalid(errors)) => {
            let template = ThreadFormTemplate::new(
                client,
                "Edit thread",
                format!("/thread/{}/edit/", thread.id),
                form,
                errors,
            )
            .await?;
            Ok(render_invalid(&template))
        }
        Err(err) => Err(err.into()),
    }
}

#[get("/thread/{id}/delete/")]
pub async fn delete_thread_confirm(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let thread = thread_store::get_visible_thread(get_db_pool(), path.into_inner()).await?;
    client.require_ownership(thread.author_id)?;

    Ok(confirm_delete(
        client,
        "thread",
        thread.title,
        format!("/thread/{}/delete/", thread.id),
        thread_url(thread.id),
    ))
}

#[post("/thread/{id}/delete/")]
pub async fn delete_thread(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let thread = thread_store::get_visible_thread(db, path.into_inner()).await?;
    client.require_ownership(thread.author_id)?;
    read_form(&session, form)?;

    thread_store::delete_thread(db, thread.id).await?;
    Ok(success(client, "Thread deleted successfully!"))
}

// Votes and history

#[post("/thread/{id}/vote/")]
pub async fn vote_thread(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let data = read_form(&session, form)?;
    let db = get_db_pool();
    let thread = thread_store::get_visible_thread(db, path.into_inner()).await?;

    let vote = votes::parse_vote(&data.text("vote_type"))?;
    votes::vote_thread(db, user_id, thread.id, vote).await?;
    Ok(redirect(thread_url(thread.id)))
}

#[get("/thread/{id}/history/")]
pub async fn view_thread_history(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let thread = thread_store::get_visible_thread(db, path.into_inner()).await?;
    let rows = thread_store::get_thread_history(db, thread.id)
        .await
        .map_err(StoreError::from)?
        .into_iter()
        .map(|edit| (edit.user_id, edit.old_content, edit.new_content, edit.edited_at))
        .collect();

    Ok(HistoryTemplate {
        client,
        heading: format!("Edit history of \"{}\"", thread.title),
        back_url: thread_url(thread.id),
        entries: history_entries(db, rows).await?,
    }
    .to_response())
}

// Subscriptions and saved threads

/// Runs a per-user toggle on a visible thread and returns to it.
async fn toggle<F, Fut>(
    client: ClientCtx,
    session: Session,
    thread_id: i32,
    form: RawForm,
    action: F,
) -> Result<HttpResponse, Error>
where
    F: FnOnce(i32, i32) -> Fut,
    Fut: std::future::Future<Output = Result<(), StoreError>>,
{
    let user_id = client.require_login()?;
    read_form(&session, form)?;
    let thread = thread_store::get_visible_thread(get_db_pool(), thread_id).await?;
    action(user_id, thread.id).await?;
    Ok(redirect(thread_url(thread.id)))
}

#[post("/thread/{id}/subscribe/")]
pub async fn subscribe(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    toggle(client, session, path.into_inner(), form, |user_id, thread_id| async move {
        thread_store::subscribe(get_db_pool(), user_id, thread_id)
            .await
            .map(|_| ())
    })
    .await
}

#[post("/thread/{id}/unsubscribe/")]
pub async fn unsubscribe(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    toggle(client, session, path.into_inner(), form, |user_id, thread_id| async move {
        thread_store::unsubscribe(get_db_pool(), user_id, thread_id).await
    })
    .await
}

#[post("/thread/{id}/save/")]
pub async fn save(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    toggle(client, session, path.into_inner(), form, |user_id, thread_id| async move {
        thread_store::save(get_db_pool(), user_id, thread_id)
            .await
            .map(|_| ())
    })
    .await
}

#[post("/thread/{id}/unsave/")]
pub async fn unsave(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    toggle(client, session, path.into_inner(), form, |user_id, thread_id| async move {
        thread_store::unsave(get_db_pool(), user_id, thread_id).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_action_targets_parent() {
        assert_eq!(comment_action(4, None), "/thread/4/comment/");
        assert_eq!(comment_action(4, Some(9)), "/thread/4/comment/9/");
    }

    #[test]
    fn test_status_defaults_to_open() {
        let mut template = ThreadFormTemplate {
            client: ClientCtx::default(),
            heading: "Create thread",
            action: "/create-thread/".to_owned(),
            categories: Vec::new(),
            tags: Vec::new(),
            statuses: ThreadStatus::all(),
            form: ThreadForm::default(),
            errors: FormErrors::new(),
        };
        assert!(template.is_status_selected(&ThreadStatus::Open));
        assert!(!template.is_status_selected(&ThreadStatus::Closed));

        template.form.status = "archived".to_owned();
        assert!(template.is_status_selected(&ThreadStatus::Archived));
        assert!(!template.is_status_selected(&ThreadStatus::Open));
    }

    #[test]
    fn test_category_selection_follows_form() {
        let template = ThreadFormTemplate {
            client: ClientCtx::default(),
            heading: "Edit thread",
            action: "/thread/1/edit/".to_owned(),
            categories: Vec::new(),
            tags: Vec::new(),
            statuses: ThreadStatus::all(),
            form: ThreadForm {
                category: "3".to_owned(),
                ..Default::default()
            },
            errors: FormErrors::new(),
        };
        assert!(template.is_category_selected(&3));
        assert!(!template.is_category_selected(&4));
    }

    #[test]
    fn test_thread_form_renders_selected_labels() {
        let template = ThreadFormTemplate {
            client: ClientCtx::default(),
            heading: "Edit thread",
            action: "/thread/1/edit/".to_owned(),
            categories: vec![
                categories::Model {
                    id: 3,
                    name: "Homework".to_owned(),
                    description: String::new(),
                },
                categories::Model {
                    id: 4,
                    name: "Sports".to_owned(),
                    description: String::new(),
                },
            ],
            tags: vec![
                tags::Model {
                    id: 7,
                    name: "rust".to_owned(),
                },
                tags::Model {
                    id: 8,
                    name: "sql".to_owned(),
                },
            ],
            statuses: ThreadStatus::all(),
            form: ThreadForm {
                category: "3".to_owned(),
                tags: Some(vec![8]),
                status: "closed".to_owned(),
                ..Default::default()
            },
            errors: FormErrors::new(),
        };

        let html = template.render().unwrap();
        assert!(html.contains(r#"<option value="3" selected>Homework</option>"#));
        assert!(html.contains(r#"<option value="4">Sports</option>"#));
        assert!(html.contains(r#"value="8" checked"#));
        assert!(!html.contains(r#"value="7" checked"#));
        assert!(html.contains(r#"<option value="closed" selected>"#));
    }
}
