//! Threads, comments and polls created within the recent window.

use crate::orm::{comments, forum_categories, polls, thread_tags, threads};
use chrono::{Duration, NaiveDateTime};
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use serde::Deserialize;

/// Query string of the recent activity page. Values that are not ids are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub category: Option<String>,
    pub forum: Option<String>,
    pub tag: Option<String>,
}

/// Filters that compose with AND. `None` means unfiltered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecentFilter {
    pub category: Option<i32>,
    pub forum: Option<i32>,
    pub tag: Option<i32>,
}

impl RecentFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.forum.is_none() && self.tag.is_none()
    }
}

impl From<&RecentQuery> for RecentFilter {
    fn from(query: &RecentQuery) -> Self {
        fn id(raw: &Option<String>) -> Option<i32> {
            raw.as_deref().and_then(|v| v.trim().parse().ok())
        }

        Self {
            category: id(&query.category),
            forum: id(&query.forum),
            tag: id(&query.tag),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RecentActivity {
    pub threads: Vec<threads::Model>,
    pub comments: Vec<comments::Model>,
    pub polls: Vec<polls::Model>,
}

/// Start of the window ending at `now`.
pub fn window_start(now: NaiveDateTime, window_days: u32) -> NaiveDateTime {
    now - Duration::days(window_days as i64)
}

/// `SELECT id FROM threads` for non-deleted threads passing the filter, at
/// any age.
fn matching_threads(filter: &RecentFilter) -> SelectStatement {
    let mut query = Query::select();
    query
        .column(threads::Column::Id)
        .from(threads::Entity)
        .and_where(Expr::col(threads::Column::IsDeleted).eq(false));

    if let Some(category_id) = filter.category {
        query.and_where(Expr::col(threads::Column::CategoryId).eq(category_id));
    }
    if let Some(forum_id) = filter.forum {
        query.and_where(
            Expr::col(threads::Column::CategoryId).in_subquery(
                Query::select()
                    .column(forum_categories::Column::CategoryId)
                    .from(forum_categories::Entity)
                    .and_where(Expr::col(forum_categories::Column::ForumId).eq(forum_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(tag_id) = filter.tag {
        query.and_where(
            Expr::col(threads::Column::Id).in_subquery(
                Query::select()
                    .column(thread_tags::Column::ThreadId)
                    .from(thread_tags::Entity)
                    .and_where(Expr::col(thread_tags::Column::TagId).eq(tag_id))
                    .to_owned(),
            ),
        );
    }

    query
}

fn deleted_threads() -> SelectStatement {
    Query::select()
        .column(threads::Column::Id)
        .from(threads::Entity)
        .and_where(Expr::col(threads::Column::IsDeleted).eq(true))
        .to_owned()
}

/// `SELECT id FROM polls` for polls attached to one of `threads`.
fn polls_on(threads: SelectStatement) -> SelectStatement {
    Query::select()
        .column(polls::Column::Id)
        .from(polls::Entity)
        .and_where(Expr::col(polls::Column::ThreadId).in_subquery(threads))
        .to_owned()
}

/// Activity between `now - window_days` and `now`, newest first, at most
/// `limit` rows per kind.
///
/// Polls and comments follow the filter through their thread. Poll
/// comments follow it through the poll's thread. Everything is resolved in
/// SQL so the cost does not grow with the number of old threads.
pub async fn get_recent_activity<C>(
    db: &C,
    filter: &RecentFilter,
    now: NaiveDateTime,
    window_days: u32,
    limit: u64,
) -> Result<RecentActivity, DbErr>
where
    C: ConnectionTrait,
{
    let since = window_start(now, window_days);

    let mut thread_query = threads::Entity::find()
        .filter(threads::Column::IsDeleted.eq(false))
        .filter(threads::Column::CreatedAt.gte(since))
        .filter(threads::Column::CreatedAt.lte(now));
    let mut poll_query = polls::Entity::find()
        .filter(polls::Column::CreatedAt.gte(since))
        .filter(polls::Column::CreatedAt.lte(now));
    let mut comment_query = comments::Entity::find()
        .filter(comments::Column::IsDeleted.eq(false))
        .filter(comments::Column::CreatedAt.gte(since))
        .filter(comments::Column::CreatedAt.lte(now));

    if filter.is_empty() {
        poll_query = poll_query.filter(polls::Column::ThreadId.not_in_subquery(deleted_threads()));
        comment_query = comment_query
            .filter(
                Condition::any()
                    .add(comments::Column::ThreadId.is_null())
                    .add(comments::Column::ThreadId.not_in_subquery(deleted_threads())),
            )
            .filter(
                Condition::any()
                    .add(comments::Column::PollId.is_null())
                    .add(comments::Column::PollId.not_in_subquery(polls_on(deleted_threads()))),
            );
    } else {
        let matching = matching_threads(filter);
        thread_query = thread_query.filter(threads::Column::Id.in_subquery(matching.clone()));
        poll_query = poll_query.filter(polls::Column::ThreadId.in_subquery(matching.clone()));
        comment_query = comment_query.filter(
            Condition::any()
                .add(comments::Column::ThreadId.in_subquery(matching.clone()))
                .add(comments::Column::PollId.in_subquery(polls_on(matching))),
        );
    }

    Ok(RecentActivity {
        threads: thread_query
            .order_by_desc(threads::Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await?,
        comments: comment_query
            .order_by_desc(comments::Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await?,
        polls: poll_query
            .order_by_desc(polls::Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await?,
    })
}
