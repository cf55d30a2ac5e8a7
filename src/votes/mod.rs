//! Up/down votes on threads and comments.
//!
//! A user holds at most one vote per target. Voting again overwrites the
//! direction instead of adding a row. Totals are counted from the rows.

use crate::error::StoreError;
use crate::orm::vote_type::VoteType;
use crate::orm::{comment_votes, comments, thread_votes, threads};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, Statement};
use std::collections::HashMap;

/// Vote counts for one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub up: i64,
    pub down: i64,
}

impl VoteTally {
    pub fn score(&self) -> i64 {
        self.up - self.down
    }

    fn record(&mut self, vote: VoteType) {
        match vote {
            VoteType::Up => self.up += 1,
            VoteType::Down => self.down += 1,
        }
    }

    /// Counts a list of vote directions.
    pub fn from_votes<I>(votes: I) -> Self
    where
        I: IntoIterator<Item = VoteType>,
    {
        let mut tally = Self::default();
        for vote in votes {
            tally.record(vote);
        }
        tally
    }
}

/// Parses the submitted direction, rejecting anything but up or down.
pub fn parse_vote(raw: &str) -> Result<VoteType, StoreError> {
    VoteType::parse(raw).ok_or_else(|| StoreError::invalid("vote_type", "Invalid vote type."))
}

/// Records or overwrites `user_id`'s vote on a thread.
///
/// One statement, so concurrent votes from the same user never collide
/// on the unique pair; the last one to commit wins.
pub async fn vote_thread<C>(
    db: &C,
    user_id: i32,
    thread_id: i32,
    vote: VoteType,
) -> Result<thread_votes::Model, StoreError>
where
    C: ConnectionTrait,
{
    if threads::Entity::find_by_id(thread_id).one(db).await?.is_none() {
        return Err(StoreError::NotFound("Thread"));
    }

    let model = thread_votes::Entity::find()
        .from_raw_sql(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO thread_votes (user_id, thread_id, vote_type, voted_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, thread_id) \
             DO UPDATE SET vote_type = EXCLUDED.vote_type, voted_at = EXCLUDED.voted_at \
             RETURNING *",
            vec![
                user_id.into(),
                thread_id.into(),
                vote.as_str().into(),
                chrono::Utc::now().naive_utc().into(),
            ],
        ))
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Thread vote"))?;

    log::debug!("user {} voted {} on thread {}", user_id, vote.as_str(), thread_id);
    Ok(model)
}

/// Records or overwrites `user_id`'s vote on a comment.
pub async fn vote_comment<C>(
    db: &C,
    user_id: i32,
    comment_id: i32,
    vote: VoteType,
) -> Result<comment_votes::Model, StoreError>
where
    C: ConnectionTrait,
{
    if comments::Entity::find_by_id(comment_id).one(db).await?.is_none() {
        return Err(StoreError::NotFound("Comment"));
    }

    let model = comment_votes::Entity::find()
        .from_raw_sql(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO comment_votes (user_id, comment_id, vote_type, voted_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, comment_id) \
             DO UPDATE SET vote_type = EXCLUDED.vote_type, voted_at = EXCLUDED.voted_at \
             RETURNING *",
            vec![
                user_id.into(),
                comment_id.into(),
                vote.as_str().into(),
                chrono::Utc::now().naive_utc().into(),
            ],
        ))
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Comment vote"))?;

    log::debug!("user {} voted {} on comment {}", user_id, vote.as_str(), comment_id);
    Ok(model)
}

pub async fn thread_tally<C>(db: &C, thread_id: i32) -> Result<VoteTally, DbErr>
where
    C: ConnectionTrait,
{
    let up = thread_votes::Entity::find()
        .filter(thread_votes::Column::ThreadId.eq(thread_id))
        .filter(thread_votes::Column::VoteType.eq(VoteType::Up))
        .count(db)
        .await? as i64;
    let down = thread_votes::Entity::find()
        .filter(thread_votes::Column::ThreadId.eq(thread_id))
        .filter(thread_votes::Column::VoteType.eq(VoteType::Down))
        .count(db)
        .await? as i64;

    Ok(VoteTally { up, down })
}

/// Tallies for many comments at once. Comments without votes are absent.
pub async fn comment_tallies<C>(db: &C, comment_ids: &[i32]) -> Result<HashMap<i32, VoteTally>, DbErr>
where
    C: ConnectionTrait,
{
    if comment_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let votes = comment_votes::Entity::find()
        .filter(comment_votes::Column::CommentId.is_in(comment_ids.to_vec()))
        .all(db)
        .await?;

    let mut tallies: HashMap<i32, VoteTally> = HashMap::new();
    for vote in votes {
        tallies.entry(vote.comment_id).or_default().record(vote.vote_type);
    }
    Ok(tallies)
}

/// The direction `user_id` currently holds on a thread, if any.
pub async fn user_thread_vote<C>(
    db: &C,
    user_id: i32,
    thread_id: i32,
) -> Result<Option<VoteType>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(thread_votes::Entity::find()
        .filter(thread_votes::Column::UserId.eq(user_id))
        .filter(thread_votes::Column::ThreadId.eq(thread_id))
        .one(db)
        .await?
        .map(|vote| vote.vote_type))
}
