//! Polls attached to threads, their options and votes.

use crate::constants::MIN_POLL_OPTIONS;
use crate::error::StoreError;
use crate::form::{validate_form, FormData, FormErrors};
use crate::orm::{poll_options, poll_votes, polls};
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, Statement,
};
use std::collections::HashMap;
use validator::Validate;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Clone, Debug, Default, Validate)]
pub struct PollForm {
    /// Thread select value. Ignored on update.
    pub thread: String,
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub question: String,
    /// Non-blank option texts in submission order.
    pub options: Vec<String>,
}

impl PollForm {
    /// Options come either as repeated `options` fields or one per line.
    pub fn from_data(data: &FormData) -> Self {
        Self {
            thread: data.text("thread"),
            question: data.text("question"),
            options: split_options(&data.get_all("options")),
        }
    }

    pub fn from_poll(poll: &polls::Model, options: &[poll_options::Model]) -> Self {
        Self {
            thread: poll.thread_id.to_string(),
            question: poll.question.to_owned(),
            options: options.iter().map(|o| o.text.to_owned()).collect(),
        }
    }

    pub fn thread_id(&self) -> Option<i32> {
        self.thread.parse().ok()
    }

    /// Options joined for a textarea.
    pub fn options_text(&self) -> String {
        self.options.join("\n")
    }
}

/// Splits submitted option values into trimmed, non-blank lines.
pub fn split_options(raw: &[&str]) -> Vec<String> {
    raw.iter()
        .flat_map(|value| value.lines())
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_owned())
        .collect()
}

fn check_options(form: &PollForm) -> FormErrors {
    let mut errors = match validate_form(form) {
        Ok(()) => FormErrors::new(),
        Err(errors) => errors,
    };

    let max = crate::app_config::limits().max_poll_options as usize;
    if form.options.len() < MIN_POLL_OPTIONS {
        errors.add("options", "At least two options are required.");
    } else if form.options.len() > max {
        errors.add(
            "options",
            format!("A poll can have at most {} options.", max),
        );
    }
    if form.options.iter().any(|option| option.chars().count() > 255) {
        errors.add("options", "Ensure each option has at most 255 characters.");
    }

    errors
}

async fn insert_options(
    txn: &DatabaseTransaction,
    poll_id: i32,
    options: &[String],
) -> Result<(), DbErr> {
    if options.is_empty() {
        return Ok(());
    }

    poll_options::Entity::insert_many(options.iter().map(|text| poll_options::ActiveModel {
        poll_id: Set(poll_id),
        text: Set(text.to_owned()),
        ..Default::default()
    }))
    .exec(txn)
    .await?;

    Ok(())
}

/// Creates a poll on a thread that has none yet.
pub async fn create_poll(db: &DatabaseConnection, form: &PollForm) -> Result<polls::Model, StoreError> {
    let mut errors = check_options(form);

    let thread_id = match crate::form::parse_optional_id(&form.thread) {
        Ok(Some(thread_id)) => match crate::threads::get_visible_thread(db, thread_id).await {
            Ok(thread) => Some(thread.id),
            Err(StoreError::NotFound(_)) => {
                errors.add("thread", INVALID_CHOICE);
                None
            }
            Err(err) => return Err(err),
        },
        Ok(None) => {
            errors.add("thread", "This field is required.");
            None
        }
        Err(()) => {
            errors.add("thread", INVALID_CHOICE);
            None
        }
    };

    if let Some(thread_id) = thread_id {
        if get_poll_for_thread(db, thread_id).await?.is_some() {
            errors.add("thread", "This thread already has a poll.");
        }
    }
    errors.into_result()?;
    let thread_id = thread_id.ok_or(StoreError::NotFound("Thread"))?;

    let txn = db.begin().await?;
    let poll = polls::ActiveModel {
        thread_id: Set(thread_id),
        question: Set(form.question.to_owned()),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_options(&txn, poll.id, &form.options).await?;
    txn.commit().await?;

    log::info!("created poll {} on thread {}", poll.id, thread_id);
    Ok(poll)
}

/// Replaces the question and the whole option set. Votes on the old
/// options go with them.
pub async fn update_poll(
    db: &DatabaseConnection,
    poll_id: i32,
    form: &PollForm,
) -> Result<polls::Model, StoreError> {
    let poll = get_poll(db, poll_id).await?;
    check_options(form).into_result()?;

    let txn = db.begin().await?;
    let mut active = poll.into_active_model();
    active.question = Set(form.question.to_owned());
    let poll = active.update(&txn).await?;

    poll_options::Entity::delete_many()
        .filter(poll_options::Column::PollId.eq(poll.id))
        .exec(&txn)
        .await?;
    insert_options(&txn, poll.id, &form.options).await?;
    txn.commit().await?;

    log::info!("updated poll {}", poll.id);
    Ok(poll)
}

/// Hard delete, taking options, votes and poll comments along.
pub async fn delete_poll<C>(db: &C, poll_id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    let poll = get_poll(db, poll_id).await?;
    polls::Entity::delete_by_id(poll.id).exec(db).await?;
    log::info!("deleted poll {}", poll_id);
    Ok(())
}

pub async fn get_poll<C>(db: &C, id: i32) -> Result<polls::Model, StoreError>
where
    C: ConnectionTrait,
{
    polls::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Poll"))
}

/// Every poll, newest first.
pub async fn list_polls<C>(db: &C) -> Result<Vec<polls::Model>, DbErr>
where
    C: ConnectionTrait,
{
    polls::Entity::find()
        .order_by_desc(polls::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn get_poll_for_thread<C>(db: &C, thread_id: i32) -> Result<Option<polls::Model>, DbErr>
where
    C: ConnectionTrait,
{
    polls::Entity::find()
        .filter(polls::Column::ThreadId.eq(thread_id))
        .one(db)
        .await
}

/// Options of a poll in creation order.
pub async fn get_options<C>(db: &C, poll_id: i32) -> Result<Vec<poll_options::Model>, DbErr>
where
    C: ConnectionTrait,
{
    poll_options::Entity::find()
        .filter(poll_options::Column::PollId.eq(poll_id))
        .order_by_asc(poll_options::Column::Id)
        .all(db)
        .await
}

/// Records a vote for one option. Voting for the same option again keeps
/// the single existing row; other options of the poll are unaffected.
pub async fn vote<C>(
    db: &C,
    user_id: i32,
    poll_id: i32,
    option_id: i32,
) -> Result<poll_votes::Model, StoreError>
where
    C: ConnectionTrait,
{
    let poll = get_poll(db, poll_id).await?;
    let option = poll_options::Entity::find_by_id(option_id)
        .filter(poll_options::Column::PollId.eq(poll.id))
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Poll option"))?;

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO poll_votes (user_id, option_id, voted_at) \
         VALUES ($1, $2, $3) ON CONFLICT (user_id, option_id) DO NOTHING",
        vec![
            user_id.into(),
            option.id.into(),
            chrono::Utc::now().naive_utc().into(),
        ],
    ))
    .await?;

    let vote = poll_votes::Entity::find()
        .filter(poll_votes::Column::UserId.eq(user_id))
        .filter(poll_votes::Column::OptionId.eq(option.id))
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Poll vote"))?;

    log::debug!("user {} voted for option {} of poll {}", user_id, option.id, poll.id);
    Ok(vote)
}

/// One option's share of the votes.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionResult {
    pub option: poll_options::Model,
    pub votes: i64,
    /// Rounded to a whole percent. Zero when nobody voted.
    pub percent: i64,
}

#[derive(Clone, Debug)]
pub struct PollResults {
    pub poll: polls::Model,
    pub options: Vec<OptionResult>,
    pub total_votes: i64,
}

/// Pairs each option with its vote count.
pub fn tally(options: Vec<poll_options::Model>, counts: &HashMap<i32, i64>) -> (Vec<OptionResult>, i64) {
    let total: i64 = options
        .iter()
        .map(|option| counts.get(&option.id).copied().unwrap_or(0))
        .sum();

    let results = options
        .into_iter()
        .map(|option| {
            let votes = counts.get(&option.id).copied().unwrap_or(0);
            let percent = if total > 0 {
                (votes * 100 + total / 2) / total
            } else {
                0
            };
            OptionResult {
                option,
                votes,
                percent,
            }
        })
        .collect();

    (results, total)
}

/// Vote counts per option, recomputed from the vote rows.
pub async fn get_results<C>(db: &C, poll_id: i32) -> Result<PollResults, StoreError>
where
    C: ConnectionTrait,
{
    let poll = get_poll(db, poll_id).await?;
    let options = get_options(db, poll.id).await?;
    let option_ids: Vec<i32> = options.iter().map(|option| option.id).collect();

    let mut counts: HashMap<i32, i64> = HashMap::new();
    if !option_ids.is_empty() {
        let votes = poll_votes::Entity::find()
            .filter(poll_votes::Column::OptionId.is_in(option_ids))
            .all(db)
            .await?;
        for vote in votes {
            *counts.entry(vote.option_id).or_insert(0) += 1;
        }
    }

    let (options, total_votes) = tally(options, &counts);
    Ok(PollResults {
        poll,
        options,
        total_votes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: i32, text: &str) -> poll_options::Model {
        poll_options::Model {
            id,
            poll_id: 1,
            text: text.to_owned(),
        }
    }

    #[test]
    fn test_tally_counts_and_percentages() {
        let mut counts = HashMap::new();
        counts.insert(10, 3);
        counts.insert(11, 1);

        let (results, total) = tally(vec![option(10, "Yes"), option(11, "No")], &counts);
        assert_eq!(total, 4);
        assert_eq!(
            results.iter().map(|r| r.votes).collect::<Vec<_>>(),
            vec![3, 1]
        );
        assert_eq!(
            results.iter().map(|r| r.percent).collect::<Vec<_>>(),
            vec![75, 25]
        );
    }

    #[test]
    fn test_tally_without_votes() {
        let (results, total) = tally(vec![option(1, "A"), option(2, "B")], &HashMap::new());
        assert_eq!(total, 0);
        assert!(results.iter().all(|r| r.votes == 0 && r.percent == 0));
    }

    #[test]
    fn test_split_options_drops_blank_lines() {
        assert_eq!(
            split_options(&["Red\r\n\r\n  Blue ", "", "Green"]),
            vec!["Red", "Blue", "Green"]
        );
    }

    #[test]
    fn test_poll_needs_two_options() {
        let mut form = PollForm {
            thread: "1".to_owned(),
            question: "Lunch?".to_owned(),
            options: vec!["Pizza".to_owned()],
        };
        assert!(check_options(&form).has("options"));

        form.options.push("Soup".to_owned());
        assert!(check_options(&form).is_empty());

        form.question = String::new();
        assert!(check_options(&form).has("question"));
    }
}
