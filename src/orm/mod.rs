//! SeaORM entities, one module per table.

pub mod achievements;
pub mod categories;
pub mod comment_edit_history;
pub mod comment_votes;
pub mod comments;
pub mod forum_categories;
pub mod forum_tags;
pub mod forums;
pub mod grades;
pub mod poll_options;
pub mod poll_votes;
pub mod polls;
pub mod saved_threads;
pub mod students;
pub mod subjects;
pub mod tags;
pub mod thread_edit_history;
pub mod thread_subscriptions;
pub mod thread_tags;
pub mod thread_votes;
pub mod threads;
pub mod user_achievements;
pub mod user_profiles;
pub mod users;
pub mod vote_type;
