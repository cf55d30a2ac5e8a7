//! GroupPortal: a student gradebook and a discussion forum served over HTTP.

pub mod achievements;
pub mod app_config;
pub mod comments;
pub mod constants;
pub mod db;
pub mod diary;
pub mod error;
pub mod form;
pub mod forums;
pub mod middleware;
pub mod orm;
pub mod polls;
pub mod recent;
pub mod taxonomy;
pub mod template;
pub mod threads;
pub mod user;
pub mod votes;
pub mod web;
