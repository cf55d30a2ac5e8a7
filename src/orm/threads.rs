//! SeaORM Entity for threads table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Thread status label. No transition rules are enforced between states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ThreadStatus {
    #[sea_orm(string_value = "open")]
    #[default]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "moderation")]
    Moderation,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl ThreadStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "moderation" => Some(Self::Moderation),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Moderation => "moderation",
            Self::Archived => "archived",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::Moderation => "Under Moderation",
            Self::Archived => "Archived",
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Open, Self::Closed, Self::Moderation, Self::Archived]
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "threads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Reference handed over by the upload storage layer.
    pub attachment: Option<String>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub views: i32,
    pub is_deleted: bool,
    pub status: ThreadStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::thread_tags::Entity")]
    ThreadTags,
    #[sea_orm(has_many = "super::thread_edit_history::Entity")]
    EditHistory,
    #[sea_orm(has_many = "super::thread_votes::Entity")]
    Votes,
    #[sea_orm(has_one = "super::polls::Entity")]
    Poll,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::thread_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ThreadTags.def()
    }
}

impl Related<super::thread_edit_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EditHistory.def()
    }
}

impl Related<super::thread_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl Related<super::polls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
