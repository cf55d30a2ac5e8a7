//! SeaORM Entity for comment_edit_history table
//!
//! Append-only. One row per edit, holding the content before and after.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comment_edit_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Editor. Nulled when the account is removed.
    pub user_id: Option<i32>,
    pub comment_id: i32,
    #[sea_orm(column_type = "Text")]
    pub old_content: String,
    #[sea_orm(column_type = "Text")]
    pub new_content: String,
    pub edited_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Editor,
    #[sea_orm(
        belongs_to = "super::comments::Entity",
        from = "Column::CommentId",
        to = "super::comments::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Comment,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Editor.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
