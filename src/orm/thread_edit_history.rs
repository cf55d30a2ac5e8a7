//! SeaORM Entity for thread_edit_history table
//!
//! Append-only. One row per edit, holding the content before and after.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "thread_edit_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Editor. Nulled when the account is removed.
    pub user_id: Option<i32>,
    pub thread_id: i32,
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
        belongs_to = "super::threads::Entity",
        from = "Column::ThreadId",
        to = "super::threads::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Thread,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Editor.def()
    }
}

impl Related<super::threads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Thread.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
