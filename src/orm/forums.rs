//! SeaORM Entity for forums table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "forums")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Nulled when the author account is removed.
    pub author_id: Option<i32>,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
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
    #[sea_orm(has_many = "super::forum_categories::Entity")]
    ForumCategories,
    #[sea_orm(has_many = "super::forum_tags::Entity")]
    ForumTags,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::forum_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ForumCategories.def()
    }
}

impl Related<super::forum_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ForumTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
