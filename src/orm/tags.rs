//! SeaORM Entity for tags table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::thread_tags::Entity")]
    ThreadTags,
    #[sea_orm(has_many = "super::forum_tags::Entity")]
    ForumTags,
}

impl Related<super::thread_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ThreadTags.def()
    }
}

impl Related<super::forum_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ForumTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
