//! Feature toggles entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feature_toggles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub key: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::feature_toggle_contexts::Entity")]
    FeatureToggleContexts,
}

impl Related<super::feature_toggle_contexts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeatureToggleContexts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
