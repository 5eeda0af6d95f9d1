//! SeaORM Entity for feature_toggle_contexts junction table
//!
//! One row per (toggle, context) pair. `active` is the on/off state of the
//! toggle in that context.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feature_toggle_contexts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub feature_toggle_id: i32,
    pub context_id: i32,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::feature_toggles::Entity",
        from = "Column::FeatureToggleId",
        to = "super::feature_toggles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FeatureToggle,
    #[sea_orm(
        belongs_to = "super::contexts::Entity",
        from = "Column::ContextId",
        to = "super::contexts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Context,
}

impl Related<super::feature_toggles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeatureToggle.def()
    }
}

impl Related<super::contexts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Context.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
