//! SeaORM Entity for contexts table
//!
//! Contexts are the deployment environments a toggle can be switched on in.
//! Rows are seeded at schema bootstrap, one per `ContextName`.

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

/// Known deployment environments
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum ContextName {
    #[sea_orm(string_value = "testing")]
    Testing,
    #[sea_orm(string_value = "production")]
    Production,
}

impl ContextName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextName::Testing => "testing",
            ContextName::Production => "production",
        }
    }

    /// Label used when seeding the contexts table
    pub fn default_label(&self) -> &'static str {
        match self {
            ContextName::Testing => "Testing",
            ContextName::Production => "Production",
        }
    }

    /// Every known context, in seeding order
    pub fn all() -> Vec<ContextName> {
        ContextName::iter().collect()
    }
}

impl std::fmt::Display for ContextName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContextName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testing" => Ok(ContextName::Testing),
            "production" => Ok(ContextName::Production),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contexts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: ContextName,
    pub label: String,
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
