//! Database connection and schema bootstrap

use crate::app_config::{DatabaseConfig, StoreBackend};
use crate::orm::contexts::{self, ContextName};
use crate::orm::{feature_toggle_contexts, feature_toggles};
use crate::store::{DbToggleStore, MemoryToggleStore, ToggleStore};
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DbErr, Schema,
};
use std::sync::Arc;

/// Open a connection pool.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(max_connections.max(1))
        .min_connections(1);
    Database::connect(options).await
}

/// Create missing tables and seed the known contexts. Safe to run on every start.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Parents before children for the foreign keys.
    let mut statements = vec![
        schema.create_table_from_entity(contexts::Entity),
        schema.create_table_from_entity(feature_toggles::Entity),
        schema.create_table_from_entity(feature_toggle_contexts::Entity),
    ];
    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    seed_contexts(db).await
}

async fn seed_contexts(db: &DatabaseConnection) -> Result<(), DbErr> {
    for name in ContextName::all() {
        let existing = contexts::Entity::find()
            .filter(contexts::Column::Name.eq(name))
            .one(db)
            .await?;

        if existing.is_none() {
            contexts::ActiveModel {
                name: Set(name),
                label: Set(name.default_label().to_string()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            log::info!("Seeded context '{}'", name);
        }
    }

    Ok(())
}

/// Build the configured toggle store, bootstrapping the schema for relational backends.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn ToggleStore>, DbErr> {
    match config.backend {
        StoreBackend::Memory => {
            log::warn!("Using in-memory toggle store; toggles are lost on restart");
            Ok(Arc::new(MemoryToggleStore::new()))
        }
        StoreBackend::Postgres | StoreBackend::Sqlite => {
            let db = connect(&config.url, config.max_connections).await?;
            init_schema(&db).await?;
            Ok(Arc::new(DbToggleStore::new(db)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_init_schema_is_idempotent() {
        let db = connect("sqlite::memory:", 1).await.unwrap();
        init_schema(&db).await.unwrap();
        init_schema(&db).await.unwrap();

        let seeded = contexts::Entity::find()
            .order_by_asc(contexts::Column::Id)
            .all(&db)
            .await
            .unwrap();
        let names: Vec<ContextName> = seeded.iter().map(|c| c.name).collect();
        assert_eq!(names, ContextName::all());
        assert_eq!(seeded[0].label, "Testing");
    }

    #[actix_rt::test]
    async fn test_open_memory_store() {
        let config = DatabaseConfig {
            backend: StoreBackend::Memory,
            ..Default::default()
        };
        let store = open_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[actix_rt::test]
    async fn test_open_sqlite_store() {
        let config = DatabaseConfig {
            backend: StoreBackend::Sqlite,
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let store = open_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        store.ping().await.unwrap();
    }
}
