//! Relational toggle storage through SeaORM.
//!
//! Toggles live in `feature_toggles`, their per-context state in
//! `feature_toggle_contexts`. Writes run inside a transaction so callers never
//! see a toggle without its context rows.

use super::{StoreError, StoreResult, ToggleStore};
use crate::orm::contexts::{self, ContextName};
use crate::orm::{feature_toggle_contexts, feature_toggles};
use crate::toggle::{Context, FeatureToggle, FeatureToggleUpdateRequest};
use crate::validation::check_toggle_identity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbErr,
    Statement, TransactionTrait,
};
use std::collections::HashMap;

pub struct DbToggleStore {
    db: DatabaseConnection,
}

impl DbToggleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Ids bound per `IN (...)` list, under SQLite's 999 parameter limit.
const ID_CHUNK_SIZE: usize = 500;

/// Attach context rows to toggle rows, preserving the order of `rows`.
async fn hydrate<C>(conn: &C, rows: Vec<feature_toggles::Model>) -> StoreResult<Vec<FeatureToggle>>
where
    C: ConnectionTrait,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let mut by_toggle: HashMap<i32, Vec<Context>> = HashMap::new();

    for chunk in ids.chunks(ID_CHUNK_SIZE) {
        let links = feature_toggle_contexts::Entity::find()
            .filter(feature_toggle_contexts::Column::FeatureToggleId.is_in(chunk.iter().copied()))
            .order_by_asc(feature_toggle_contexts::Column::Id)
            .find_also_related(contexts::Entity)
            .all(conn)
            .await?;

        for (link, context) in links {
            if let Some(context) = context {
                by_toggle
                    .entry(link.feature_toggle_id)
                    .or_default()
                    .push(Context {
                        id: context.id,
                        name: context.name,
                        label: context.label,
                        active: link.active,
                    });
            }
        }
    }

    rows.into_iter()
        .map(|row| {
            let id = row.id;
            let contexts = by_toggle.remove(&id).unwrap_or_default();
            FeatureToggle::new(id, row.key, row.name, row.description, contexts).map_err(|e| {
                log::error!("Stored feature toggle {} is malformed: {}", id, e);
                StoreError::from(e)
            })
        })
        .collect()
}

async fn find_one<C>(conn: &C, id: i32) -> StoreResult<FeatureToggle>
where
    C: ConnectionTrait,
{
    let row = feature_toggles::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(StoreError::NotFound(id))?;

    hydrate(conn, vec![row])
        .await?
        .into_iter()
        .next()
        .ok_or(StoreError::NotFound(id))
}

async fn find_context<C>(conn: &C, name: ContextName) -> Result<Option<contexts::Model>, DbErr>
where
    C: ConnectionTrait,
{
    contexts::Entity::find()
        .filter(contexts::Column::Name.eq(name))
        .one(conn)
        .await
}

/// Postgres and SQLite both name the violated constraint type in the message.
fn is_unique_violation(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("duplicate key") || message.contains("UNIQUE constraint")
}

#[async_trait]
impl ToggleStore for DbToggleStore {
    async fn get_all_active(&self, context: ContextName) -> StoreResult<Vec<FeatureToggle>> {
        let context = match find_context(&self.db, context).await? {
            Some(context) => context,
            None => return Ok(Vec::new()),
        };

        let rows = feature_toggles::Entity::find()
            .inner_join(feature_toggle_contexts::Entity)
            .filter(feature_toggle_contexts::Column::ContextId.eq(context.id))
            .filter(feature_toggle_contexts::Column::Active.eq(true))
            .order_by_asc(feature_toggles::Column::Id)
            .all(&self.db)
            .await?;

        hydrate(&self.db, rows).await
    }

    async fn get_all(&self) -> StoreResult<Vec<FeatureToggle>> {
        let rows = feature_toggles::Entity::find()
            .order_by_asc(feature_toggles::Column::Id)
            .all(&self.db)
            .await?;

        hydrate(&self.db, rows).await
    }

    async fn get_by_id(&self, id: i32) -> StoreResult<FeatureToggle> {
        find_one(&self.db, id).await
    }

    async fn create(
        &self,
        key: &str,
        name: &str,
        description: &str,
    ) -> StoreResult<FeatureToggle> {
        check_toggle_identity(key, name)?;

        let txn = self.db.begin().await?;

        let existing = feature_toggles::Entity::find()
            .filter(feature_toggles::Column::Key.eq(key))
            .one(&txn)
            .await?;
        if existing.is_some() {
            txn.rollback().await?;
            return Err(StoreError::Conflict(key.to_string()));
        }

        let now = Utc::now().naive_utc();
        let row = feature_toggles::ActiveModel {
            key: Set(key.to_string()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            // Lost a race with a concurrent create of the same key.
            if is_unique_violation(&e) {
                StoreError::Conflict(key.to_string())
            } else {
                StoreError::Database(e)
            }
        })?;

        // Every known context starts switched off.
        let all_contexts = contexts::Entity::find()
            .order_by_asc(contexts::Column::Id)
            .all(&txn)
            .await?;
        for context in all_contexts {
            feature_toggle_contexts::ActiveModel {
                feature_toggle_id: Set(row.id),
                context_id: Set(context.id),
                active: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let toggle = find_one(&txn, row.id).await?;
        txn.commit().await?;

        log::info!("Feature toggle '{}' created with id {}", key, toggle.id());

        Ok(toggle)
    }

    async fn update(
        &self,
        id: i32,
        request: FeatureToggleUpdateRequest,
    ) -> StoreResult<FeatureToggle> {
        let txn = self.db.begin().await?;

        let row = feature_toggles::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        request.check()?;

        let key = row.key.clone();
        let mut active: feature_toggles::ActiveModel = row.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now().naive_utc());
        active.update(&txn).await?;

        for activation in request.contexts.unwrap_or_default() {
            let context = find_context(&txn, activation.name).await?.ok_or_else(|| {
                DbErr::RecordNotFound(format!("context '{}' is not seeded", activation.name))
            })?;

            let link = feature_toggle_contexts::Entity::find()
                .filter(feature_toggle_contexts::Column::FeatureToggleId.eq(id))
                .filter(feature_toggle_contexts::Column::ContextId.eq(context.id))
                .one(&txn)
                .await?;

            match link {
                Some(link) => {
                    let mut link: feature_toggle_contexts::ActiveModel = link.into();
                    link.active = Set(activation.active);
                    link.update(&txn).await?;
                }
                None => {
                    feature_toggle_contexts::ActiveModel {
                        feature_toggle_id: Set(id),
                        context_id: Set(context.id),
                        active: Set(activation.active),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                }
            }

            log::info!(
                "Feature toggle '{}' {} in {}",
                key,
                if activation.active { "enabled" } else { "disabled" },
                activation.name
            );
        }

        let toggle = find_one(&txn, id).await?;
        txn.commit().await?;

        log::info!("Feature toggle '{}' updated", key);

        Ok(toggle)
    }

    async fn remove_by_id(&self, id: i32) -> StoreResult<()> {
        let txn = self.db.begin().await?;

        feature_toggle_contexts::Entity::delete_many()
            .filter(feature_toggle_contexts::Column::FeatureToggleId.eq(id))
            .exec(&txn)
            .await?;
        let result = feature_toggles::Entity::delete_many()
            .filter(feature_toggles::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        if result.rows_affected > 0 {
            log::info!("Feature toggle {} deleted", id);
        }

        Ok(())
    }

    async fn remove_all(&self) -> StoreResult<()> {
        let txn = self.db.begin().await?;

        feature_toggle_contexts::Entity::delete_many()
            .exec(&txn)
            .await?;
        let result = feature_toggles::Entity::delete_many().exec(&txn).await?;

        txn.commit().await?;

        log::info!("Deleted all {} feature toggles", result.rows_affected);

        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        match self.db.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => "postgres",
            sea_orm::DatabaseBackend::Sqlite => "sqlite",
            sea_orm::DatabaseBackend::MySql => "mysql",
        }
    }
}
