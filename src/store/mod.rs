//! Toggle store abstraction.
//!
//! Supports multiple backends:
//! - `db`: relational storage through SeaORM (Postgres, SQLite)
//! - `memory`: process-local storage for development and tests
//!
//! Every operation is a single atomic step from the caller's point of view.

pub mod db;
pub mod memory;

pub use db::DbToggleStore;
pub use memory::MemoryToggleStore;

use crate::orm::contexts::ContextName;
use crate::toggle::{FeatureToggle, FeatureToggleUpdateRequest};
use crate::validation::ToggleError;
use async_trait::async_trait;
use sea_orm::DbErr;

/// Store operation errors.
#[derive(Debug)]
pub enum StoreError {
    /// Key or name failed validation
    Invalid(ToggleError),
    /// No toggle with this id
    NotFound(i32),
    /// A toggle with this key already exists
    Conflict(String),
    /// Database error
    Database(DbErr),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Invalid(e) => write!(f, "{}", e),
            StoreError::NotFound(id) => write!(f, "Feature toggle {} not found", id),
            StoreError::Conflict(key) => write!(f, "Feature key '{}' already exists", key),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ToggleError> for StoreError {
    fn from(e: ToggleError) -> Self {
        StoreError::Invalid(e)
    }
}

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for toggle storage backends.
///
/// Listings are ordered by toggle id and re-read on every call.
#[async_trait]
pub trait ToggleStore: Send + Sync {
    /// Toggles switched on in `context`.
    async fn get_all_active(&self, context: ContextName) -> StoreResult<Vec<FeatureToggle>>;

    /// Every toggle, active or not.
    async fn get_all(&self) -> StoreResult<Vec<FeatureToggle>>;

    async fn get_by_id(&self, id: i32) -> StoreResult<FeatureToggle>;

    /// Create a toggle, switched off in every known context.
    ///
    /// Fails with `Invalid` on a malformed key or blank name and `Conflict` if
    /// the key is taken.
    async fn create(&self, key: &str, name: &str, description: &str)
        -> StoreResult<FeatureToggle>;

    /// Apply the fields present in `request`. The key never changes.
    async fn update(
        &self,
        id: i32,
        request: FeatureToggleUpdateRequest,
    ) -> StoreResult<FeatureToggle>;

    /// Delete a toggle and its context associations. Unknown ids are not an error.
    async fn remove_by_id(&self, id: i32) -> StoreResult<()>;

    async fn remove_all(&self) -> StoreResult<()>;

    /// Verify the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Name for logs
    fn backend_name(&self) -> &'static str;
}
