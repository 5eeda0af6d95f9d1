//! Process-local toggle storage.
//!
//! Useful for local development and tests. Nothing survives a restart.

use super::{StoreError, StoreResult, ToggleStore};
use crate::orm::contexts::ContextName;
use crate::toggle::{Context, FeatureToggle, FeatureToggleUpdateRequest};
use crate::validation::check_toggle_identity;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Inner {
    /// Keyed by id so listings come out in id order
    toggles: BTreeMap<i32, FeatureToggle>,
    last_id: i32,
}

pub struct MemoryToggleStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryToggleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryToggleStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    // A panic while holding the lock cannot leave a half-written toggle, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Context rows are fixed: ids follow `ContextName::all()` order starting at 1.
    fn context(name: ContextName, active: bool) -> Context {
        let id = ContextName::all()
            .iter()
            .position(|c| *c == name)
            .map(|i| i as i32 + 1)
            .unwrap_or_default();

        Context {
            id,
            name,
            label: name.default_label().to_string(),
            active,
        }
    }
}

#[async_trait]
impl ToggleStore for MemoryToggleStore {
    async fn get_all_active(&self, context: ContextName) -> StoreResult<Vec<FeatureToggle>> {
        Ok(self
            .read()
            .toggles
            .values()
            .filter(|t| t.is_active_in(context))
            .cloned()
            .collect())
    }

    async fn get_all(&self) -> StoreResult<Vec<FeatureToggle>> {
        Ok(self.read().toggles.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> StoreResult<FeatureToggle> {
        self.read()
            .toggles
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(
        &self,
        key: &str,
        name: &str,
        description: &str,
    ) -> StoreResult<FeatureToggle> {
        check_toggle_identity(key, name)?;

        let mut inner = self.write();
        if inner.toggles.values().any(|t| t.key() == key) {
            return Err(StoreError::Conflict(key.to_string()));
        }

        let id = inner.last_id + 1;
        let contexts = ContextName::all()
            .into_iter()
            .map(|c| Self::context(c, false))
            .collect();
        let toggle = FeatureToggle::new(id, key, name, description, contexts)?;

        inner.last_id = id;
        inner.toggles.insert(id, toggle.clone());
        log::info!("Feature toggle '{}' created with id {}", key, id);

        Ok(toggle)
    }

    async fn update(
        &self,
        id: i32,
        request: FeatureToggleUpdateRequest,
    ) -> StoreResult<FeatureToggle> {
        let mut inner = self.write();
        let stored = inner.toggles.get(&id).ok_or(StoreError::NotFound(id))?;

        // Work on a copy so a rejected request leaves the stored toggle alone.
        let mut toggle = stored.clone();
        if let Some(name) = request.name {
            toggle.rename(name)?;
        }
        if let Some(description) = request.description {
            toggle.set_description(description);
        }
        for activation in request.contexts.unwrap_or_default() {
            if !toggle.set_active(activation.name, activation.active) {
                toggle.add_context(Self::context(activation.name, activation.active));
            }
        }

        inner.toggles.insert(id, toggle.clone());
        log::info!("Feature toggle '{}' updated", toggle.key());

        Ok(toggle)
    }

    async fn remove_by_id(&self, id: i32) -> StoreResult<()> {
        if let Some(toggle) = self.write().toggles.remove(&id) {
            log::info!("Feature toggle '{}' deleted", toggle.key());
        }
        Ok(())
    }

    async fn remove_all(&self) -> StoreResult<()> {
        let mut inner = self.write();
        let count = inner.toggles.len();
        inner.toggles.clear();
        log::info!("Deleted all {} feature toggles", count);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toggle::ContextActivation;
    use crate::validation::ToggleError;

    #[actix_rt::test]
    async fn test_create_then_get_round_trip() {
        let store = MemoryToggleStore::new();
        let created = store.create("k", "n", "d").await.unwrap();

        let fetched = store.get_by_id(created.id()).await.unwrap();
        assert_eq!(fetched.key(), "k");
        assert_eq!(fetched.name(), "n");
        assert_eq!(fetched.description(), "d");
        assert_eq!(fetched.contexts().len(), 2);
        assert!(fetched.contexts().iter().all(|c| !c.active));
    }

    #[actix_rt::test]
    async fn test_ids_are_not_reused() {
        let store = MemoryToggleStore::new();
        let first = store.create("first", "n", "").await.unwrap();
        store.remove_by_id(first.id()).await.unwrap();
        let second = store.create("second", "n", "").await.unwrap();
        assert!(second.id() > first.id());
    }

    #[actix_rt::test]
    async fn test_create_validates_and_rejects_duplicates() {
        let store = MemoryToggleStore::new();
        assert!(matches!(
            store.create("key_", "n", "").await,
            Err(StoreError::Invalid(ToggleError::InvalidKey(_)))
        ));
        assert!(matches!(
            store.create("key", "", "").await,
            Err(StoreError::Invalid(ToggleError::InvalidName))
        ));

        store.create("key", "n", "").await.unwrap();
        assert!(matches!(
            store.create("key", "other", "").await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[actix_rt::test]
    async fn test_update_activation_and_active_listing() {
        let store = MemoryToggleStore::new();
        let toggle = store.create("key", "n", "").await.unwrap();
        store.create("other", "n", "").await.unwrap();
        assert!(store
            .get_all_active(ContextName::Testing)
            .await
            .unwrap()
            .is_empty());

        let request = FeatureToggleUpdateRequest {
            contexts: Some(vec![ContextActivation {
                name: ContextName::Testing,
                active: true,
            }]),
            ..Default::default()
        };
        store.update(toggle.id(), request).await.unwrap();

        let active = store.get_all_active(ContextName::Testing).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].key(), "key");
        assert!(store
            .get_all_active(ContextName::Production)
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_rt::test]
    async fn test_rejected_update_changes_nothing() {
        let store = MemoryToggleStore::new();
        let toggle = store.create("key", "n", "d").await.unwrap();

        let request = FeatureToggleUpdateRequest {
            name: Some(" ".into()),
            description: Some("changed".into()),
            ..Default::default()
        };
        assert!(store.update(toggle.id(), request).await.is_err());

        let stored = store.get_by_id(toggle.id()).await.unwrap();
        assert_eq!(stored, toggle);
    }

    #[actix_rt::test]
    async fn test_remove_all() {
        let store = MemoryToggleStore::new();
        store.create("a", "n", "").await.unwrap();
        store.create("b", "n", "").await.unwrap();
        store.remove_all().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
