//! In-memory store for tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    store::{CURRENT_PLAYBOOK, PlaybookStore, Result, StoreError, is_valid_name},
    types::Playbook,
};

/// In-memory store backed by `HashMap`. No persistence.
#[derive(Default)]
pub struct MemoryStore {
    playbooks: Mutex<HashMap<String, Playbook>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor seeding the default playbook.
    pub fn with_current(playbook: Playbook) -> Self {
        let store = Self::new();
        store
            .playbooks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(CURRENT_PLAYBOOK.to_string(), playbook);
        store
    }
}

#[async_trait]
impl PlaybookStore for MemoryStore {
    async fn load(&self, name: &str) -> Result<Playbook> {
        if !is_valid_name(name) {
            return Err(StoreError::invalid_name(name));
        }
        let playbooks = self.playbooks.lock().unwrap_or_else(|e| e.into_inner());
        match playbooks.get(name) {
            Some(playbook) => Ok(playbook.clone()),
            None if name == CURRENT_PLAYBOOK => Ok(Playbook::default()),
            None => Err(StoreError::not_found(name)),
        }
    }

    async fn save(&self, name: &str, playbook: &Playbook) -> Result<()> {
        if !is_valid_name(name) {
            return Err(StoreError::invalid_name(name));
        }
        let mut playbooks = self.playbooks.lock().unwrap_or_else(|e| e.into_inner());
        playbooks.insert(name.to_string(), playbook.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let playbooks = self.playbooks.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = playbooks
            .keys()
            .filter(|n| n.as_str() != CURRENT_PLAYBOOK)
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        if name == CURRENT_PLAYBOOK {
            return Err(StoreError::Reserved);
        }
        if !is_valid_name(name) {
            return Err(StoreError::invalid_name(name));
        }
        let mut playbooks = self.playbooks.lock().unwrap_or_else(|e| e.into_inner());
        if playbooks.remove(name).is_none() {
            return Err(StoreError::not_found(name));
        }
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn behaves_like_the_file_store() {
        let store = MemoryStore::new();

        assert_eq!(
            store.load(CURRENT_PLAYBOOK).await.unwrap(),
            Playbook::default()
        );
        assert!(store.load("gone").await.is_err());

        store.save("one", &Playbook::default()).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["one"]);

        store.delete("one").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.delete(CURRENT_PLAYBOOK).await,
            Err(StoreError::Reserved)
        ));
    }
}
