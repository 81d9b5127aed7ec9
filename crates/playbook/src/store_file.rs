//! JSON file-backed playbook store with atomic writes.

use std::path::PathBuf;

use {async_trait::async_trait, tokio::fs};

use crate::{
    store::{CURRENT_PLAYBOOK, PlaybookStore, Result, StoreError, is_valid_name},
    types::Playbook,
};

/// File-backed store. One pretty-printed JSON document per playbook under a
/// single directory; the reserved default lives at `current.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !is_valid_name(name) {
            return Err(StoreError::invalid_name(name));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    /// Atomic write: write to temp, rename over target, keep `.bak`.
    async fn atomic_write(&self, path: &PathBuf, playbook: &Playbook) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(playbook)?;
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json.as_bytes()).await?;

        if fs::try_exists(path).await.unwrap_or(false) {
            let bak = path.with_extension("json.bak");
            let _ = fs::rename(path, &bak).await;
        }

        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl PlaybookStore for FileStore {
    async fn load(&self, name: &str) -> Result<Playbook> {
        let path = self.path_for(name)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            if name == CURRENT_PLAYBOOK {
                return Ok(Playbook::default());
            }
            return Err(StoreError::not_found(name));
        }
        let data = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn save(&self, name: &str, playbook: &Playbook) -> Result<()> {
        let path = self.path_for(name)?;
        self.atomic_write(&path, playbook).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        if !fs::try_exists(&self.dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem != CURRENT_PLAYBOOK && is_valid_name(stem) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        if name == CURRENT_PLAYBOOK {
            return Err(StoreError::Reserved);
        }
        let path = self.path_for(name)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::not_found(name));
        }
        fs::remove_file(&path).await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::types::PromptSpec, tempfile::TempDir};

    fn make_store(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("playbooks"))
    }

    fn make_playbook(text: &str) -> Playbook {
        Playbook {
            prompts: vec![PromptSpec {
                text: text.into(),
                retries: 3,
                enabled: true,
            }],
            ..Playbook::default()
        }
    }

    #[tokio::test]
    async fn missing_current_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);
        let playbook = store.load(CURRENT_PLAYBOOK).await.unwrap();
        assert_eq!(playbook, Playbook::default());
    }

    #[tokio::test]
    async fn missing_named_playbook_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);
        assert!(matches!(
            store.load("archived").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);

        let playbook = make_playbook("draw {{animal}}");
        store.save(CURRENT_PLAYBOOK, &playbook).await.unwrap();

        let back = store.load(CURRENT_PLAYBOOK).await.unwrap();
        assert_eq!(back, playbook);
    }

    #[tokio::test]
    async fn save_keeps_backup_of_previous_version() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);

        store
            .save(CURRENT_PLAYBOOK, &make_playbook("one"))
            .await
            .unwrap();
        store
            .save(CURRENT_PLAYBOOK, &make_playbook("two"))
            .await
            .unwrap();

        let bak = tmp.path().join("playbooks").join("current.json.bak");
        assert!(bak.exists());
    }

    #[tokio::test]
    async fn list_excludes_reserved_default() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);

        store
            .save(CURRENT_PLAYBOOK, &make_playbook("a"))
            .await
            .unwrap();
        store.save("zebra", &make_playbook("b")).await.unwrap();
        store.save("alpha", &make_playbook("c")).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["alpha", "zebra"]);
    }

    #[tokio::test]
    async fn list_on_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_named_playbook() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);

        store.save("old", &make_playbook("x")).await.unwrap();
        store.delete("old").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.delete("old").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_of_default_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);
        assert!(matches!(
            store.delete(CURRENT_PLAYBOOK).await,
            Err(StoreError::Reserved)
        ));
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp);
        assert!(matches!(
            store.save("../evil", &Playbook::default()).await,
            Err(StoreError::InvalidName { .. })
        ));
        assert!(matches!(
            store.load("a/b").await,
            Err(StoreError::InvalidName { .. })
        ));
    }
}
