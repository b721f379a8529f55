use crate::app::ports::HandoffPort;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Stores each key as `{dir}/{key}.json`.
pub struct FileHandoff {
    dir: PathBuf,
}

impl FileHandoff {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.trim_matches('/')))
    }
}

#[async_trait]
impl HandoffPort for FileHandoff {
    async fn push(&self, key: &str, json: String) -> Result<(), String> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| e.to_string())?;
        }
        tokio::fs::write(&path, json).await.map_err(|e| e.to_string())
    }

    async fn pull(&self, key: &str) -> Result<String, String> {
        let path = self.path_for(key);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[derive(Default)]
pub struct InMemoryHandoff {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryHandoff {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HandoffPort for InMemoryHandoff {
    async fn push(&self, key: &str, json: String) -> Result<(), String> {
        self.entries
            .lock()
            .map_err(|e| e.to_string())?
            .insert(key.to_string(), json);
        Ok(())
    }

    async fn pull(&self, key: &str) -> Result<String, String> {
        self.entries
            .lock()
            .map_err(|e| e.to_string())?
            .get(key)
            .cloned()
            .ok_or_else(|| format!("no message under key {key}"))
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        self.entries.lock().map_err(|e| e.to_string())?.remove(key);
        Ok(())
    }
}
