//! Durable credential storage. Holds exactly one value: the bearer token,
//! kept under a fixed name, surviving process restart until explicit logout
//! or a failed session restore.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;

/// Fixed name the token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Trait for persisting the bearer token across process restarts.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, token: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Token store backed by a single file on disk.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, token).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory implementation of [`TokenStore`], used in tests.
pub struct InMemoryTokenStore {
    values: Arc<DashMap<String, String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self {
            values: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.values.get(TOKEN_KEY).map(|entry| entry.clone()))
    }

    async fn save(&self, token: &str) -> Result<()> {
        self.values.insert(TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.values.remove(TOKEN_KEY);
        Ok(())
    }
}
