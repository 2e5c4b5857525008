use std::{collections::HashMap, path::PathBuf, time::Duration};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

/// Last raw response stored for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub city: String,
    pub snapshot: Value,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(city: impl Into<String>, snapshot: Value) -> Self {
        Self { city: city.into(), snapshot, cached_at: Utc::now() }
    }

    /// An entry is stale once more than `ttl` has passed since it was written.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.cached_at > ttl,
            Err(_) => false,
        }
    }
}

/// Durable per-city store. Writes are advisory: callers log failures and
/// carry on.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn put(&self, entry: CacheEntry) -> Result<()>;
    async fn get(&self, city: &str) -> Result<Option<CacheEntry>>;
}

/// JSON map of city → entry in the platform cache directory.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-widget", "weather-widget")
            .ok_or_else(|| anyhow!("Could not determine platform cache directory"))?;

        Ok(dirs.cache_dir().join("weather-cache.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, CacheEntry>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse cache file: {}", self.path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read cache file: {}", self.path.display())),
        }
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn put(&self, entry: CacheEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_all().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "discarding unreadable cache file");
            HashMap::new()
        });
        entries.insert(entry.city.clone(), entry);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&entries).context("Failed to serialize cache")?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write cache file: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace cache file: {}", self.path.display()))?;

        Ok(())
    }

    async fn get(&self, city: &str) -> Result<Option<CacheEntry>> {
        Ok(self.read_all().await?.remove(city))
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.entries.write().await.insert(entry.city.clone(), entry);
        Ok(())
    }

    async fn get(&self, city: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(city).cloned())
    }
}
