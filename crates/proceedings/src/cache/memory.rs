//! In-process [`CacheStore`] adapter.

use tokio::sync::RwLock;

use super::*;

/// A [`CacheStore`] kept entirely in memory.
///
/// Nothing survives the process unless it is dumped to a snapshot. This is the adapter
/// tests use in place of a real backend.
#[derive(Debug, Default)]
pub struct MemoryCache {
  /// Normalized title → downloaded flag
  entries: RwLock<HashMap<String, bool>>,
}

impl MemoryCache {
  /// Creates an empty cache.
  pub fn new() -> Self { Self::default() }

  /// Creates a cache pre-populated with the given outcomes.
  pub fn with_entries<I, K>(entries: I) -> Self
  where
    I: IntoIterator<Item = (K, bool)>,
    K: Into<String>, {
    let entries = entries.into_iter().map(|(key, flag)| (key.into(), flag)).collect();
    Self { entries: RwLock::new(entries) }
  }

  /// Number of recorded outcomes.
  pub async fn len(&self) -> usize { self.entries.read().await.len() }

  /// Whether nothing is recorded.
  pub async fn is_empty(&self) -> bool { self.entries.read().await.is_empty() }
}

#[async_trait]
impl CacheStore for MemoryCache {
  async fn get(&self, key: &str) -> Result<Option<bool>> {
    Ok(self.entries.read().await.get(key).copied())
  }

  async fn set(&self, key: &str, downloaded: bool) -> Result<()> {
    self.entries.write().await.insert(key.to_owned(), downloaded);
    Ok(())
  }

  async fn clear(&self) -> Result<()> {
    self.entries.write().await.clear();
    Ok(())
  }

  async fn entries(&self) -> Result<BTreeMap<String, bool>> {
    Ok(self.entries.read().await.iter().map(|(key, flag)| (key.clone(), *flag)).collect())
  }
}
