//! Durable [`CacheStore`] adapter backed by SQLite.
//!
//! All statements run on the single background thread owned by the async connection, so
//! concurrent `set` calls from download tasks are serialized without extra locking.

use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use super::*;

/// A [`CacheStore`] persisted in a SQLite database file.
pub struct SqliteCache {
  /// Async SQLite connection handle
  conn: Connection,
}

impl SqliteCache {
  /// Opens an existing checkpoint database or creates a new one at the specified path.
  ///
  /// Parent directories are created as needed. Any failure to open or initialize the
  /// database is reported as [`ProceedingsError::CacheUnavailable`], since a run must not
  /// proceed without a working checkpoint.
  ///
  /// # Examples
  ///
  /// ```no_run
  /// # use proceedings::cache::SqliteCache;
  /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
  /// let cache = SqliteCache::open(SqliteCache::default_path()).await?;
  /// # Ok(())
  /// # }
  /// ```
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let unavailable = |e: &dyn std::error::Error| {
      ProceedingsError::CacheUnavailable(format!("{}: {e}", path.display()))
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(|e| unavailable(&e))?;
    }

    let conn = Connection::open(path).await.map_err(|e| unavailable(&e))?;
    Self::init(conn).await.map_err(|e| unavailable(&e))
  }

  /// Opens a private in-memory database, mostly useful for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .await
      .map_err(|e| ProceedingsError::CacheUnavailable(e.to_string()))?;
    Self::init(conn).await
  }

  /// Returns the default path for the checkpoint database.
  ///
  /// - On Unix: `~/.local/share/proceedings/checkpoints.db`
  /// - On macOS: `~/Library/Application Support/proceedings/checkpoints.db`
  /// - On Windows: `%APPDATA%\proceedings\checkpoints.db`
  /// - Fallback: `./proceedings/checkpoints.db`
  pub fn default_path() -> PathBuf {
    dirs::data_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join("proceedings")
      .join("checkpoints.db")
  }

  /// Applies the schema.
  async fn init(conn: Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(include_str!(concat!(
          env!("CARGO_MANIFEST_DIR"),
          "/migrations/init.sql"
        )))?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }
}

#[async_trait]
impl CacheStore for SqliteCache {
  async fn get(&self, key: &str) -> Result<Option<bool>> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare_cached("SELECT downloaded FROM checkpoints WHERE title = ?1")?;
        Ok(stmt.query_row(params![key], |row| row.get::<_, bool>(0)).optional()?)
      })
      .await
      .map_err(ProceedingsError::from)
  }

  async fn set(&self, key: &str, downloaded: bool) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "INSERT INTO checkpoints (title, downloaded, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(title) DO UPDATE SET
             downloaded = excluded.downloaded,
             updated_at = excluded.updated_at",
        )?;
        stmt.execute(params![key, downloaded, Utc::now()])?;
        Ok(())
      })
      .await
      .map_err(ProceedingsError::from)
  }

  async fn clear(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM checkpoints", [])?;
        Ok(())
      })
      .await
      .map_err(ProceedingsError::from)
  }

  async fn entries(&self) -> Result<BTreeMap<String, bool>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached("SELECT title, downloaded FROM checkpoints")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)))?
          .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
        Ok(rows)
      })
      .await
      .map_err(ProceedingsError::from)
  }

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await
      .map_err(|e| ProceedingsError::CacheUnavailable(e.to_string()))
  }
}
