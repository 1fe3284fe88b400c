//! Persisted UI preferences.
//!
//! Two booleans (theme, sidebar collapse) stored as one namespaced JSON
//! record that survives restarts. The record is rehydrated synchronously at
//! startup, before the first frame is drawn, so themed content never flashes
//! the wrong palette. Hosts without durable storage fall back to a no-op
//! backend: writes are accepted for the session and discarded.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Storage key for the single preference record.
const NAMESPACE: &str = "root";

/// Schema for the preference table.
const PREFS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    namespace TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// The persisted preference record. Always defined: absent storage or a
/// missing record reads as the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
  pub is_dark_mode: bool,
  pub is_sidebar_collapsed: bool,
}

/// Backend for the preference record.
pub trait PrefsStorage: Send {
  /// Load the record, `None` when nothing was persisted yet.
  fn load(&self) -> Result<Option<Preferences>>;

  fn save(&self, prefs: &Preferences) -> Result<()>;
}

/// Backend for environments without durable storage: reads find nothing,
/// writes are accepted and discarded.
pub struct NoopStorage;

impl PrefsStorage for NoopStorage {
  fn load(&self) -> Result<Option<Preferences>> {
    Ok(None)
  }

  fn save(&self, _prefs: &Preferences) -> Result<()> {
    Ok(())
  }
}

/// SQLite-backed preference storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the preference database at the default location.
  pub fn open_default() -> Result<Self> {
    Self::open(&Self::default_path()?)
  }

  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create preferences directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open preferences database at {}: {}", path.display(), e))?;
    conn
      .execute_batch(PREFS_SCHEMA)
      .map_err(|e| eyre!("Failed to run preferences migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("taskdeck").join("prefs.db"))
  }
}

impl PrefsStorage for SqliteStorage {
  fn load(&self) -> Result<Option<Preferences>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT data FROM preferences WHERE namespace = ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let data: Option<Vec<u8>> = stmt.query_row(params![NAMESPACE], |row| row.get(0)).ok();

    match data {
      Some(data) => {
        let prefs = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to parse preference record: {}", e))?;
        Ok(Some(prefs))
      }
      None => Ok(None),
    }
  }

  fn save(&self, prefs: &Preferences) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data =
      serde_json::to_vec(prefs).map_err(|e| eyre!("Failed to serialize preferences: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO preferences (namespace, data, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![NAMESPACE, data],
      )
      .map_err(|e| eyre!("Failed to store preferences: {}", e))?;

    Ok(())
  }
}

/// In-memory preference state with write-through persistence.
pub struct PrefsStore {
  prefs: Preferences,
  storage: Box<dyn PrefsStorage>,
}

impl PrefsStore {
  /// Rehydrate from storage, falling back to defaults when nothing was
  /// persisted or the record cannot be read.
  pub fn load(storage: Box<dyn PrefsStorage>) -> Self {
    let prefs = match storage.load() {
      Ok(Some(prefs)) => prefs,
      Ok(None) => Preferences::default(),
      Err(err) => {
        warn!(error = %err, "failed to rehydrate preferences, using defaults");
        Preferences::default()
      }
    };
    Self { prefs, storage }
  }

  pub fn get(&self) -> Preferences {
    self.prefs
  }

  pub fn is_dark_mode(&self) -> bool {
    self.prefs.is_dark_mode
  }

  pub fn is_sidebar_collapsed(&self) -> bool {
    self.prefs.is_sidebar_collapsed
  }

  pub fn set_dark_mode(&mut self, on: bool) {
    self.prefs.is_dark_mode = on;
    self.persist();
  }

  pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
    self.prefs.is_sidebar_collapsed = collapsed;
    self.persist();
  }

  pub fn toggle_dark_mode(&mut self) {
    self.set_dark_mode(!self.prefs.is_dark_mode);
  }

  pub fn toggle_sidebar(&mut self) {
    self.set_sidebar_collapsed(!self.prefs.is_sidebar_collapsed);
  }

  /// Back to defaults, persisted. Mainly for tests.
  pub fn reset(&mut self) {
    self.prefs = Preferences::default();
    self.persist();
  }

  fn persist(&self) {
    // Persistence failures degrade to session-only preferences.
    if let Err(err) = self.storage.save(&self.prefs) {
      warn!(error = %err, "failed to persist preferences");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_db(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("taskdeck-test-{}-{}.db", name, std::process::id()))
  }

  #[test]
  fn test_defaults_when_nothing_persisted() {
    let store = PrefsStore::load(Box::new(NoopStorage));
    assert!(!store.is_dark_mode());
    assert!(!store.is_sidebar_collapsed());
  }

  #[test]
  fn test_round_trip_across_reload() {
    let path = temp_db("roundtrip");
    let _ = std::fs::remove_file(&path);

    {
      let storage = SqliteStorage::open(&path).unwrap();
      let mut store = PrefsStore::load(Box::new(storage));
      store.set_dark_mode(true);
      store.set_sidebar_collapsed(true);
    }

    // Simulated reload: a fresh store over the same database.
    let storage = SqliteStorage::open(&path).unwrap();
    let store = PrefsStore::load(Box::new(storage));
    assert!(store.is_dark_mode());
    assert!(store.is_sidebar_collapsed());

    let _ = std::fs::remove_file(&path);
  }

  #[test]
  fn test_noop_storage_holds_within_session_only() {
    let mut store = PrefsStore::load(Box::new(NoopStorage));
    store.set_dark_mode(true);
    assert!(store.is_dark_mode());

    // A fresh process over the same (noop) backend starts from defaults.
    let fresh = PrefsStore::load(Box::new(NoopStorage));
    assert!(!fresh.is_dark_mode());
  }

  #[test]
  fn test_reset_restores_defaults() {
    let path = temp_db("reset");
    let _ = std::fs::remove_file(&path);

    let storage = SqliteStorage::open(&path).unwrap();
    let mut store = PrefsStore::load(Box::new(storage));
    store.set_dark_mode(true);
    store.reset();
    assert_eq!(store.get(), Preferences::default());

    let _ = std::fs::remove_file(&path);
  }

  #[test]
  fn test_record_uses_camel_case_wire_names() {
    let prefs = Preferences {
      is_dark_mode: true,
      is_sidebar_collapsed: false,
    };
    let json = serde_json::to_value(prefs).unwrap();
    assert_eq!(json["isDarkMode"], true);
    assert_eq!(json["isSidebarCollapsed"], false);
  }
}
