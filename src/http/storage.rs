use log::*;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::*;

/// Key the bearer token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Durable string key-value storage.
pub trait TokenStorage: Send + Sync {
  fn get_item(&self, key: &str) -> Result<Option<String>>;

  fn set_item(&self, key: &str, value: &str) -> Result<()>;

  fn remove_item(&self, key: &str) -> Result<()>;
}

/// Storage kept in a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
  path: PathBuf,
}

impl FileStorage {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    Self {
      path: path.into(),
    }
  }

  /// Stored items, plus whether the file is corrupt and must be rewritten.
  /// A corrupt file reads as empty.
  fn load(&self) -> Result<(HashMap<String, String>, bool)> {
    if !self.path.exists() {
      return Ok((HashMap::new(), false));
    }
    let raw = fs::read(&self.path)?;
    if raw.iter().all(u8::is_ascii_whitespace) {
      return Ok((HashMap::new(), false));
    }
    match serde_json::from_slice(&raw) {
      Ok(items) => Ok((items, false)),
      Err(err) => {
        warn!("storage: ignoring corrupt {}: {}", self.path.display(), err);
        Ok((HashMap::new(), true))
      },
    }
  }

  /// Replace the file atomically: write a sibling temp file, then rename.
  fn save(&self, items: &HashMap<String, String>) -> Result<()> {
    let dir = match self.path.parent() {
      Some(dir) if !dir.as_os_str().is_empty() => dir,
      _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, items)?;
    file.as_file().sync_all()?;
    file.persist(&self.path).map_err(|e| e.error)?;
    Ok(())
  }
}

impl TokenStorage for FileStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>> {
    Ok(self.load()?.0.remove(key))
  }

  fn set_item(&self, key: &str, value: &str) -> Result<()> {
    let (mut items, _) = self.load()?;
    items.insert(key.to_string(), value.to_string());
    debug!("storage: set {:?} in {}", key, self.path.display());
    self.save(&items)
  }

  fn remove_item(&self, key: &str) -> Result<()> {
    let (mut items, corrupt) = self.load()?;
    if items.remove(key).is_some() || corrupt {
      debug!("storage: removed {:?} from {}", key, self.path.display());
      self.save(&items)?;
    }
    Ok(())
  }
}

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Default::default()
  }

  fn items(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
    self.items.lock()
      .map_err(|_| Error::Other(anyhow::anyhow!("memory storage lock poisoned")))
  }
}

impl TokenStorage for MemoryStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>> {
    Ok(self.items()?.get(key).cloned())
  }

  fn set_item(&self, key: &str, value: &str) -> Result<()> {
    self.items()?.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove_item(&self, key: &str) -> Result<()> {
    self.items()?.remove(key);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.json");

    let storage = FileStorage::new(&path);
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
    storage.set_item(TOKEN_KEY, "jwt.token.here").unwrap();
    storage.set_item("theme", "dark").unwrap();

    let reopened = FileStorage::new(&path);
    assert_eq!(reopened.get_item(TOKEN_KEY).unwrap().as_deref(), Some("jwt.token.here"));

    reopened.remove_item(TOKEN_KEY).unwrap();
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));
  }

  #[test]
  fn file_storage_rewrites_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    fs::write(&path, r#"{"token": "abc"#).unwrap();

    let storage = FileStorage::new(&path);
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);

    storage.remove_item(TOKEN_KEY).unwrap();
    let items: HashMap<String, String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(items.is_empty());

    fs::write(&path, "not json").unwrap();
    storage.set_item(TOKEN_KEY, "fresh").unwrap();
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
  }

  #[test]
  fn file_storage_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let storage = FileStorage::new(&path);
    storage.set_item(TOKEN_KEY, "abc").unwrap();
    storage.set_item(TOKEN_KEY, "def").unwrap();

    let names: Vec<_> = fs::read_dir(dir.path()).unwrap()
      .map(|entry| entry.unwrap().file_name())
      .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("storage.json")]);
  }

  #[test]
  fn memory_storage_round_trip() {
    let storage = MemoryStorage::new();
    storage.set_item(TOKEN_KEY, "abc").unwrap();
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
    storage.remove_item(TOKEN_KEY).unwrap();
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
  }
}
