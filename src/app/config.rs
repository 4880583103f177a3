use serde::de::DeserializeOwned;

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};

use crate::error::*;
use crate::http::{DEFAULT_API_BASE, DEFAULT_STORAGE_PATH};

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub conf: Config
}

impl AppConfig {
  /// Load config.  With `config_file` only that file (plus defaults) is read,
  /// otherwise `conf/default`, `conf/$RUN_MODE` and `APP_*` environment
  /// variables are layered in that order.
  pub fn new(config_file: Option<&str>) -> Result<Self> {
    let mut builder = Config::builder()
      .set_default("api.base_url", DEFAULT_API_BASE)?
      .set_default("storage.path", DEFAULT_STORAGE_PATH)?
      .add_source(File::with_name("conf/default").required(false));

    if let Some(config_file) = config_file {
      builder = builder.add_source(File::with_name(config_file));
    } else {
      // Get RUN_MODE from environment
      let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
      builder = builder
        .add_source(File::with_name(&format!("conf/{}", env)).required(false))
        // Allow overrides from environment, e.g. APP_API__BASE_URL
        .add_source(Environment::with_prefix("app").prefix_separator("_").separator("__"));
    }

    Ok(AppConfig {
      conf: builder.build()?,
    })
  }

  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
    match self.conf.get::<T>(key) {
      Ok(val) => Ok(Some(val)),
      Err(ConfigError::NotFound(_)) => Ok(None),
      Err(err) => Err(err.into()),
    }
  }

  pub fn get_str(&self, key: &str) -> Result<Option<String>> {
    self.get(key)
  }

  pub fn get_path(&self, key: &str) -> Result<Option<PathBuf>> {
    Ok(self.get_str(key)?.map(PathBuf::from))
  }

  pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
    self.get(key)
  }

  pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
    self.get(key)
  }
}
