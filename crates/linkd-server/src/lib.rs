//! Configuration for the linkd server binary.

use std::path::{Path, PathBuf};

use linkd_api::Settings;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Longest accepted code lifetime: one week.
pub const MAX_CODE_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Runtime server configuration, deserialised from `config.toml` and
/// `LINKD_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Lifetime of email verification and password reset codes.
  pub code_ttl_minutes: i64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             8080,
      store_path:       PathBuf::from("linkd.db"),
      code_ttl_minutes: 1,
    }
  }
}

impl ServerConfig {
  /// Layer the optional file at `path` under `LINKD_`-prefixed environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LINKD"))
      .build()?
      .try_deserialize::<Self>()?
      .validated()
  }

  fn validated(self) -> Result<Self, config::ConfigError> {
    if !(1..=MAX_CODE_TTL_MINUTES).contains(&self.code_ttl_minutes) {
      return Err(config::ConfigError::Message(format!(
        "code_ttl_minutes must be between 1 and {MAX_CODE_TTL_MINUTES}, got {}",
        self.code_ttl_minutes
      )));
    }
    Ok(self)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn api_settings(&self) -> Settings {
    Settings { code_ttl: chrono::Duration::minutes(self.code_ttl_minutes) }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
