//! Persistent storage for the session token.

use std::{
  fs, io,
  path::{Path, PathBuf},
  sync::Mutex,
};

/// Where the bearer token lives between runs.
///
/// Read on every request, written on login or signup, cleared on logout.
#[derive(Debug)]
pub enum TokenStore {
  File(PathBuf),
  Memory(Mutex<Option<String>>),
}

impl TokenStore {
  pub fn file(path: impl Into<PathBuf>) -> Self { Self::File(path.into()) }

  pub fn in_memory() -> Self { Self::Memory(Mutex::new(None)) }

  /// `$XDG_CONFIG_HOME/linkd/token`, or `~/.config/linkd/token`.
  pub fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
      .filter(|v| !v.is_empty())
      .map(PathBuf::from)
      .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;
    Some(base.join("linkd").join("token"))
  }

  /// The stored token, if any. Unreadable or blank files count as no token.
  pub fn load(&self) -> Option<String> {
    let token = match self {
      Self::File(path) => fs::read_to_string(path).ok()?,
      Self::Memory(slot) => slot.lock().ok()?.clone()?,
    };
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_owned())
  }

  pub fn save(&self, token: &str) -> io::Result<()> {
    match self {
      Self::File(path) => {
        if let Some(dir) = path.parent() {
          fs::create_dir_all(dir)?;
        }
        fs::write(path, token)
      }
      Self::Memory(slot) => {
        *slot.lock().map_err(|e| io::Error::other(e.to_string()))? = Some(token.to_owned());
        Ok(())
      }
    }
  }

  pub fn clear(&self) -> io::Result<()> {
    match self {
      Self::File(path) => match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
      },
      Self::Memory(slot) => {
        *slot.lock().map_err(|e| io::Error::other(e.to_string()))? = None;
        Ok(())
      }
    }
  }
}
