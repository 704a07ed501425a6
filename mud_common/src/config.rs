//! Layered configuration loading.
//!
//! A config type `T` implements [`Default`] + `serde::Deserialize` +
//! `serde::Serialize`. [`load`] reads `path` if it exists, falling back to
//! `T::default()` on any read or parse error (logged, not fatal; config
//! files are operator-editable, and a missing/bad file shouldn't stop the
//! server any more than it stops a default install). It always writes a
//! reference copy of the defaults to `default_path`, so operators can diff
//! their config against what the server actually assumes, the way the
//! teacher's `Config::new(path, default_path, default_src)` does.

use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("could not parse config at `{path}`: {source}")]
  Parse { path: String, source: toml::de::Error },
}

/// Loads a config of type `T` from `path`, falling back to `T::default()` if
/// the file is missing. Writes the default configuration to `default_path`
/// as a reference, warning (not failing) if that write doesn't succeed.
pub fn load<T>(path: &Path, default_path: &Path) -> Result<T, ConfigError>
where
  T: Default + DeserializeOwned + Serialize,
{
  let default = T::default();
  match toml::to_string_pretty(&default) {
    Ok(src) => {
      if let Err(e) = fs::write(default_path, src) {
        warn!("could not write default configuration to `{}`: {}", default_path.display(), e);
      }
    }
    Err(e) => warn!("could not serialize default configuration: {}", e),
  }

  match fs::read_to_string(path) {
    Ok(src) => toml::from_str(&src).map_err(|source| ConfigError::Parse {
      path: path.display().to_string(),
      source,
    }),
    Err(e) => {
      info!("no config at `{}` ({}), using defaults", path.display(), e);
      Ok(default)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, PartialEq, Serialize, Deserialize)]
  struct Example {
    port: u16,
  }
  impl Default for Example {
    fn default() -> Self { Example { port: 4040 } }
  }

  #[test]
  fn missing_file_uses_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    let default_path = dir.path().join("server-default.toml");
    let cfg: Example = load(&path, &default_path).unwrap();
    assert_eq!(cfg, Example::default());
    assert!(default_path.exists());
  }

  #[test]
  fn present_file_overrides_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    let default_path = dir.path().join("server-default.toml");
    fs::write(&path, "port = 9999\n").unwrap();
    let cfg: Example = load(&path, &default_path).unwrap();
    assert_eq!(cfg.port, 9999);
  }

  #[test]
  fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    let default_path = dir.path().join("server-default.toml");
    fs::write(&path, "port = [[[").unwrap();
    let err = load::<Example>(&path, &default_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }
}
