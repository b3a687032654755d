use anyhow::{Context, Result};
use counselor_chat::{Coordinator, KeyValueStore, ProfileStore, ThemeStore};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::cli::Cli;
use crate::file_store::JsonFileStore;

/// Application configuration derived from CLI arguments and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend_url: String,
    pub store_path: PathBuf,
}

/// Set up application configuration from CLI arguments
///
/// Precedence: CLI flags > COUNSELOR_* env > defaults (clap resolves the
/// first two).
pub fn setup_from_cli(cli: &Cli) -> Result<AppConfig> {
    let store_path = match &cli.store {
        Some(path) => expand_tilde(path)?,
        None => default_store_path()?,
    };

    Ok(AppConfig {
        backend_url: cli.backend_url.trim().to_string(),
        store_path,
    })
}

/// `~/.counselor/store.json`
pub fn default_store_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(".counselor").join("store.json"))
}

fn home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .context("Failed to get home directory")
}

/// Expand ~ to home directory
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();
    if let Some(rest) = path_str.strip_prefix("~/") {
        Ok(home_dir()?.join(rest))
    } else if path_str == "~" {
        home_dir()
    } else {
        Ok(path.to_path_buf())
    }
}

/// Profile and theme stores sharing the configured store file
pub fn open_stores(config: &AppConfig) -> (ProfileStore, ThemeStore) {
    let backend: Rc<dyn KeyValueStore> = Rc::new(JsonFileStore::new(&config.store_path));
    (ProfileStore::new(backend.clone()), ThemeStore::new(backend))
}

pub fn open_coordinator(config: &AppConfig) -> Coordinator {
    let (profile_store, theme_store) = open_stores(config);
    Coordinator::new(profile_store, theme_store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_explicit_store_path_is_kept() {
        let cli = Cli::try_parse_from(["counselor", "--store", "/tmp/counselor.json"]).unwrap();
        let config = setup_from_cli(&cli).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/counselor.json"));
    }

    #[test]
    fn test_backend_url_flag() {
        let cli = Cli::try_parse_from(["counselor", "--backend-url", " http://localhost:9000 "]).unwrap();
        let config = setup_from_cli(&cli).unwrap();
        assert_eq!(config.backend_url, "http://localhost:9000");
    }

    #[test]
    fn test_expand_tilde() {
        if let Ok(home) = home_dir() {
            assert_eq!(expand_tilde(Path::new("~/x.json")).unwrap(), home.join("x.json"));
            assert_eq!(expand_tilde(Path::new("~")).unwrap(), home);
        }
        assert_eq!(
            expand_tilde(Path::new("relative/x.json")).unwrap(),
            PathBuf::from("relative/x.json")
        );
    }

    #[test]
    fn test_coordinator_reads_store_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            backend_url: counselor_types::DEFAULT_BACKEND_URL.to_string(),
            store_path: dir.path().join("store.json"),
        };
        open_coordinator(&config)
            .set_theme(counselor_types::Theme::Dark)
            .unwrap();
        assert_eq!(open_coordinator(&config).theme(), counselor_types::Theme::Dark);
    }
}
