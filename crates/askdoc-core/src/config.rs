//! Environment-backed configuration.
//!
//! `ConfigStore::load()` discovers a `.env` file by walking up from the
//! working directory and merges it into the process environment exactly once
//! per process, no matter how many stores are constructed. Variables already
//! present in the ambient environment always win over file-sourced values.
//! Keys are then read on demand through `get` / `get_or` / `require`.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{AskdocError, Result};

/// Result of the one-time `.env` merge: the file that was loaded, if any.
static DOTENV: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Read-only accessor for environment-sourced configuration.
///
/// Construct once in `main` and pass by reference to everything that needs
/// configuration; every instance reads the same process-wide state.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// `.env` file merged into the environment, if one was discovered.
    dotenv_path: Option<PathBuf>,
}

impl ConfigStore {
    /// Load configuration, running the `.env` discovery and merge if this is
    /// the first store constructed in the process.
    pub fn load() -> Self {
        let path = DOTENV.get_or_init(|| {
            #[cfg(test)]
            tests::MERGE_RUNS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let start = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            merge_env_file(&start)
        });
        Self {
            dotenv_path: path.clone(),
        }
    }

    /// Value for `key`, or `None` when the variable is unset.
    ///
    /// A variable set to the empty string is returned as-is.
    pub fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    /// Value for `key`, or `default` when the variable is unset.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Value for `key`; an unset variable or an empty value is a
    /// configuration error naming the key.
    pub fn require(&self, key: &str) -> Result<String> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(AskdocError::Config(key.to_string())),
        }
    }

    /// The `.env` file merged at first load, if any.
    pub fn dotenv_path(&self) -> Option<&Path> {
        self.dotenv_path.as_deref()
    }
}

/// Search `start` and its ancestors for a `.env` file and merge it into the
/// process environment without overwriting existing variables. A missing
/// file is not an error; an unreadable one is logged and skipped.
fn merge_env_file(start: &Path) -> Option<PathBuf> {
    let path = find_dotenv(start)?;
    match dotenvy::from_path(&path) {
        Ok(()) => {
            tracing::debug!("merged environment file {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::warn!("could not load {}: {e}", path.display());
            None
        }
    }
}

/// First `.env` file found in `start` or any of its ancestors.
fn find_dotenv(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// How many times the one-time merge in `load` actually ran. Process-wide,
    /// so it can never exceed 1 no matter which test initializes first.
    pub(super) static MERGE_RUNS: AtomicUsize = AtomicUsize::new(0);

    // Each test touches its own uniquely named variables so the parallel
    // test harness cannot interfere.

    #[test]
    fn test_get_unset_returns_none() {
        let config = ConfigStore::load();
        assert_eq!(config.get("ASKDOC_TEST_NEVER_SET"), None);
    }

    #[test]
    fn test_get_or_falls_back_to_default() {
        let config = ConfigStore::load();
        assert_eq!(config.get_or("ASKDOC_TEST_NEVER_SET_2", "fallback"), "fallback");
    }

    #[test]
    fn test_get_returns_set_value() {
        unsafe { std::env::set_var("ASKDOC_TEST_GET", "value") };
        let config = ConfigStore::load();
        assert_eq!(config.get("ASKDOC_TEST_GET").as_deref(), Some("value"));
    }

    #[test]
    fn test_require_returns_value_exactly() {
        unsafe { std::env::set_var("ASKDOC_TEST_REQUIRE", " spaced ") };
        let config = ConfigStore::load();
        assert_eq!(config.require("ASKDOC_TEST_REQUIRE").unwrap(), " spaced ");
    }

    #[test]
    fn test_require_missing_fails_naming_key() {
        let config = ConfigStore::load();
        let err = config.require("ASKDOC_TEST_MISSING").unwrap_err();
        assert!(matches!(err, AskdocError::Config(_)));
        assert!(err.to_string().contains("ASKDOC_TEST_MISSING"));
    }

    #[test]
    fn test_require_empty_fails() {
        unsafe { std::env::set_var("ASKDOC_TEST_EMPTY", "") };
        let config = ConfigStore::load();
        assert!(config.require("ASKDOC_TEST_EMPTY").is_err());
    }

    #[test]
    fn test_get_empty_value_is_returned_as_is() {
        unsafe { std::env::set_var("ASKDOC_TEST_EMPTY_GET", "") };
        let config = ConfigStore::load();
        assert_eq!(config.get("ASKDOC_TEST_EMPTY_GET").as_deref(), Some(""));
    }

    #[test]
    fn test_find_dotenv_in_start_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "A=1\n").unwrap();
        assert_eq!(
            find_dotenv(dir.path()),
            Some(dir.path().join(".env"))
        );
    }

    #[test]
    fn test_find_dotenv_walks_up_to_parent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "A=1\n").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_dotenv(&nested), Some(dir.path().join(".env")));
    }

    #[test]
    fn test_find_dotenv_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_dotenv(dir.path()), None);
    }

    #[test]
    fn test_merge_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(merge_env_file(dir.path()), None);
    }

    #[test]
    fn test_merge_loads_new_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "ASKDOC_TEST_FROM_FILE=loaded\n").unwrap();
        let merged = merge_env_file(dir.path());
        assert_eq!(merged, Some(dir.path().join(".env")));
        assert_eq!(std::env::var("ASKDOC_TEST_FROM_FILE").unwrap(), "loaded");
    }

    #[test]
    fn test_ambient_environment_wins_over_file() {
        unsafe { std::env::set_var("ASKDOC_TEST_PRECEDENCE", "ambient") };
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "ASKDOC_TEST_PRECEDENCE=file\n").unwrap();
        merge_env_file(dir.path());
        assert_eq!(std::env::var("ASKDOC_TEST_PRECEDENCE").unwrap(), "ambient");
    }

    #[test]
    fn test_load_is_idempotent() {
        let first = ConfigStore::load();
        let second = ConfigStore::load();
        assert_eq!(first.dotenv_path(), second.dotenv_path());
    }

    #[test]
    fn test_concurrent_first_access_agrees() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| ConfigStore::load().dotenv_path.clone()))
            .collect();
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.join().unwrap());
        }
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
        // Every load above completed, yet the merge ran exactly once.
        assert_eq!(MERGE_RUNS.load(Ordering::SeqCst), 1);
    }
}
