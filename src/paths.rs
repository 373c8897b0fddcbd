//! Config file location
//!
//! # Environment Variables
//!
//! - `BAMBOO_IPA_SYNC_CONFIG` - Config file path (also settable with `--config`)
//! - `BAMBOO_IPA_SYNC_CONFIG_DIR` - Directory holding `config.toml`
//!
//! # Resolution Priority
//!
//! 1. `--config` flag or `BAMBOO_IPA_SYNC_CONFIG`
//! 2. `BAMBOO_IPA_SYNC_CONFIG_DIR/config.toml`
//! 3. `XDG_CONFIG_HOME/bamboo-ipa-sync/config.toml` (if set)
//! 4. `~/.config/bamboo-ipa-sync/config.toml`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "BAMBOO_IPA_SYNC_CONFIG_DIR";

const APP_DIR: &str = "bamboo-ipa-sync";
const CONFIG_FILE: &str = "config.toml";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        let path = expand(&xdg_config).join(APP_DIR);
        log::debug!("Using XDG config dir: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Resolve the config file, preferring an explicit path.
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path = expand(&path.to_string_lossy());
        log::debug!("Using config file: {}", path.display());
        return Ok(path);
    }
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes tests that touch process environment
    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// This function uses unsafe env::set_var/remove_var which can cause issues
    /// if other threads read environment variables concurrently.
    /// Only use in single-threaded test contexts.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: Tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    /// Helper to run a test with env var removed
    fn without_env_var<F, R>(key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::remove_var(key) };
        let result = f();
        if let Some(v) = original {
            // SAFETY: Tests run in isolation
            unsafe { env::set_var(key, v) };
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        let _guard = env_lock();
        with_env_var(ENV_CONFIG_DIR, "/custom/config/path", || {
            let result = config_dir().unwrap();
            assert_eq!(result, PathBuf::from("/custom/config/path"));
        });
    }

    #[test]
    fn test_config_dir_env_override_with_tilde() {
        let _guard = env_lock();
        let home = dirs::home_dir().unwrap();
        let expected = home.join("dotfiles").join("bamboo-ipa-sync-tilde-test");
        with_env_var(ENV_CONFIG_DIR, "~/dotfiles/bamboo-ipa-sync-tilde-test", || {
            let result = config_dir().unwrap();
            assert_eq!(result, expected);
        });
    }

    #[test]
    fn test_xdg_config_home() {
        let _guard = env_lock();
        without_env_var(ENV_CONFIG_DIR, || {
            with_env_var("XDG_CONFIG_HOME", "/tmp/xdg-config-test", || {
                let result = config_dir().unwrap();
                assert_eq!(result, PathBuf::from("/tmp/xdg-config-test/bamboo-ipa-sync"));
            });
        });
    }

    #[test]
    fn test_explicit_config_file_wins() {
        let _guard = env_lock();
        with_env_var(ENV_CONFIG_DIR, "/ignored", || {
            let result = config_file(Some(Path::new("/etc/sync.toml"))).unwrap();
            assert_eq!(result, PathBuf::from("/etc/sync.toml"));
        });
    }

    #[test]
    fn test_config_file_in_config_dir() {
        let _guard = env_lock();
        with_env_var(ENV_CONFIG_DIR, "/opt/sync", || {
            let result = config_file(None).unwrap();
            assert_eq!(result, PathBuf::from("/opt/sync/config.toml"));
        });
    }
}
