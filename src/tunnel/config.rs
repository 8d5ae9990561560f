//! Configuration resolution for the tunnel.
//!
//! Values are resolved with a three-tier priority:
//!
//! 1. **Parameter** - Explicitly provided function parameter (highest priority)
//! 2. **Environment Variable** - Value from environment variable
//! 3. **Default** - Built-in default value (lowest priority)
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SFTP_PROBE_TIMEOUT` | 3s | Reachability probe timeout in seconds |

use std::env;

/// Default reachability probe timeout in seconds
pub(crate) const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Environment variable name for the reachability probe timeout
pub(crate) const PROBE_TIMEOUT_ENV_VAR: &str = "SFTP_PROBE_TIMEOUT";

/// Resolve the probe timeout value with priority: parameter -> env var -> default
pub(crate) fn resolve_probe_timeout(timeout_param: Option<u64>) -> u64 {
    if let Some(timeout) = timeout_param {
        return timeout;
    }

    if let Ok(env_timeout) = env::var(PROBE_TIMEOUT_ENV_VAR)
        && let Ok(timeout) = env_timeout.parse::<u64>()
    {
        return timeout;
    }

    DEFAULT_PROBE_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Use a mutex to serialize env var tests to avoid race conditions
    static ENV_TEST_MUTEX: once_cell::sync::Lazy<StdMutex<()>> =
        once_cell::sync::Lazy::new(|| StdMutex::new(()));

    /// Helper to set an environment variable safely within tests.
    /// SAFETY: Must be called while holding ENV_TEST_MUTEX to prevent data races.
    unsafe fn set_env(key: &str, value: &str) {
        // SAFETY: Caller ensures ENV_TEST_MUTEX is held
        unsafe { env::set_var(key, value) };
    }

    /// Helper to remove an environment variable safely within tests.
    /// SAFETY: Must be called while holding ENV_TEST_MUTEX to prevent data races.
    unsafe fn remove_env(key: &str) {
        // SAFETY: Caller ensures ENV_TEST_MUTEX is held
        unsafe { env::remove_var(key) };
    }

    #[test]
    fn test_uses_param_when_provided() {
        let result = resolve_probe_timeout(Some(10));
        assert_eq!(result, 10);
    }

    #[test]
    fn test_param_takes_priority_over_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
        unsafe {
            set_env(PROBE_TIMEOUT_ENV_VAR, "30");
        }
        let result = resolve_probe_timeout(Some(5));
        // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
        unsafe {
            remove_env(PROBE_TIMEOUT_ENV_VAR);
        }
        assert_eq!(result, 5);
    }

    #[test]
    fn test_uses_env_var_when_no_param() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
        unsafe {
            set_env(PROBE_TIMEOUT_ENV_VAR, "7");
        }
        let result = resolve_probe_timeout(None);
        // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
        unsafe {
            remove_env(PROBE_TIMEOUT_ENV_VAR);
        }
        assert_eq!(result, 7);
    }

    #[test]
    fn test_uses_default_when_no_param_or_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
        unsafe {
            remove_env(PROBE_TIMEOUT_ENV_VAR);
        }
        let result = resolve_probe_timeout(None);
        assert_eq!(result, DEFAULT_PROBE_TIMEOUT_SECS);
    }

    #[test]
    fn test_ignores_invalid_env_var() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
        unsafe {
            set_env(PROBE_TIMEOUT_ENV_VAR, "not_a_number");
        }
        let result = resolve_probe_timeout(None);
        // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
        unsafe {
            remove_env(PROBE_TIMEOUT_ENV_VAR);
        }
        assert_eq!(result, DEFAULT_PROBE_TIMEOUT_SECS);
    }
}
