//! Defaults and environment variable names for addrcache.

// ═══════════════════════════════════════════════════════════════════════════════
// EXPIRY DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default maximum age of a cached address, in [`DEFAULT_TIME_UNIT`] units.
pub const DEFAULT_MAX_AGE: u64 = 60;

/// Default unit of [`DEFAULT_MAX_AGE`].
pub const DEFAULT_TIME_UNIT: crate::types::TimeUnit = crate::types::TimeUnit::Seconds;

/// Default number of worker threads firing expiry timers.
///
/// Raise it for caches that see millions of insertions; it only affects
/// expiry latency jitter, never correctness.
pub const DEFAULT_EXPIRY_WORKERS: usize = 4;

/// Thread name given to expiry workers.
pub const EXPIRY_WORKER_THREAD_NAME: &str = "addrcache-expiry";

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Environment variable holding the maximum age.
pub const ENV_MAX_AGE: &str = "ADDRCACHE_MAX_AGE";

/// Environment variable holding the time unit of the maximum age.
pub const ENV_TIME_UNIT: &str = "ADDRCACHE_TIME_UNIT";

/// Environment variable holding the expiry worker count.
pub const ENV_EXPIRY_WORKERS: &str = "ADDRCACHE_EXPIRY_WORKERS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        assert!(DEFAULT_MAX_AGE > 0);
        assert!(DEFAULT_EXPIRY_WORKERS > 0);
    }

    #[test]
    fn test_env_names_unique() {
        let names = [ENV_MAX_AGE, ENV_TIME_UNIT, ENV_EXPIRY_WORKERS];
        for (i, a) in names.iter().enumerate() {
            for (j, b) in names.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Environment variable names must be unique");
                }
            }
        }
    }
}
