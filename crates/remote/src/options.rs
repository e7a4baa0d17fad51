//! Tunables for the remote worker pools

use hashictl_core::constants::{
    CONCURRENCY_PER_CORE, DEFAULT_LIST_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS,
    DEFAULT_RESULT_TIMEOUT_SECS, HASHICTL_CONCURRENCY_VAR, HASHICTL_LIST_TIMEOUT_VAR,
    HASHICTL_READ_TIMEOUT_VAR, HASHICTL_RESULT_TIMEOUT_VAR,
};
use std::time::Duration;

/// Worker-pool size and the per-phase timeouts. Exceeding a timeout is a
/// fatal abort for the whole operation.
#[derive(Debug, Clone)]
pub struct RemoteOptions {
    pub concurrency: usize,
    pub list_timeout: Duration,
    pub result_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            concurrency: CONCURRENCY_PER_CORE * num_cpus::get(),
            list_timeout: Duration::from_secs(DEFAULT_LIST_TIMEOUT_SECS),
            result_timeout: Duration::from_secs(DEFAULT_RESULT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

impl RemoteOptions {
    /// Defaults overridden by the `HASHICTL_*` environment variables
    /// where set. Timeout variables are whole seconds.
    pub fn from_env() -> Self {
        let mut opts = Self::default();

        if let Some(concurrency) = read_env_usize(HASHICTL_CONCURRENCY_VAR) {
            if concurrency > 0 {
                opts.concurrency = concurrency;
            }
        }
        if let Some(secs) = read_env_u64(HASHICTL_LIST_TIMEOUT_VAR) {
            opts.list_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_u64(HASHICTL_RESULT_TIMEOUT_VAR) {
            opts.result_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_u64(HASHICTL_READ_TIMEOUT_VAR) {
            opts.read_timeout = Duration::from_secs(secs);
        }

        opts
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        if concurrency > 0 {
            self.concurrency = concurrency;
        }
        self
    }

    #[must_use]
    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_result_timeout(mut self, timeout: Duration) -> Self {
        self.result_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

fn read_env_usize(var: &str) -> Option<usize> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}

fn read_env_u64(var: &str) -> Option<u64> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}
