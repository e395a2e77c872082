use std::time::Duration;

use crate::types::environment::Environment;

/// Configuration for the polling worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Maximum number of messages received per poll
    pub batch_size: u32,
    /// How long received messages stay invisible to other receivers
    pub visibility_timeout: Duration,
    /// Delay after an empty poll and after a failed receive
    pub poll_delay: Duration,
    /// Consecutive empty polls after which the worker requests host stop
    pub empty_poll_threshold: u32,
}

impl WorkerConfig {
    /// Creates a new `WorkerConfig` from the given environment
    #[must_use]
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            batch_size: env.batch_size(),
            visibility_timeout: env.visibility_timeout(),
            poll_delay: env.poll_delay(),
            empty_poll_threshold: env.empty_poll_threshold(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            visibility_timeout: Duration::from_secs(60),
            poll_delay: Duration::from_secs(10),
            empty_poll_threshold: 3,
        }
    }
}
