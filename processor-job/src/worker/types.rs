use queue::QueueMessage;

/// Result type for worker operations
pub type WorkerResult<T> = anyhow::Result<T>;

/// Exit code for a scale-to-zero exit
pub const EXIT_CODE_QUEUE_DRAINED: u8 = 0;
/// Exit code for an exit triggered by host cancellation (128 + SIGINT)
pub const EXIT_CODE_CANCELLED: u8 = 130;

/// Reason the polling loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The empty-poll threshold was reached and host stop was requested
    QueueDrained,
    /// The host cancelled the worker
    Cancelled,
}

impl WorkerExit {
    /// Process exit code for this exit reason
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::QueueDrained => EXIT_CODE_QUEUE_DRAINED,
            Self::Cancelled => EXIT_CODE_CANCELLED,
        }
    }
}

/// States of the polling loop
#[derive(Debug)]
pub(crate) enum PollState {
    Polling,
    Draining(Vec<QueueMessage>),
    Backoff,
    EmptyWait,
    Stopping(WorkerExit),
}

/// Empty-poll bookkeeping for a single run
#[derive(Debug, Default)]
pub(crate) struct PollCycle {
    consecutive_empty_polls: u32,
}

impl PollCycle {
    /// Records an empty poll and returns the updated count
    pub(crate) fn record_empty_poll(&mut self) -> u32 {
        self.consecutive_empty_polls = self.consecutive_empty_polls.saturating_add(1);
        self.consecutive_empty_polls
    }

    /// Resets the count after a non-empty batch
    pub(crate) fn reset(&mut self) {
        self.consecutive_empty_polls = 0;
    }

    pub(crate) const fn consecutive_empty_polls(&self) -> u32 {
        self.consecutive_empty_polls
    }
}
