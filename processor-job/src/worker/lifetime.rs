use tokio_util::sync::CancellationToken;
use tracing::info;

/// Capability to ask the hosting process to shut down
pub trait HostLifetime: Send + Sync {
    /// Requests that the host stops the application
    fn request_stop(&self);
}

/// `HostLifetime` backed by the application's root shutdown token
///
/// Requesting a stop cancels the token, which shuts down every component that watches it.
#[derive(Debug, Clone)]
pub struct ApplicationLifetime {
    shutdown_token: CancellationToken,
}

impl ApplicationLifetime {
    /// Creates a lifetime that cancels `shutdown_token` on stop
    #[must_use]
    pub const fn new(shutdown_token: CancellationToken) -> Self {
        Self { shutdown_token }
    }
}

impl HostLifetime for ApplicationLifetime {
    fn request_stop(&self) {
        info!("Application stop requested");
        self.shutdown_token.cancel();
    }
}
