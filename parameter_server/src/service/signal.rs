use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Shared between a running service and its request handlers to end the serve loop.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    exhausted: AtomicBool,
}

impl ShutdownSignal {
    /// Asks the service to stop.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Marks the error budget as exhausted, stopping the service if `shutdown` is set.
    pub fn trip(&self, shutdown: bool) {
        self.exhausted.store(true, Ordering::Release);

        if shutdown {
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    /// Waits until the service was asked to stop.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
