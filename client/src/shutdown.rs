//! Signal handling and single-flight shutdown coordination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

/// Cancellation flag observed by a running session loop.
///
/// The flag is written by the [`ShutdownCoordinator`] and only polled by
/// the loop, so a relaxed atomic is all the synchronization required.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Drives at most one shutdown sequence no matter how many termination
/// signals arrive.
///
/// The coordinator owns the cancellation flag handed to the session; the
/// session releases its connection on its own way out of the loop, so the
/// coordinator's job is to guarantee the flag flips exactly once and that
/// overlapping signals do not restart the sequence.
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    handle: ShutdownHandle,
    in_progress: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the session loop to poll.
    pub fn handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// Requests shutdown. Returns `true` for the caller that actually
    /// initiated it; concurrent calls while shutdown is underway are
    /// no-ops.
    pub fn request(&self) -> bool {
        let initiated = self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if initiated {
            self.handle.cancel();
        }
        initiated
    }

    /// Spawns a task that waits for SIGINT or SIGTERM and requests
    /// shutdown. Repeated signals while the first shutdown is in flight
    /// are absorbed with a log line.
    pub fn listen(&self) -> tokio::task::JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let mut interrupt = match signal(SignalKind::interrupt()) {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%err, "failed to install SIGINT handler");
                    return;
                }
            };
            let mut terminate = match signal(SignalKind::terminate()) {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%err, "failed to install SIGTERM handler");
                    return;
                }
            };

            loop {
                tokio::select! {
                    _ = interrupt.recv() => info!("received SIGINT"),
                    _ = terminate.recv() => info!("received SIGTERM"),
                }
                if coordinator.request() {
                    info!("shutdown requested, finishing current cycle");
                } else {
                    info!("shutdown already in progress");
                }
            }
        })
    }
}
