//! Process-lifecycle glue around a `DiffController`: on shutdown, every
//! pending diff is force-rejected before the process exits.
//!
//! An RAII guard whose `Drop` impl runs cleanup unconditionally,
//! including on panic unwind.

use std::sync::Arc;

use crate::controller::DiffController;
use crate::host::EditorHost;

/// Guards a `DiffController`'s lifetime: on drop, force-rejects and
/// tears down every diff still open. Hold one of these for the
/// lifetime of the process (or of a test) so no diff outlives it.
pub struct ShutdownGuard<H: EditorHost> {
    controller: Arc<DiffController<H>>,
}

impl<H: EditorHost> ShutdownGuard<H> {
    /// Start guarding `controller`.
    pub fn new(controller: Arc<DiffController<H>>) -> Self {
        Self { controller }
    }

    /// The guarded controller, for handing to an `RpcHandler`.
    pub fn controller(&self) -> Arc<DiffController<H>> {
        self.controller.clone()
    }
}

impl<H: EditorHost> Drop for ShutdownGuard<H> {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}

/// Wait for a Ctrl-C (or, on Unix, SIGTERM) to ask the process to shut
/// down. Used by the demo binary to decide when to drop its
/// `ShutdownGuard`; a real host process would wire this to its own
/// transport's shutdown notification instead.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

/// Wait for a Ctrl-C to ask the process to shut down.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
