//! Suspend an in-flight RPC call until a UI event resolves it.
//!
//! A pending-request table keyed by an id, paired with a one-shot reply
//! channel the handler awaits and a hook callback fires into later. Here
//! the "pending request" and "diff state" are the same record
//! (`DiffRegistry`), so the bridge is just the oneshot pair itself plus a
//! monotonic id allocator used for logging/tracing correlation.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;

static NEXT_SUSPENSION_ID: AtomicU64 = AtomicU64::new(1);

/// Final content a suspended diff resolved to, plus which way it went.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The user accepted the diff; carries the final buffer content.
    Saved(String),
    /// The user rejected the diff; no content is returned.
    Rejected,
}

impl Resolution {
    /// The buffer content to hand back as the new file contents, or
    /// `original` if the diff was rejected.
    pub fn into_contents(self, original: &str) -> String {
        match self {
            Resolution::Saved(contents) => contents,
            Resolution::Rejected => original.to_string(),
        }
    }
}

/// The awaiting half of a suspension: held by `DiffController` while it
/// is blocked inside `open_diff_blocking`.
pub struct Suspension {
    id: u64,
    receiver: oneshot::Receiver<Resolution>,
}

/// The resolving half: handed to whichever UI hook (write intercept or
/// close hook) eventually fires, consumed exactly once.
pub struct Resumer {
    id: u64,
    sender: oneshot::Sender<Resolution>,
}

/// Create a fresh suspension/resumer pair.
pub fn bridge() -> (Suspension, Resumer) {
    let id = NEXT_SUSPENSION_ID.fetch_add(1, Ordering::Relaxed);
    let (tx, rx) = oneshot::channel();
    (Suspension { id, receiver: rx }, Resumer { id, sender: tx })
}

impl Suspension {
    /// Correlation id, useful in `tracing` spans.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until a `Resumer` resolves this suspension. Fails only if
    /// the `Resumer` was dropped without resolving, which would be an
    /// internal bug (the registry always resolves or the cleanup path
    /// force-rejects first).
    pub async fn wait(self) -> Resolution {
        self.receiver
            .await
            .unwrap_or(Resolution::Rejected)
    }
}

impl Resumer {
    /// Correlation id, matching the `Suspension` this was paired with.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Resolve the suspension. A `send` failure means the controller
    /// side was already dropped (caller cancelled); swallowed rather
    /// than propagated, since there is no one left to report it to.
    pub fn resolve(self, resolution: Resolution) {
        let _ = self.sender.send(resolution);
    }
}
