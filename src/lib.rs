//! diffbridge - the interactive diff subsystem of an editor-side AI
//! assistant integration server.
//!
//! An external assistant proposes new file content; this crate renders an
//! editable diff inside a host editor, blocks the caller until the user
//! accepts or rejects it, and returns the final content.

#![deny(missing_docs)]

pub mod config;
pub mod controller;
pub mod errors;
pub mod filetype;
pub mod headless;
pub mod host;
pub mod inline_diff;
pub mod lifecycle;
pub mod proto;
pub mod registry;
pub mod rpc;
pub mod state;
pub mod suspension;
pub mod text;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{Config, ConfigError};
pub use controller::DiffController;
pub use errors::DiffError;
pub use host::EditorHost;
pub use proto::{ErrorEnvelope, ToolReply};
pub use registry::DiffRegistry;
pub use rpc::RpcHandler;
pub use state::{DiffRequest, DiffState, Layout, Orientation, Status};
