//! Discord gateway integration.
//!
//! This module owns everything that touches the persistent gateway
//! connection: slash-command registration and handling, the per-invocation
//! dispatch state machine, and the bridge the HTTP surface sends through.

pub mod bot;
pub mod bridge;
pub mod commands;
pub mod dispatcher;

// Re-export main types for external use
pub use bot::build_client;
pub use bridge::{Gateway, GatewayBridge};
pub use dispatcher::{Command, CommandDispatcher, Invocation, Reply};
