//! Inbound HTTP control surface.
//!
//! Lets the backend push messages into Discord through the same gateway
//! connection the bot holds.

pub mod routes;
pub mod server;

pub use routes::AppState;
