//! `OpenRPC` Bridge library.
//!
//! Exposes the bridge server for use in tests and embedding. The server
//! accepts presence updates over HTTP and forwards them to a locally
//! running Discord client through the [`client::PresenceClient`]
//! capability.

pub mod client;
pub mod config;
pub mod discord;
pub mod server;
