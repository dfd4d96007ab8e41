//! Presence client capability.
//!
//! The bridge never speaks the Discord IPC protocol itself; it drives a
//! client that does through this narrow trait. Production uses
//! [`crate::discord::DiscordPresence`]; tests substitute a fake without
//! reproducing the vendor protocol.

use async_trait::async_trait;
use openrpc_proto::activity::ActivityRecord;

/// Errors surfaced by a presence client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured client ID is not a valid Discord application ID.
    #[error("invalid client ID {0:?}: expected a numeric Discord application ID")]
    InvalidClientId(String),

    /// The Discord client did not complete the handshake in time.
    #[error("timed out waiting for the Discord handshake")]
    HandshakeTimeout,

    /// An operation was attempted before `connect` succeeded.
    #[error("not connected to Discord")]
    NotConnected,

    /// The Discord client dropped the connection during the handshake.
    #[error("disconnected from Discord: {0}")]
    Disconnected(String),

    /// Error reported by the underlying SDK.
    #[error(transparent)]
    Sdk(#[from] discord_sdk::Error),
}

/// Capability consumed by the bridge: a persistent local connection to a
/// presence-rendering application.
///
/// Handshake, framing, and reconnect semantics belong to the
/// implementation. The bridge serializes all calls through a mutex, so
/// implementations are not required to be safe for concurrent use.
#[async_trait]
pub trait PresenceClient: Send + Sync {
    /// Establishes the connection. Failure here is fatal at startup.
    async fn connect(&mut self) -> Result<(), ClientError>;

    /// Pushes a new activity. Failure is non-fatal and reported to the
    /// HTTP caller.
    async fn update(&mut self, record: &ActivityRecord) -> Result<(), ClientError>;

    /// Removes the current activity.
    async fn clear(&mut self) -> Result<(), ClientError>;

    /// Tears down the connection.
    async fn close(&mut self) -> Result<(), ClientError>;
}
