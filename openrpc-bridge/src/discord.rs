//! Discord implementation of the presence client capability, built on
//! `discord-sdk`.
//!
//! The SDK owns the local IPC socket, handshake, and framing; this module
//! only translates [`ActivityRecord`]s into SDK activity builders and
//! manages the connection lifecycle.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use discord_sdk::{
    Discord, Subscriptions,
    activity::{ActivityBuilder, Assets, Button},
    wheel::{UserState, Wheel},
};
use openrpc_proto::activity::ActivityRecord;

use crate::client::{ClientError, PresenceClient};

/// How long to wait for the Discord client to acknowledge the handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Presence client backed by a locally running Discord application.
pub struct DiscordPresence {
    app_id: i64,
    discord: Option<Discord>,
}

impl std::fmt::Debug for DiscordPresence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordPresence")
            .field("app_id", &self.app_id)
            .field("connected", &self.discord.is_some())
            .finish()
    }
}

impl DiscordPresence {
    /// Creates a disconnected client for the given application ID.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidClientId`] if `client_id` is not a
    /// numeric Discord application ID.
    pub fn new(client_id: &str) -> Result<Self, ClientError> {
        let app_id = client_id
            .parse::<i64>()
            .map_err(|_| ClientError::InvalidClientId(client_id.to_string()))?;
        Ok(Self {
            app_id,
            discord: None,
        })
    }

    /// Returns the live SDK handle, or [`ClientError::NotConnected`].
    fn handle(&self) -> Result<&Discord, ClientError> {
        self.discord.as_ref().ok_or(ClientError::NotConnected)
    }
}

/// Converts a mapped activity record into an SDK activity builder.
fn build_activity(record: &ActivityRecord) -> ActivityBuilder {
    let start = UNIX_EPOCH + Duration::from_secs(u64::try_from(record.start).unwrap_or(0));

    let mut builder = ActivityBuilder::new()
        .details(record.details.clone())
        .state(record.state.clone())
        .start_timestamp(start);

    if record.large_image.is_some() || record.small_image.is_some() {
        let mut assets = Assets::default();
        if let Some(key) = &record.large_image {
            assets = assets.large(key.clone(), record.large_text.clone());
        }
        if let Some(key) = &record.small_image {
            assets = assets.small(key.clone(), record.small_text.clone());
        }
        builder = builder.assets(assets);
    }

    for button in &record.buttons {
        builder = builder.button(Button {
            label: button.label.clone(),
            url: button.url.clone(),
        });
    }

    builder
}

#[async_trait]
impl PresenceClient for DiscordPresence {
    async fn connect(&mut self) -> Result<(), ClientError> {
        let (wheel, handler) = Wheel::new(Box::new(|err| {
            tracing::warn!(error = ?err, "Discord wheel error");
        }));

        let mut user_events = wheel.user();

        let discord = Discord::new(self.app_id, Subscriptions::ACTIVITY, Box::new(handler))?;

        tracing::info!(app_id = self.app_id, "connecting to Discord");

        let user = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_events.0.changed().await.is_err() {
                return Err(ClientError::Disconnected(
                    "connection closed during handshake".to_string(),
                ));
            }
            match &*user_events.0.borrow() {
                UserState::Connected(user) => Ok(user.clone()),
                UserState::Disconnected(err) => Err(ClientError::Disconnected(err.to_string())),
            }
        })
        .await
        .map_err(|_| ClientError::HandshakeTimeout)??;

        tracing::info!(username = %user.username, "connected to Discord");
        self.discord = Some(discord);
        Ok(())
    }

    async fn update(&mut self, record: &ActivityRecord) -> Result<(), ClientError> {
        self.handle()?.update_activity(build_activity(record)).await?;
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), ClientError> {
        self.handle()?.clear_activity().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        if let Some(discord) = self.discord.take() {
            discord.disconnect().await;
            tracing::info!("disconnected from Discord");
        }
        Ok(())
    }
}
