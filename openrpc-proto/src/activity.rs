//! Normalized activity record sent to the presence client.
//!
//! [`ActivityRecord::from_update`] is the single mapping step between an
//! inbound [`PresenceUpdate`] and the activity handed to the client:
//! defaults for missing fields, truncation of every text field, and the
//! two-button assembly rule.

use serde::Serialize;

use crate::update::PresenceUpdate;

/// Maximum length in characters of any text field sent downstream.
pub const MAX_TEXT_LEN: usize = 128;

/// Maximum number of action buttons on an activity.
pub const MAX_BUTTONS: usize = 2;

/// Default first line when the request carries no `details`.
pub const DEFAULT_DETAILS: &str = "Playing Roblox";

/// Default second line when the request carries no `state`.
pub const DEFAULT_STATE: &str = "In Game";

/// Default hover text for the large image.
pub const DEFAULT_LARGE_TEXT: &str = "Roblox";

/// Default hover text for the small image.
pub const DEFAULT_SMALL_TEXT: &str = "Player";

/// Label for the button built from the `url` field.
const JOIN_LABEL: &str = "Join Game";

/// Label for the button built from the `profile_url` field.
const PROFILE_LABEL: &str = "View Profile";

/// An action button on an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    /// Visible button label.
    pub label: String,
    /// Link opened when the button is clicked.
    pub url: String,
}

/// The normalized, truncated, defaulted activity sent to the presence
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    /// First line, at most [`MAX_TEXT_LEN`] characters.
    pub details: String,
    /// Second line, at most [`MAX_TEXT_LEN`] characters.
    pub state: String,
    /// Epoch seconds shown as the elapsed-time anchor. Always the fixed
    /// process start time, not the time of the update.
    pub start: i64,
    /// Large image asset key, omitted when the request had none.
    pub large_image: Option<String>,
    /// Large image hover text, present iff `large_image` is.
    pub large_text: Option<String>,
    /// Small image asset key, omitted when the request had none.
    pub small_image: Option<String>,
    /// Small image hover text, present iff `small_image` is.
    pub small_text: Option<String>,
    /// At most [`MAX_BUTTONS`] buttons, "Join Game" first.
    pub buttons: Vec<Button>,
}

impl ActivityRecord {
    /// Maps an inbound request into an activity record.
    ///
    /// Pure and total: an empty request maps to an all-defaults record.
    /// `start` is the bridge's process start timestamp in epoch seconds.
    #[must_use]
    pub fn from_update(update: &PresenceUpdate, start: i64) -> Self {
        let (large_image, large_text) =
            image_pair(update.large_image.as_ref(), update.large_text.as_ref(), DEFAULT_LARGE_TEXT);
        let (small_image, small_text) =
            image_pair(update.small_image.as_ref(), update.small_text.as_ref(), DEFAULT_SMALL_TEXT);

        let mut buttons = Vec::new();
        if let Some(url) = PresenceUpdate::non_empty(update.url.as_ref()) {
            buttons.push(Button {
                label: JOIN_LABEL.to_string(),
                url: url.to_string(),
            });
        }
        if let Some(url) = PresenceUpdate::non_empty(update.profile_url.as_ref())
            && buttons.len() < MAX_BUTTONS
        {
            buttons.push(Button {
                label: PROFILE_LABEL.to_string(),
                url: url.to_string(),
            });
        }

        Self {
            details: truncate(update.details.as_deref().unwrap_or(DEFAULT_DETAILS)),
            state: truncate(update.state.as_deref().unwrap_or(DEFAULT_STATE)),
            start,
            large_image,
            large_text,
            small_image,
            small_text,
            buttons,
        }
    }
}

/// Resolves an image asset key and its hover text.
///
/// The pair is included only when the asset key is present and non-empty;
/// the hover text falls back to `default_text` and is truncated.
fn image_pair(
    image: Option<&String>,
    text: Option<&String>,
    default_text: &str,
) -> (Option<String>, Option<String>) {
    PresenceUpdate::non_empty(image).map_or((None, None), |key| {
        let text = text.map(String::as_str).unwrap_or(default_text);
        (Some(key.to_string()), Some(truncate(text)))
    })
}

/// Truncates a string to [`MAX_TEXT_LEN`] characters (code points, matching
/// the limit the presence service enforces on text fields).
fn truncate(s: &str) -> String {
    s.chars().take(MAX_TEXT_LEN).collect()
}
