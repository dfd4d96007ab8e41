//! Inbound presence update request as posted over HTTP.

use serde::Deserialize;

/// A presence update request body.
///
/// Every field is optional; absent fields fall back to defaults when the
/// request is mapped into an [`crate::activity::ActivityRecord`]. Unknown
/// fields are ignored and `null` is treated the same as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PresenceUpdate {
    /// First line of the activity display.
    pub details: Option<String>,
    /// Second line of the activity display.
    pub state: Option<String>,
    /// Asset key for the large image.
    pub large_image: Option<String>,
    /// Hover text for the large image.
    pub large_text: Option<String>,
    /// Asset key for the small image.
    pub small_image: Option<String>,
    /// Hover text for the small image.
    pub small_text: Option<String>,
    /// Join link; becomes the "Join Game" button.
    pub url: Option<String>,
    /// Profile link; becomes the "View Profile" button.
    pub profile_url: Option<String>,
}

impl PresenceUpdate {
    /// Returns the field as a `&str` only when present and non-empty.
    ///
    /// Empty strings gate images and buttons the same way as absent fields.
    pub(crate) fn non_empty(field: Option<&String>) -> Option<&str> {
        field.map(String::as_str).filter(|s| !s.is_empty())
    }
}
