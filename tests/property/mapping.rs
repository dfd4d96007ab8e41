//! Property-based tests for the update mapping.
//!
//! Uses proptest to verify, for arbitrary inputs:
//! 1. Every mapped text field is at most 128 characters.
//! 2. At most 2 buttons are ever produced, "Join Game" always first.
//! 3. Truncation preserves the input prefix.
//! 4. Arbitrary JSON objects never fail to parse into an update.

use proptest::prelude::*;

use openrpc_proto::activity::{ActivityRecord, MAX_BUTTONS, MAX_TEXT_LEN};
use openrpc_proto::update::PresenceUpdate;

/// Strategy for an optional text field, including empty and oversized
/// values.
fn arb_field() -> impl Strategy<Value = Option<String>> {
    prop::option::of(".{0,300}")
}

/// Strategy for generating arbitrary `PresenceUpdate` values.
fn arb_update() -> impl Strategy<Value = PresenceUpdate> {
    (
        arb_field(),
        arb_field(),
        arb_field(),
        arb_field(),
        arb_field(),
        arb_field(),
        arb_field(),
        arb_field(),
    )
        .prop_map(
            |(details, state, large_image, large_text, small_image, small_text, url, profile_url)| {
                PresenceUpdate {
                    details,
                    state,
                    large_image,
                    large_text,
                    small_image,
                    small_text,
                    url,
                    profile_url,
                }
            },
        )
}

proptest! {
    #[test]
    fn mapped_text_fields_never_exceed_limit(update in arb_update(), start in any::<i64>()) {
        let record = ActivityRecord::from_update(&update, start);

        prop_assert!(record.details.chars().count() <= MAX_TEXT_LEN);
        prop_assert!(record.state.chars().count() <= MAX_TEXT_LEN);
        if let Some(text) = &record.large_text {
            prop_assert!(text.chars().count() <= MAX_TEXT_LEN);
        }
        if let Some(text) = &record.small_text {
            prop_assert!(text.chars().count() <= MAX_TEXT_LEN);
        }
    }

    #[test]
    fn at_most_two_buttons_join_game_first(update in arb_update()) {
        let record = ActivityRecord::from_update(&update, 0);

        prop_assert!(record.buttons.len() <= MAX_BUTTONS);
        if record.buttons.len() == 2 {
            prop_assert_eq!(&record.buttons[0].label, "Join Game");
            prop_assert_eq!(&record.buttons[1].label, "View Profile");
        }
    }

    #[test]
    fn image_text_present_iff_image_present(update in arb_update()) {
        let record = ActivityRecord::from_update(&update, 0);

        prop_assert_eq!(record.large_image.is_some(), record.large_text.is_some());
        prop_assert_eq!(record.small_image.is_some(), record.small_text.is_some());
    }

    #[test]
    fn truncation_preserves_prefix(details in ".{0,300}") {
        let update = PresenceUpdate {
            details: Some(details.clone()),
            ..Default::default()
        };
        let record = ActivityRecord::from_update(&update, 0);

        prop_assert!(details.starts_with(&record.details));
    }

    #[test]
    fn start_passes_through_unchanged(start in any::<i64>()) {
        let record = ActivityRecord::from_update(&PresenceUpdate::default(), start);
        prop_assert_eq!(record.start, start);
    }

    #[test]
    fn arbitrary_string_fields_parse(details in ".{0,300}", extra in ".{0,50}") {
        let json = serde_json::json!({ "details": details, "unknown_field": extra });
        let parsed: Result<PresenceUpdate, _> = serde_json::from_value(json);
        prop_assert!(parsed.is_ok());
    }
}
