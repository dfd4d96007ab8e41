//! Shared presence types for the `OpenRPC` bridge.
//!
//! Defines the inbound HTTP request shape ([`update::PresenceUpdate`]) and
//! the normalized activity sent to the presence client
//! ([`activity::ActivityRecord`]), along with the defaulting and truncation
//! rules that map one to the other.

pub mod activity;
pub mod update;
