//! Typed wrappers for the backend's REST resources.
//!
//! Each handle is obtained from a [`Client`](crate::Client) accessor and
//! borrows nothing; it holds a clone of the client.
//!
//! | Handle | Accessor | Backend prefix |
//! |--------|----------|----------------|
//! | [`AgentsApi`] | `client.agents()` | `/agents` |
//! | [`WalletsApi`] | `client.wallets()` | `/wallets` |
//! | [`IntentsApi`] | `client.intents()` | `/intents` |
//! | [`CommerceApi`] | `client.commerce()` | `/commerce` |
//! | [`DataApi`] | `client.data()` | `/data` |
//! | [`AiApi`] | `client.ai()` | `/ai` |
//! | [`HealthApi`] | `client.health()` | `/health`, `/info` |
//!
//! Identifiers interpolated into paths are percent-encoded, so an id
//! containing `/` or `?` still addresses a single resource.

pub mod agents;
pub mod ai;
pub mod commerce;
pub mod data;
pub mod health;
pub mod intents;
pub mod wallets;

pub use agents::AgentsApi;
pub use ai::AiApi;
pub use commerce::CommerceApi;
pub use data::DataApi;
pub use health::HealthApi;
pub use intents::IntentsApi;
pub use wallets::WalletsApi;

use serde::{Deserialize, Serialize};

/// The `{"message": ...}` body returned by cancel-style actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}

/// Percent-encodes `value` for use as one path segment.
pub(crate) fn segment(value: &str) -> String {
    // form encoding writes spaces as `+`; a literal `+` is already `%2B`
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Joins comma-separated list parameters the way the backend splits them.
pub(crate) fn comma_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<&str>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_escapes_reserved_characters() {
        assert_eq!(segment("agent-1"), "agent-1");
        assert_eq!(segment("a/b?c d+e#f"), "a%2Fb%3Fc%20d%2Be%23f");
        assert_eq!(segment("é"), "%C3%A9");
    }

    #[test]
    fn test_comma_list() {
        assert_eq!(comma_list(&["aave", "benqi"]), "aave,benqi");
        assert_eq!(comma_list::<&str>(&[]), "");
    }
}
