//! Stable player identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when a stored player identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdError {
    input: String,
}

impl fmt::Display for PlayerIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid player id: {}", self.input)
    }
}

impl std::error::Error for PlayerIdError {}

/// Stable unique player identifier (account UUID).
///
/// The hyphenated lowercase string form is what preference documents use
/// as keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Deterministic identifier derived from a number (fixtures, headless runs).
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PlayerId {
    type Err = PlayerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self).map_err(|_| PlayerIdError {
            input: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        let id = PlayerId::from_u128(0x1234);
        let text = id.to_string();
        assert_eq!(text, "00000000-0000-0000-0000-000000001234");
        assert_eq!(text.parse::<PlayerId>().unwrap(), id);
    }

    #[test]
    fn rejects_garbage() {
        let err = "not-a-uuid".parse::<PlayerId>().unwrap_err();
        assert!(err.to_string().contains("not-a-uuid"));
    }
}
