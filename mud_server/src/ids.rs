//! Newtype identifiers for the entity model (spec.md §3). Kept as thin
//! wrappers around `String` rather than raw `String`s throughout, so a
//! caller can't accidentally pass a room ID where a zone ID was expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
  ($name:ident) => {
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct $name(pub String);

    impl $name {
      pub fn as_str(&self) -> &str { &self.0 }
    }
    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
    }
    impl From<&str> for $name {
      fn from(s: &str) -> Self { $name(s.to_string()) }
    }
    impl From<String> for $name {
      fn from(s: String) -> Self { $name(s) }
    }
  };
}

string_id!(ZoneId);
string_id!(RoomId);
string_id!(ItemId);
string_id!(MobTemplateId);

/// Identifier for a single mob instance, unique within its zone. Assigned
/// once at zone load; repop moves the same instance back from `dead_mobs`
/// to `active_mobs` rather than minting a new ID (spec.md §4.2).
pub type MobInstanceId = u64;
