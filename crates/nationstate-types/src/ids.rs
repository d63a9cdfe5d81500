//! Type-safe identifier wrappers.
//!
//! Nations and players are keyed by the chat platform's snowflake strings
//! (guild id and user id), tiles by their world coordinate number, and the
//! agreement records the engine creates itself by UUID v7.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

/// Generates a newtype wrapper around an externally assigned snowflake string.
macro_rules! define_snowflake {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an externally assigned identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_snowflake! {
    /// Identifier of a nation: the id of the guild that owns it.
    NationId
}

define_snowflake! {
    /// Identifier of a player: the chat user id.
    PlayerId
}

define_id! {
    /// Unique identifier for a truce record.
    TruceId
}

define_id! {
    /// Unique identifier for a trade proposal.
    TradeId
}

/// A world coordinate, numbered `1..=world_tiles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl core::fmt::Display for TileId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        assert_ne!(TradeId::new(), TradeId::new());
        assert_ne!(TruceId::new(), TruceId::new());
    }

    #[test]
    fn snowflakes_serialize_as_plain_strings() {
        let id = NationId::new("1122334455");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1122334455\"");
        let back: NationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn tile_display_uses_hash_prefix() {
        assert_eq!(TileId(42).to_string(), "#42");
    }
}
