//! Type-safe identifier wrappers around upstream string keys.
//!
//! Location ids and artifact kinds both arrive as plain strings in the raw
//! feed. Wrapping them keeps a location id from ever being looked up as a
//! kind (and vice versa) at compile time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an upstream key.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the raw key.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key! {
    /// Stable identifier of a world location (a portal guid upstream).
    LocationId
}

define_key! {
    /// Identifier of an artifact kind (e.g. a named shard type).
    ArtifactKind
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn keys_display_their_raw_value() {
        let id = LocationId::new("a0b1c2.16");
        assert_eq!(id.to_string(), "a0b1c2.16");
        assert_eq!(id.as_str(), "a0b1c2.16");
    }

    #[test]
    fn keys_serialize_as_plain_strings() {
        let kind = ArtifactKind::from("shard");
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"shard\"");
        let back: ArtifactKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn keyed_maps_can_be_queried_by_str() {
        let mut map = BTreeMap::new();
        map.insert(LocationId::from("G1"), 1_u8);
        assert_eq!(map.get("G1"), Some(&1));
        assert!(map.get("G2").is_none());
    }
}
