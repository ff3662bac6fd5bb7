//! Normalized artifact model shared by the store, the query API and the
//! presentation collaborators.
//!
//! Every struct here is a *derived* view of one refresh generation. Nothing
//! in this module carries information forward from a previous generation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ArtifactKind, LocationId};

/// Number of fixed-point units in one degree.
const E6_PER_DEGREE: f64 = 1_000_000.0;

/// A world position in fixed-point integer microdegrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Latitude in microdegrees.
    pub lat_e6: i32,
    /// Longitude in microdegrees.
    pub lng_e6: i32,
}

impl Position {
    /// Build a position from microdegree components.
    pub const fn from_e6(lat_e6: i32, lng_e6: i32) -> Self {
        Self { lat_e6, lng_e6 }
    }

    /// Latitude in float degrees.
    pub fn lat(&self) -> f64 {
        f64::from(self.lat_e6) / E6_PER_DEGREE
    }

    /// Longitude in float degrees.
    pub fn lng(&self) -> f64 {
        f64::from(self.lng_e6) / E6_PER_DEGREE
    }
}

/// Facts known about one artifact kind at one location.
///
/// The owning side of a target is not carried by the upstream feed, so no
/// team field exists here at all. `is_target` only states that the location
/// is a goal for this kind. Fragment count and identity are likewise not
/// tracked, only presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct KindDetail {
    /// The location is a target for this kind.
    pub is_target: bool,
    /// One or more fragments of this kind are present.
    pub has_fragments: bool,
}

/// Everything the current generation knows about one artifact-bearing
/// location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocationFact {
    /// Where the location is.
    pub position: Position,
    /// Display name. Empty when the feed did not provide one.
    pub title: String,
    /// Per-kind details. Never empty for a fact held by the store.
    pub kinds: BTreeMap<ArtifactKind, KindDetail>,
}

/// Raw passthrough of one feed entry, kept verbatim for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityRecord {
    /// The location the entry was keyed by.
    pub location_id: LocationId,
    /// Summary timestamp in epoch milliseconds, when the entry carried one.
    pub timestamp: Option<i64>,
    /// The untouched per-location blob.
    pub raw: serde_json::Value,
}

/// Change event published after every successful refresh.
///
/// Carries the entity lists of the replaced generation and of the new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ArtifactsUpdated {
    /// Entities of the generation that was replaced.
    pub old: Arc<Vec<EntityRecord>>,
    /// Entities of the generation now held by the store.
    pub new: Arc<Vec<EntityRecord>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn position_converts_microdegrees() {
        let pos = Position::from_e6(51_500_000, -123_456);
        assert_eq!(pos.lat(), 51.5);
        assert!((pos.lng() - -0.123_456).abs() < 1e-12);
    }

    #[test]
    fn kind_detail_defaults_to_nothing_known() {
        let detail = KindDetail::default();
        assert!(!detail.is_target);
        assert!(!detail.has_fragments);
    }

    #[test]
    fn kind_detail_serializes_without_any_team_field() {
        let detail = KindDetail {
            is_target: true,
            has_fragments: false,
        };
        let json = serde_json::to_value(detail).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["has_fragments", "is_target"]);
    }
}
