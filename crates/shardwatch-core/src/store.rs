//! The single-generation artifact store.
//!
//! [`ArtifactStore`] holds exactly one [`Generation`]: the location facts,
//! the known kinds and the raw entity list of the last successful refresh.
//! The three containers live in one immutable value behind an [`Arc`], so
//! a refresh replaces all of them in a single assignment and readers
//! holding an older `Arc` keep a consistent view.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use shardwatch_types::{ArtifactKind, ArtifactsUpdated, EntityRecord, LocationFact, LocationId};
use tracing::{info, warn};

use crate::decode::{ResponseError, parse_response};
use crate::hooks::{ChangeHooks, HookEvent};
use crate::normalize::{Normalized, normalize};

/// One refresh generation of the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub(crate) facts: HashMap<LocationId, LocationFact>,
    pub(crate) known_kinds: HashSet<ArtifactKind>,
    pub(crate) entities: Arc<Vec<EntityRecord>>,
}

impl Generation {
    /// Whether the generation holds no entities at all.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl From<Normalized> for Generation {
    fn from(normalized: Normalized) -> Self {
        Self {
            facts: normalized.facts,
            known_kinds: normalized.known_kinds,
            entities: Arc::new(normalized.entities),
        }
    }
}

/// Counts describing an applied refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshStats {
    /// Locations in the fact map.
    pub locations: usize,
    /// Distinct artifact kinds.
    pub kinds: usize,
    /// Raw entity records.
    pub entities: usize,
}

/// Holder of the current generation.
#[derive(Debug)]
pub struct ArtifactStore {
    current: Arc<Generation>,
    hooks: ChangeHooks,
}

impl ArtifactStore {
    /// Create an empty store publishing to `hooks`.
    pub fn new(hooks: ChangeHooks) -> Self {
        Self {
            current: Arc::new(Generation::default()),
            hooks,
        }
    }

    /// The current generation.
    pub fn current(&self) -> Arc<Generation> {
        Arc::clone(&self.current)
    }

    /// Reset all containers to empty.
    pub fn clear(&mut self) {
        self.current = Arc::new(Generation::default());
    }

    /// Replace the current generation with one built from `payload`.
    ///
    /// A payload with an error marker or without a usable result section
    /// leaves the store untouched and publishes nothing. Otherwise the
    /// previous generation is captured, the store is cleared and rebuilt
    /// from this payload alone, and an `artifactsUpdated` event carrying
    /// the old and new entity lists is published.
    ///
    /// # Errors
    ///
    /// Returns the [`ResponseError`] that caused the refresh to be aborted.
    pub fn apply_refresh(&mut self, payload: &Value) -> Result<RefreshStats, ResponseError> {
        let result = match parse_response(payload) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "artifact refresh aborted, keeping previous data");
                return Err(e);
            }
        };

        let old = self.current();
        self.clear();
        self.current = Arc::new(Generation::from(normalize(result)));

        let stats = RefreshStats {
            locations: self.current.facts.len(),
            kinds: self.current.known_kinds.len(),
            entities: self.current.entities.len(),
        };
        info!(
            locations = stats.locations,
            kinds = stats.kinds,
            entities = stats.entities,
            "artifact data refreshed"
        );

        self.hooks
            .publish(HookEvent::ArtifactsUpdated(Arc::new(ArtifactsUpdated {
                old: Arc::clone(&old.entities),
                new: Arc::clone(&self.current.entities),
            })));

        Ok(stats)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    fn two_location_payload() -> Value {
        json!({"result": {
            "G1": {"timestamp": 1, "latE6": 1, "lngE6": 2, "title": "One",
                   "artifactBrief": {"target": {"alpha": {}}, "fragment": {}}},
            "G2": {"timestamp": 2, "latE6": 3, "lngE6": 4, "title": "Two",
                   "artifactBrief": {"fragment": {"alpha": {}}}}
        }})
    }

    #[test]
    fn new_store_is_empty() {
        let store = ArtifactStore::new(ChangeHooks::new(4));
        assert!(store.current().is_empty());
        assert_eq!(*store.current(), Generation::default());
    }

    #[test]
    fn refresh_replaces_generation() {
        let mut store = ArtifactStore::new(ChangeHooks::new(4));
        let stats = store.apply_refresh(&two_location_payload()).unwrap();
        assert_eq!(
            stats,
            RefreshStats {
                locations: 2,
                kinds: 1,
                entities: 2
            }
        );

        store.apply_refresh(&json!({"result": {}})).unwrap();
        let current = store.current();
        assert!(current.facts.is_empty());
        assert!(current.known_kinds.is_empty());
        assert!(current.entities.is_empty());
    }

    #[test]
    fn aborted_refresh_keeps_previous_generation() {
        let hooks = ChangeHooks::new(4);
        let mut store = ArtifactStore::new(hooks.clone());
        store.apply_refresh(&two_location_payload()).unwrap();
        let before = store.current();

        let mut rx = hooks.subscribe();
        let err = store.apply_refresh(&json!({"error": "busy"})).unwrap_err();
        assert_eq!(err, ResponseError::Upstream(String::from("busy")));
        assert!(store.apply_refresh(&json!({})).is_err());

        assert_eq!(*store.current(), *before);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn refresh_publishes_old_and_new_entities() {
        let hooks = ChangeHooks::new(4);
        let mut rx = hooks.subscribe();
        let mut store = ArtifactStore::new(hooks);

        store.apply_refresh(&two_location_payload()).unwrap();
        let HookEvent::ArtifactsUpdated(first) = rx.try_recv().unwrap();
        assert!(first.old.is_empty());
        assert_eq!(first.new.len(), 2);

        store.apply_refresh(&json!({"result": {"G3": {}}})).unwrap();
        let HookEvent::ArtifactsUpdated(second) = rx.try_recv().unwrap();
        assert_eq!(second.old, first.new);
        assert_eq!(second.new.len(), 1);
    }

    #[test]
    fn same_payload_twice_yields_identical_generations() {
        let mut store = ArtifactStore::new(ChangeHooks::new(4));
        store.apply_refresh(&two_location_payload()).unwrap();
        let first = store.current();
        store.apply_refresh(&two_location_payload()).unwrap();
        let second = store.current();
        assert_eq!(*first, *second);
        assert_eq!(second.entities.len(), 2);
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = ArtifactStore::new(ChangeHooks::new(4));
        store.apply_refresh(&two_location_payload()).unwrap();
        store.clear();
        assert_eq!(*store.current(), Generation::default());
    }
}
