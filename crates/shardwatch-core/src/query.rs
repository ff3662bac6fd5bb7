//! Read-only accessors over a [`Generation`].
//!
//! Presentation collaborators (the map renderer, the listing dialog, the
//! observer API) pull everything they need through these methods. None of
//! them fail: an unknown location or kind yields `false`, `None` or an
//! empty sequence. Lookups are hash-based; listings cost the size of the
//! result.

use std::sync::Arc;

use shardwatch_types::{ArtifactKind, EntityRecord, KindDetail, LocationFact, LocationId};

use crate::store::Generation;

impl Generation {
    /// Artifact kinds seen anywhere in this generation, in no particular
    /// order.
    pub fn list_known_kinds(&self) -> Vec<ArtifactKind> {
        self.known_kinds.iter().cloned().collect()
    }

    /// Whether `kind` was seen in this generation.
    pub fn is_known_kind(&self, kind: &str) -> bool {
        self.known_kinds.contains(kind)
    }

    /// The raw entity records of this generation, one per feed entry.
    pub fn list_entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    /// Shared handle to the entity list, for consumers that outlive the
    /// borrow of this generation.
    pub fn entities_handle(&self) -> Arc<Vec<EntityRecord>> {
        Arc::clone(&self.entities)
    }

    /// Locations that carry at least one artifact kind.
    pub fn list_relevant_locations(&self) -> Vec<LocationId> {
        self.facts.keys().cloned().collect()
    }

    /// Whether `location` carries at least one artifact kind.
    pub fn is_relevant_location(&self, location: &str) -> bool {
        self.facts.contains_key(location)
    }

    /// Everything known about one location, if it is relevant.
    pub fn location_fact(&self, location: &str) -> Option<&LocationFact> {
        self.facts.get(location)
    }

    /// Iterate over all relevant locations with their facts.
    pub fn facts(&self) -> impl ExactSizeIterator<Item = (&LocationId, &LocationFact)> {
        self.facts.iter()
    }

    /// The detail for one (location, kind) pair.
    ///
    /// `None` means the generation holds no data for the pair; it is not a
    /// claim that the location is "not a target" or "has no fragments".
    pub fn get_detail(&self, location: &str, kind: &str) -> Option<KindDetail> {
        self.facts
            .get(location)
            .and_then(|fact| fact.kinds.get(kind))
            .copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use crate::hooks::ChangeHooks;
    use crate::store::ArtifactStore;

    use super::*;

    fn generation() -> Arc<Generation> {
        let mut store = ArtifactStore::new(ChangeHooks::new(4));
        store
            .apply_refresh(&json!({"result": {
                "G1": {"latE6": 1, "lngE6": 2, "title": "One",
                       "artifactBrief": {"target": {"alpha": {}}, "fragment": {}}},
                "G2": {"latE6": 3, "lngE6": 4, "title": "Two",
                       "artifactBrief": {"fragment": {"alpha": {}}}},
                "G3": {"latE6": 5, "lngE6": 6, "title": "Three"}
            }}))
            .unwrap();
        store.current()
    }

    #[test]
    fn kinds_are_listed_and_checked() {
        let generation = generation();
        assert_eq!(generation.list_known_kinds(), vec![ArtifactKind::from("alpha")]);
        assert!(generation.is_known_kind("alpha"));
        assert!(!generation.is_known_kind("omega"));
    }

    #[test]
    fn relevant_locations_exclude_briefless_entries() {
        let generation = generation();
        let mut relevant = generation.list_relevant_locations();
        relevant.sort();
        assert_eq!(relevant, vec![LocationId::from("G1"), LocationId::from("G2")]);
        assert!(generation.is_relevant_location("G1"));
        assert!(!generation.is_relevant_location("G3"));
        assert_eq!(generation.list_entities().len(), 3);
        assert_eq!(generation.facts().len(), 2);
    }

    #[test]
    fn details_reflect_targets_and_fragments() {
        let generation = generation();
        let g1 = generation.get_detail("G1", "alpha").unwrap();
        assert!(g1.is_target);
        assert!(!g1.has_fragments);

        let g2 = generation.get_detail("G2", "alpha").unwrap();
        assert!(g2.has_fragments);
        assert!(!g2.is_target);
    }

    #[test]
    fn unknown_pairs_are_absent_not_errors() {
        let generation = generation();
        assert_eq!(generation.get_detail("G1", "omega"), None);
        assert_eq!(generation.get_detail("G3", "alpha"), None);
        assert_eq!(generation.get_detail("nowhere", "alpha"), None);
        assert!(generation.location_fact("nowhere").is_none());
    }

    #[test]
    fn empty_generation_answers_everything_with_nothing() {
        let generation = Generation::default();
        assert!(generation.list_known_kinds().is_empty());
        assert!(generation.list_relevant_locations().is_empty());
        assert!(generation.list_entities().is_empty());
        assert!(generation.entities_handle().is_empty());
    }
}
