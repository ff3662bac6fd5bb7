//! Listing data for the artifact summary view.
//!
//! Builds, per known artifact kind, the target locations and the fragment
//! locations of a generation as plain rows. Rendering them (HTML, a
//! dialog, a log line) is the listing collaborator's business.

use serde::Serialize;
use shardwatch_types::{ArtifactKind, LocationFact, LocationId};

use crate::store::Generation;

/// One location in a kind summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// The location.
    pub location_id: LocationId,
    /// Display name.
    pub title: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl SummaryRow {
    fn new(location_id: &LocationId, fact: &LocationFact) -> Self {
        Self {
            location_id: location_id.clone(),
            title: fact.title.clone(),
            lat: fact.position.lat(),
            lng: fact.position.lng(),
        }
    }
}

/// Target and fragment locations of one artifact kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindSummary {
    /// The artifact kind.
    pub kind: ArtifactKind,
    /// Locations that are targets for the kind.
    pub targets: Vec<SummaryRow>,
    /// Locations holding fragments of the kind.
    pub fragments: Vec<SummaryRow>,
}

/// Summaries for every known kind, sorted by kind.
pub fn summarize(generation: &Generation) -> Vec<KindSummary> {
    let mut kinds = generation.list_known_kinds();
    kinds.sort();
    kinds
        .into_iter()
        .filter_map(|kind| summarize_kind(generation, kind.as_str()))
        .collect()
}

/// Summary for one kind, or `None` if the kind is unknown.
///
/// Rows are sorted by title, then by location id.
pub fn summarize_kind(generation: &Generation, kind: &str) -> Option<KindSummary> {
    if !generation.is_known_kind(kind) {
        return None;
    }

    let mut targets = Vec::new();
    let mut fragments = Vec::new();
    for (location_id, fact) in generation.facts() {
        let Some(detail) = fact.kinds.get(kind) else {
            continue;
        };
        if detail.is_target {
            targets.push(SummaryRow::new(location_id, fact));
        }
        if detail.has_fragments {
            fragments.push(SummaryRow::new(location_id, fact));
        }
    }
    sort_rows(&mut targets);
    sort_rows(&mut fragments);

    Some(KindSummary {
        kind: ArtifactKind::new(kind),
        targets,
        fragments,
    })
}

fn sort_rows(rows: &mut [SummaryRow]) {
    rows.sort_by(|a, b| {
        a.title
            .cmp(&b.title)
            .then_with(|| a.location_id.cmp(&b.location_id))
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::hooks::ChangeHooks;
    use crate::store::ArtifactStore;

    use super::*;

    fn generation() -> Arc<Generation> {
        let mut store = ArtifactStore::new(ChangeHooks::new(4));
        store
            .apply_refresh(&json!({"result": {
                "Z": {"latE6": 1, "lngE6": 1, "title": "Bridge",
                      "artifactBrief": {"target": {"alpha": {}}, "fragment": {"beta": {}}}},
                "A": {"latE6": 2, "lngE6": 2, "title": "Archway",
                      "artifactBrief": {"fragment": {"alpha": {}, "beta": {}}}},
                "M": {"latE6": 3, "lngE6": 3, "title": "Archway",
                      "artifactBrief": {"fragment": {"alpha": {}}}}
            }}))
            .unwrap();
        store.current()
    }

    #[test]
    fn summaries_cover_every_kind_in_order() {
        let summaries = summarize(&generation());
        let kinds: Vec<&str> = summaries.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["alpha", "beta"]);
    }

    #[test]
    fn rows_are_split_and_sorted() {
        let alpha = summarize_kind(&generation(), "alpha").unwrap();
        let targets: Vec<&str> = alpha.targets.iter().map(|r| r.location_id.as_str()).collect();
        let fragments: Vec<&str> = alpha
            .fragments
            .iter()
            .map(|r| r.location_id.as_str())
            .collect();
        assert_eq!(targets, vec!["Z"]);
        assert_eq!(fragments, vec!["A", "M"]);
        assert_eq!(alpha.targets[0].title, "Bridge");
    }

    #[test]
    fn unknown_kind_has_no_summary() {
        assert!(summarize_kind(&generation(), "omega").is_none());
        assert!(summarize(&Generation::default()).is_empty());
    }
}
