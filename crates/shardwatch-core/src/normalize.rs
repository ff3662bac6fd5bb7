//! Conversion of one feed result section into a fresh generation.
//!
//! Normalization reads only the payload it is handed. Nothing from the
//! previous generation is consulted, so a kind or a target flag that
//! disappeared upstream disappears here too.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{Map, Value};
use shardwatch_types::{ArtifactKind, EntityRecord, KindDetail, LocationFact, LocationId};
use tracing::{debug, warn};

use crate::decode::{DecodedBlob, PortalSummary, decode_blob};

/// Containers produced by one normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Facts for every location that carried at least one artifact kind.
    pub facts: HashMap<LocationId, LocationFact>,
    /// Every kind referenced anywhere in the payload.
    pub known_kinds: HashSet<ArtifactKind>,
    /// One raw record per payload entry, artifact-bearing or not.
    pub entities: Vec<EntityRecord>,
}

/// Normalize a location-keyed result section.
pub fn normalize(result: &Map<String, Value>) -> Normalized {
    let mut normalized = Normalized {
        facts: HashMap::new(),
        known_kinds: HashSet::new(),
        entities: Vec::with_capacity(result.len()),
    };

    for (key, raw) in result {
        let location_id = LocationId::new(key.as_str());
        let decoded = decode_blob(raw);
        let timestamp = decoded.timestamp();

        match decoded {
            DecodedBlob::Summary(summary) => {
                if let Some(fact) = fact_from_summary(summary, &mut normalized.known_kinds) {
                    normalized.facts.insert(location_id.clone(), fact);
                } else {
                    debug!(location_id = %location_id, "artifact brief references no kinds");
                }
            }
            DecodedBlob::NoBrief { .. } => {}
            DecodedBlob::Malformed { reason, .. } => {
                warn!(location_id = %location_id, reason, "skipping malformed location blob");
            }
        }

        normalized.entities.push(EntityRecord {
            location_id,
            timestamp,
            raw: raw.clone(),
        });
    }

    normalized
}

/// Build the fact for one summary, registering its kinds.
///
/// Returns `None` when the brief names no kind, so that every stored fact
/// has a non-empty kind map.
fn fact_from_summary(
    summary: PortalSummary,
    known_kinds: &mut HashSet<ArtifactKind>,
) -> Option<LocationFact> {
    if summary.brief.is_empty() {
        return None;
    }

    let mut kinds: BTreeMap<ArtifactKind, KindDetail> = BTreeMap::new();

    for kind in summary.brief.target {
        known_kinds.insert(kind.clone());
        kinds.entry(kind).or_default().is_target = true;
    }

    for kind in summary.brief.fragment {
        known_kinds.insert(kind.clone());
        kinds.entry(kind).or_default().has_fragments = true;
    }

    Some(LocationFact {
        position: summary.position,
        title: summary.title,
        kinds,
    })
}
