//! Decoding of the loosely-typed artifact feed into tagged results.
//!
//! The feed answers with `{"result": {<location id>: <blob>, ...}}` or with
//! an `{"error": ...}` marker. Each blob describes one location and may or
//! may not carry an artifact brief. Two blob shapes are accepted:
//!
//! - **Object form**: `{"timestamp", "latE6", "lngE6", "title",
//!   "artifactBrief": {"target": {<kind>: ..}, "fragment": {<kind>: ..}}}`
//! - **Compact array form**: the positional portal summary
//!   `["p", team, latE6, lngE6, level, health, resCount, image, title,
//!   ornaments, mission, mission50plus, artifactBrief, timestamp]` where the
//!   brief is `[[fragment entries], [target entries]]` and each entry is
//!   `[kind, ...]`.
//!
//! Decoding never fails outright. It yields a [`DecodedBlob`] telling the
//! normalizer whether a usable summary exists, whether the location simply
//! has no artifact state ([`DecodedBlob::NoBrief`], the normal way the
//! feed says "nothing here any more"), or whether the blob is unusable.
//! The portal team in the array form is never read.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use shardwatch_types::{ArtifactKind, Position};

/// Index of `latE6` in the compact array form.
const ARRAY_LAT_E6: usize = 2;
/// Index of `lngE6` in the compact array form.
const ARRAY_LNG_E6: usize = 3;
/// Index of the title in the compact array form.
const ARRAY_TITLE: usize = 8;
/// Index of the artifact brief in the compact array form.
const ARRAY_BRIEF: usize = 12;
/// Index of the timestamp in the compact array form.
const ARRAY_TIMESTAMP: usize = 13;

/// Why a response envelope could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// The feed answered with an explicit error marker.
    #[error("upstream reported an error: {0}")]
    Upstream(String),

    /// The response had no `result` section.
    #[error("response has no result section")]
    MissingResult,

    /// The `result` section was not a location-keyed object.
    #[error("result section is not an object")]
    ResultNotObject,

    /// The response itself was not a JSON object.
    #[error("response is not an object")]
    NotAnObject,
}

/// Artifact kinds referenced by one location's brief.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactBrief {
    /// Kinds for which the location is a target.
    pub target: BTreeSet<ArtifactKind>,
    /// Kinds with at least one fragment at the location.
    pub fragment: BTreeSet<ArtifactKind>,
}

impl ArtifactBrief {
    /// Whether the brief references no kind at all.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty() && self.fragment.is_empty()
    }
}

/// A validated location summary carrying an artifact brief.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSummary {
    /// Location coordinates.
    pub position: Position,
    /// Display name (empty when absent upstream).
    pub title: String,
    /// Summary timestamp in epoch milliseconds, if provided.
    pub timestamp: Option<i64>,
    /// Artifact kinds referenced at this location.
    pub brief: ArtifactBrief,
}

/// Outcome of decoding one per-location blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedBlob {
    /// A usable summary with an artifact brief.
    Summary(PortalSummary),

    /// The location carries no artifact brief.
    NoBrief {
        /// Summary timestamp, if the blob carried one.
        timestamp: Option<i64>,
    },

    /// The blob could not be interpreted.
    Malformed {
        /// Summary timestamp, if one could still be read.
        timestamp: Option<i64>,
        /// What was wrong with the blob.
        reason: String,
    },
}

impl DecodedBlob {
    /// The timestamp to mirror into the entity list.
    pub const fn timestamp(&self) -> Option<i64> {
        match self {
            Self::Summary(summary) => summary.timestamp,
            Self::NoBrief { timestamp } | Self::Malformed { timestamp, .. } => *timestamp,
        }
    }
}

/// Extract the location-keyed `result` section from a response envelope.
///
/// # Errors
///
/// Returns [`ResponseError::Upstream`] for an error marker,
/// [`ResponseError::MissingResult`] or [`ResponseError::ResultNotObject`]
/// when the result section is unusable.
pub fn parse_response(payload: &Value) -> Result<&Map<String, Value>, ResponseError> {
    let Some(envelope) = payload.as_object() else {
        return Err(ResponseError::NotAnObject);
    };

    if let Some(marker) = envelope.get("error")
        && !marker.is_null()
    {
        let message = marker
            .as_str()
            .map_or_else(|| marker.to_string(), str::to_owned);
        return Err(ResponseError::Upstream(message));
    }

    match envelope.get("result") {
        None | Some(Value::Null) => Err(ResponseError::MissingResult),
        Some(Value::Object(result)) => Ok(result),
        Some(_) => Err(ResponseError::ResultNotObject),
    }
}

/// Decode one per-location blob.
pub fn decode_blob(raw: &Value) -> DecodedBlob {
    match raw {
        Value::Object(fields) => decode_object(fields),
        Value::Array(items) => decode_array(items),
        other => DecodedBlob::Malformed {
            timestamp: None,
            reason: format!("unexpected blob type: {}", json_type_name(other)),
        },
    }
}

fn decode_object(fields: &Map<String, Value>) -> DecodedBlob {
    let timestamp = fields.get("timestamp").and_then(Value::as_i64);

    let brief = match fields.get("artifactBrief") {
        None | Some(Value::Null) => return DecodedBlob::NoBrief { timestamp },
        Some(Value::Object(sections)) => match brief_from_sections(sections) {
            Ok(brief) => brief,
            Err(reason) => return DecodedBlob::Malformed { timestamp, reason },
        },
        Some(other) => {
            return DecodedBlob::Malformed {
                timestamp,
                reason: format!("artifactBrief is a {}", json_type_name(other)),
            };
        }
    };

    let position = match position_from(fields.get("latE6"), fields.get("lngE6")) {
        Ok(position) => position,
        Err(reason) => return DecodedBlob::Malformed { timestamp, reason },
    };

    DecodedBlob::Summary(PortalSummary {
        position,
        title: title_from(fields.get("title")),
        timestamp,
        brief,
    })
}

fn decode_array(items: &[Value]) -> DecodedBlob {
    let timestamp = items.get(ARRAY_TIMESTAMP).and_then(Value::as_i64);

    let brief = match items.get(ARRAY_BRIEF) {
        None | Some(Value::Null) => return DecodedBlob::NoBrief { timestamp },
        Some(Value::Array(parts)) => match brief_from_parts(parts) {
            Ok(brief) => brief,
            Err(reason) => return DecodedBlob::Malformed { timestamp, reason },
        },
        Some(other) => {
            return DecodedBlob::Malformed {
                timestamp,
                reason: format!("artifact brief is a {}", json_type_name(other)),
            };
        }
    };

    let position = match position_from(items.get(ARRAY_LAT_E6), items.get(ARRAY_LNG_E6)) {
        Ok(position) => position,
        Err(reason) => return DecodedBlob::Malformed { timestamp, reason },
    };

    DecodedBlob::Summary(PortalSummary {
        position,
        title: title_from(items.get(ARRAY_TITLE)),
        timestamp,
        brief,
    })
}

/// Object-form brief: `{"target": {<kind>: ..}, "fragment": {<kind>: ..}}`.
fn brief_from_sections(sections: &Map<String, Value>) -> Result<ArtifactBrief, String> {
    Ok(ArtifactBrief {
        target: kinds_from_section(sections.get("target"), "target")?,
        fragment: kinds_from_section(sections.get("fragment"), "fragment")?,
    })
}

fn kinds_from_section(
    section: Option<&Value>,
    name: &str,
) -> Result<BTreeSet<ArtifactKind>, String> {
    match section {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::Object(kinds)) => Ok(kinds
            .keys()
            .map(|kind| ArtifactKind::new(kind.as_str()))
            .collect()),
        Some(other) => Err(format!(
            "artifactBrief.{name} is a {}",
            json_type_name(other)
        )),
    }
}

/// Array-form brief: `[[fragment entries], [target entries]]`.
fn brief_from_parts(parts: &[Value]) -> Result<ArtifactBrief, String> {
    Ok(ArtifactBrief {
        fragment: kinds_from_entries(parts.first(), "fragment")?,
        target: kinds_from_entries(parts.get(1), "target")?,
    })
}

fn kinds_from_entries(
    entries: Option<&Value>,
    name: &str,
) -> Result<BTreeSet<ArtifactKind>, String> {
    let entries = match entries {
        None | Some(Value::Null) => return Ok(BTreeSet::new()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(format!(
                "{name} entries are a {}",
                json_type_name(other)
            ));
        }
    };

    entries
        .iter()
        .map(|entry| {
            entry
                .as_array()
                .and_then(|parts| parts.first())
                .and_then(Value::as_str)
                .map(ArtifactKind::from)
                .ok_or_else(|| format!("{name} entry without a kind: {entry}"))
        })
        .collect()
}

fn position_from(lat: Option<&Value>, lng: Option<&Value>) -> Result<Position, String> {
    let lat_e6 = coordinate_from(lat, "latE6")?;
    let lng_e6 = coordinate_from(lng, "lngE6")?;
    Ok(Position::from_e6(lat_e6, lng_e6))
}

fn coordinate_from(value: Option<&Value>, name: &str) -> Result<i32, String> {
    let raw = value
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("{name} missing or not an integer"))?;
    i32::try_from(raw).map_err(|_err| format!("{name} out of range: {raw}"))
}

fn title_from(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_owned()
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    fn kinds(names: &[&str]) -> BTreeSet<ArtifactKind> {
        names.iter().map(|n| ArtifactKind::from(*n)).collect()
    }

    #[test]
    fn error_marker_is_rejected() {
        let payload = json!({"error": "RETRY"});
        assert_eq!(
            parse_response(&payload),
            Err(ResponseError::Upstream(String::from("RETRY")))
        );
    }

    #[test]
    fn missing_result_is_rejected() {
        assert_eq!(
            parse_response(&json!({})),
            Err(ResponseError::MissingResult)
        );
        assert_eq!(
            parse_response(&json!({"result": null})),
            Err(ResponseError::MissingResult)
        );
        assert_eq!(
            parse_response(&json!({"result": [1, 2]})),
            Err(ResponseError::ResultNotObject)
        );
        assert_eq!(parse_response(&json!("nope")), Err(ResponseError::NotAnObject));
    }

    #[test]
    fn result_section_is_returned() {
        let payload = json!({"result": {"G1": {}}});
        let result = parse_response(&payload).unwrap();
        assert!(result.contains_key("G1"));
    }

    #[test]
    fn object_blob_with_brief_decodes() {
        let blob = json!({
            "timestamp": 1_700_000_000_000_i64,
            "latE6": 51_500_000,
            "lngE6": -120_000,
            "title": "Clock Tower",
            "artifactBrief": {
                "target": {"alpha": {}},
                "fragment": {"beta": {}, "gamma": {}}
            }
        });
        let DecodedBlob::Summary(summary) = decode_blob(&blob) else {
            panic!("expected a summary");
        };
        assert_eq!(summary.position, Position::from_e6(51_500_000, -120_000));
        assert_eq!(summary.title, "Clock Tower");
        assert_eq!(summary.timestamp, Some(1_700_000_000_000));
        assert_eq!(summary.brief.target, kinds(&["alpha"]));
        assert_eq!(summary.brief.fragment, kinds(&["beta", "gamma"]));
    }

    #[test]
    fn object_blob_without_brief_is_no_brief() {
        let blob = json!({"timestamp": 5, "latE6": 1, "lngE6": 2, "title": "Plain"});
        assert_eq!(decode_blob(&blob), DecodedBlob::NoBrief { timestamp: Some(5) });

        let null_brief = json!({"latE6": 1, "lngE6": 2, "artifactBrief": null});
        assert_eq!(decode_blob(&null_brief), DecodedBlob::NoBrief { timestamp: None });
    }

    #[test]
    fn missing_sections_mean_no_kinds_not_an_error() {
        let blob = json!({"latE6": 1, "lngE6": 2, "artifactBrief": {"fragment": {"alpha": {}}}});
        let DecodedBlob::Summary(summary) = decode_blob(&blob) else {
            panic!("expected a summary");
        };
        assert!(summary.brief.target.is_empty());
        assert_eq!(summary.brief.fragment, kinds(&["alpha"]));
        assert_eq!(summary.title, "");
        assert_eq!(summary.timestamp, None);
    }

    #[test]
    fn brief_without_position_is_malformed() {
        let blob = json!({"timestamp": 9, "artifactBrief": {"target": {"alpha": {}}}});
        let decoded = decode_blob(&blob);
        assert!(matches!(decoded, DecodedBlob::Malformed { .. }));
        assert_eq!(decoded.timestamp(), Some(9));
    }

    #[test]
    fn out_of_range_coordinate_is_malformed() {
        let blob = json!({"latE6": 9_999_999_999_i64, "lngE6": 0, "artifactBrief": {}});
        assert!(matches!(decode_blob(&blob), DecodedBlob::Malformed { .. }));
    }

    #[test]
    fn non_object_section_is_malformed() {
        let blob = json!({"latE6": 1, "lngE6": 2, "artifactBrief": {"target": "alpha"}});
        assert!(matches!(decode_blob(&blob), DecodedBlob::Malformed { .. }));
    }

    #[test]
    fn scalar_blob_is_malformed() {
        assert!(matches!(
            decode_blob(&json!(42)),
            DecodedBlob::Malformed { timestamp: None, .. }
        ));
    }

    #[test]
    fn array_blob_decodes_positional_summary() {
        let blob = json!([
            "p", "E", 40_000_000, -74_000_000, 8, 100, 8, "img", "Fountain",
            [], false, false,
            [[["beta", 1]], [["alpha"]]],
            1_650_000_000_000_i64
        ]);
        let DecodedBlob::Summary(summary) = decode_blob(&blob) else {
            panic!("expected a summary");
        };
        assert_eq!(summary.position, Position::from_e6(40_000_000, -74_000_000));
        assert_eq!(summary.title, "Fountain");
        assert_eq!(summary.timestamp, Some(1_650_000_000_000));
        assert_eq!(summary.brief.fragment, kinds(&["beta"]));
        assert_eq!(summary.brief.target, kinds(&["alpha"]));
    }

    #[test]
    fn short_array_blob_is_no_brief() {
        let blob = json!(["p", "N", 1, 2]);
        assert_eq!(decode_blob(&blob), DecodedBlob::NoBrief { timestamp: None });
    }

    #[test]
    fn array_entry_without_kind_is_malformed() {
        let blob = json!(["p", "N", 1, 2, 1, 0, 0, "", "T", [], false, false, [[[7]], []], 3]);
        let decoded = decode_blob(&blob);
        assert!(matches!(decoded, DecodedBlob::Malformed { .. }));
        assert_eq!(decoded.timestamp(), Some(3));
    }
}
