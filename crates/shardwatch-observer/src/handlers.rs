//! REST endpoint handlers for the observer server.
//!
//! Every handler takes one snapshot of the current generation and answers
//! from it, so a response never mixes two generations.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/artifacts/kinds` | Known artifact kinds |
//! | `GET` | `/api/artifacts/kinds/{kind}/summary` | Targets and fragments of one kind |
//! | `GET` | `/api/artifacts/locations` | Relevant locations with their facts |
//! | `GET` | `/api/artifacts/locations/{id}` | One location's facts |
//! | `GET` | `/api/artifacts/locations/{id}/kinds/{kind}` | One (location, kind) detail |
//! | `GET` | `/api/artifacts/entities` | Raw entity records |

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};
use shardwatch_core::ArtifactContext;
use shardwatch_core::summary::{KindSummary, summarize_kind};
use shardwatch_types::KindDetail;

use crate::error::ObserverError;

/// List the artifact kinds of the current generation, sorted.
pub async fn list_kinds(State(ctx): State<ArtifactContext>) -> Json<Value> {
    let generation = ctx.snapshot().await;
    let mut kinds = generation.list_known_kinds();
    kinds.sort();
    Json(json!({
        "count": kinds.len(),
        "kinds": kinds,
    }))
}

/// Target and fragment rows for one kind.
pub async fn kind_summary(
    State(ctx): State<ArtifactContext>,
    Path(kind): Path<String>,
) -> Result<Json<KindSummary>, ObserverError> {
    let generation = ctx.snapshot().await;
    summarize_kind(&generation, &kind)
        .map(Json)
        .ok_or_else(|| ObserverError::NotFound(format!("artifact kind {kind}")))
}

/// List relevant locations with their facts, sorted by id.
pub async fn list_locations(
    State(ctx): State<ArtifactContext>,
) -> Result<Json<Value>, ObserverError> {
    let generation = ctx.snapshot().await;
    let mut facts: Vec<_> = generation.facts().collect();
    facts.sort_by(|a, b| a.0.cmp(b.0));

    let locations = facts
        .into_iter()
        .map(|(id, fact)| {
            let mut entry = serde_json::to_value(fact)?;
            if let Some(fields) = entry.as_object_mut() {
                fields.insert(String::from("id"), json!(id));
                fields.insert(String::from("lat"), json!(fact.position.lat()));
                fields.insert(String::from("lng"), json!(fact.position.lng()));
            }
            Ok(entry)
        })
        .collect::<Result<Vec<Value>, serde_json::Error>>()?;

    Ok(Json(json!({
        "count": locations.len(),
        "locations": locations,
    })))
}

/// Facts for one relevant location.
pub async fn get_location(
    State(ctx): State<ArtifactContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ObserverError> {
    let generation = ctx.snapshot().await;
    let fact = generation
        .location_fact(&id)
        .ok_or_else(|| ObserverError::NotFound(format!("location {id}")))?;

    let mut body = serde_json::to_value(fact)?;
    if let Some(fields) = body.as_object_mut() {
        fields.insert(String::from("id"), json!(id));
        fields.insert(String::from("lat"), json!(fact.position.lat()));
        fields.insert(String::from("lng"), json!(fact.position.lng()));
    }
    Ok(Json(body))
}

/// The detail for one (location, kind) pair.
pub async fn get_detail(
    State(ctx): State<ArtifactContext>,
    Path((id, kind)): Path<(String, String)>,
) -> Result<Json<KindDetail>, ObserverError> {
    let generation = ctx.snapshot().await;
    generation
        .get_detail(&id, &kind)
        .map(Json)
        .ok_or_else(|| ObserverError::NotFound(format!("no {kind} data at location {id}")))
}

/// The raw entity records of the current generation.
pub async fn list_entities(State(ctx): State<ArtifactContext>) -> Json<Value> {
    let generation = ctx.snapshot().await;
    let entities = generation.list_entities();
    Json(json!({
        "count": entities.len(),
        "entities": entities,
    }))
}
