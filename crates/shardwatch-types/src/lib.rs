//! Shared type definitions for the Shardwatch artifact overlay service.
//!
//! Types defined here flow to `TypeScript` via `ts-rs` so that the map
//! renderer and the listing dialog read the same model the service builds.
//!
//! # Modules
//!
//! - [`ids`] -- String-key wrappers for location ids and artifact kinds
//! - [`model`] -- Location facts, per-kind details, raw entity records and
//!   the change event

pub mod ids;
pub mod model;

pub use ids::{ArtifactKind, LocationId};
pub use model::{ArtifactsUpdated, EntityRecord, KindDetail, LocationFact, Position};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the exported types.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::LocationId::export_all();
        let _ = crate::ids::ArtifactKind::export_all();
        let _ = crate::model::Position::export_all();
        let _ = crate::model::KindDetail::export_all();
        let _ = crate::model::LocationFact::export_all();
        let _ = crate::model::EntityRecord::export_all();
        let _ = crate::model::ArtifactsUpdated::export_all();
    }
}
