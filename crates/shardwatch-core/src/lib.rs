//! Data acquisition, normalization and query layer for the Shardwatch
//! artifact overlay.
//!
//! The crate keeps one periodically refreshed generation of artifact state
//! (which locations are targets for which artifact kinds, which hold
//! fragments) and serves it to presentation code.
//!
//! ```text
//! RefreshService --fetch--> decode/normalize --> ArtifactStore (swap)
//!        ^                                            |
//!    IdleState                             HookEvent::ArtifactsUpdated
//!                                                     |
//!                              Generation query API <-+-- renderers
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `shardwatch-config.yaml`.
//! - [`context`] -- [`ArtifactContext`], the shared per-process handle.
//! - [`decode`] -- Response envelope and per-location blob decoding.
//! - [`hooks`] -- Change-notification channel.
//! - [`idle`] -- Host idle flag and resume signal.
//! - [`normalize`] -- Result section to fresh containers.
//! - [`query`] -- Read accessors on a [`Generation`].
//! - [`schedule`] -- Grid-aligned success delays and the armed refresh.
//! - [`service`] -- [`RefreshService`] and its driver loop.
//! - [`source`] -- The [`ArtifactSource`] fetch trait.
//! - [`store`] -- [`ArtifactStore`] and [`Generation`].
//! - [`summary`] -- Per-kind listing rows.
//!
//! [`ArtifactContext`]: context::ArtifactContext
//! [`ArtifactSource`]: source::ArtifactSource
//! [`ArtifactStore`]: store::ArtifactStore
//! [`Generation`]: store::Generation
//! [`RefreshService`]: service::RefreshService

pub mod config;
pub mod context;
pub mod decode;
pub mod hooks;
pub mod idle;
pub mod normalize;
pub mod query;
pub mod schedule;
pub mod service;
pub mod source;
pub mod store;
pub mod summary;

pub use context::ArtifactContext;
pub use hooks::{ChangeHooks, HookEvent};
pub use service::{RefreshService, RequestOutcome};
pub use source::{ArtifactSource, FetchError};
pub use store::{ArtifactStore, Generation, RefreshStats};
