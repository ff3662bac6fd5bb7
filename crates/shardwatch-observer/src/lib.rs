//! Read-only observer API for the Shardwatch artifact overlay.
//!
//! This crate exposes the query API of the current generation over HTTP
//! and streams change events over a `WebSocket`, for browser-side map
//! renderers and listing views. It never writes to the store.
//!
//! # Modules
//!
//! - [`error`] -- [`ObserverError`](error::ObserverError) and its HTTP mapping.
//! - [`handlers`] -- REST handlers.
//! - [`router`] -- Route table.
//! - [`server`] -- Bind and serve with graceful shutdown.
//! - [`ws`] -- Change-event stream.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod ws;

pub use router::build_router;
pub use server::{ServerError, start_server};
