//! Data access for the Stroll engine.
//!
//! Responsibilities:
//! - Implement [`stroll_core::MapsGateway`] over the Google Maps Platform
//!   HTTP APIs ([`google`]).
//! - Memoise recent collaborator results in bounded, thread-safe caches
//!   ([`CallCache`]).
//! - Keep provider wire formats private to this crate.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `stroll-core`).
//! - Async HTTP stays behind the synchronous gateway trait.
//!
//! Invariants:
//! - Thread-safe by default; gateways are `Send + Sync`.
//! - Failed calls are never cached.
//! - API keys never appear in error messages or logs.

#![forbid(unsafe_code)]

pub mod cache;
pub mod google;

pub use cache::CallCache;
pub use google::{GatewayBuildError, GoogleMapsConfig, GoogleMapsGateway};
