//! # CyberGuard Server
//!
//! The presentation layer: REST API, analysis flows, and the embedded
//! dashboard. All durable state lives in `cyberguard-core`; all analytical
//! judgment comes from `cyberguard-gateway`. This crate wires the two
//! together and keeps only transient per-request state.

pub mod api;
pub mod dashboard;
pub mod flow;

pub use api::{router, AppState};
