//! # CyberGuard Core
//!
//! The heart of CyberGuard - the incident data pipeline: ingest, persist,
//! aggregate.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     cyberguard-core                         │
//! │                                                             │
//! │  ┌────────────┐  ┌────────────┐  ┌──────────┐               │
//! │  │ IncidentLog│  │ HoneypotLog│  │ Database │               │
//! │  └────────────┘  └────────────┘  └──────────┘               │
//! │                                                             │
//! │  ┌────────────┐  ┌────────────┐                             │
//! │  │  Incident  │  │ GuardConfig│                             │
//! │  └────────────┘  └────────────┘                             │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All analytical judgment lives behind the gateway crate; this crate only
//! records what the gateway decided and serves it back, newest first.

pub mod config;
pub mod incident;
pub mod ingest;
pub mod intel;
pub mod store;

pub use config::{GuardConfig, RetentionConfig};
pub use incident::{Incident, IncidentKind};
pub use ingest::{HoneypotLog, IncidentLog};
pub use intel::{ExtractedIntel, HoneypotEvent, INTEL_EXCERPT_MAX};
pub use store::{Database, StoreError};

pub type Result<T> = std::result::Result<T, StoreError>;
