//! Captionsync - Keeps remote video caption tracks in sync with local WebVTT files
//!
//! Hexagonal Architecture:
//! - domain/: Pure caption model (filename identity, outcomes, batch summary)
//! - ports/: Trait definitions (caption store, transport, credentials, files)
//! - adapters/: Concrete implementations (api.video over reqwest, local filesystem)
//! - application/: Reconciler and batch orchestrator
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use application::{BatchOrchestrator, Reconciler};
pub use config::SyncConfig;
pub use domain::{BatchSummary, Outcome, Step};
pub use error::{AuthError, CaptionError, RunError, TransportError};
