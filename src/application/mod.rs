//! Application layer - Services that use ports.

pub mod orchestrator;
pub mod reconciler;

pub use orchestrator::BatchOrchestrator;
pub use reconciler::Reconciler;
