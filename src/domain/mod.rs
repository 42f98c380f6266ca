//! Domain layer - Pure caption synchronization model.

pub mod captions;
pub mod identity;
pub mod summary;

pub use captions::{CaptionTrack, LocalCaptionFile, Outcome, ReconciliationTarget, Step};
pub use summary::{BatchSummary, FailureRecord, UnresolvedFile};
